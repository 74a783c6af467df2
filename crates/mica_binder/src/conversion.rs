//! Conversion classification between types.

use crate::symbol::TypeSymbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// No conversion exists.
    None,
    Identity,
    /// Applied silently wherever a value of the target type is expected.
    Implicit,
    /// Only applied when requested by a conversion call such as `string(1)`.
    Explicit,
}

impl Conversion {
    pub fn classify(from: TypeSymbol, to: TypeSymbol) -> Conversion {
        if from == to {
            return Conversion::Identity;
        }
        match (from, to) {
            (TypeSymbol::Bool | TypeSymbol::Int, TypeSymbol::String) => Conversion::Explicit,
            (TypeSymbol::String, TypeSymbol::Bool | TypeSymbol::Int) => Conversion::Explicit,
            _ => Conversion::None,
        }
    }

    pub fn exists(self) -> bool {
        self != Conversion::None
    }

    pub fn is_identity(self) -> bool {
        self == Conversion::Identity
    }

    pub fn is_implicit(self) -> bool {
        self == Conversion::Implicit
    }

    pub fn is_explicit(self) -> bool {
        self == Conversion::Explicit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(Conversion::classify(TypeSymbol::Int, TypeSymbol::Int), Conversion::Identity);
        assert_eq!(Conversion::classify(TypeSymbol::Int, TypeSymbol::String), Conversion::Explicit);
        assert_eq!(Conversion::classify(TypeSymbol::String, TypeSymbol::Bool), Conversion::Explicit);
        assert_eq!(Conversion::classify(TypeSymbol::Int, TypeSymbol::Bool), Conversion::None);
        assert_eq!(Conversion::classify(TypeSymbol::Void, TypeSymbol::String), Conversion::None);
        assert!(!Conversion::classify(TypeSymbol::Error, TypeSymbol::Int).exists());
    }
}
