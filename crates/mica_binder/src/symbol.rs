//! Symbol definitions: types, variables and functions.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Identity of a variable or function symbol.
///
/// Two symbols with the same name are still different symbols; lookups that
/// need identity (runtime environments, function bodies) key on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u32);

impl SymbolId {
    fn next() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(0);
        SymbolId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    GlobalVariable,
    LocalVariable,
    Parameter,
    Function,
    Type,
}

// ============================================================================
// Types
// ============================================================================

/// The built-in types. `Error` stands in for the type of any expression that
/// failed to bind and suppresses follow-up diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeSymbol {
    Error,
    Void,
    Bool,
    Int,
    String,
}

impl TypeSymbol {
    pub fn name(self) -> &'static str {
        match self {
            TypeSymbol::Error => "?",
            TypeSymbol::Void => "void",
            TypeSymbol::Bool => "bool",
            TypeSymbol::Int => "int",
            TypeSymbol::String => "string",
        }
    }

    /// Resolve a type name written in source. Only `bool`, `int` and
    /// `string` can be named.
    pub fn lookup(name: &str) -> Option<TypeSymbol> {
        match name {
            "bool" => Some(TypeSymbol::Bool),
            "int" => Some(TypeSymbol::Int),
            "string" => Some(TypeSymbol::String),
            _ => None,
        }
    }

    pub fn kind(self) -> SymbolKind {
        SymbolKind::Type
    }
}

impl fmt::Display for TypeSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Variables
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Global,
    Local,
    Parameter,
}

#[derive(Debug)]
pub struct VariableSymbol {
    pub id: SymbolId,
    pub name: String,
    pub kind: VariableKind,
    pub ty: TypeSymbol,
    pub is_read_only: bool,
}

impl VariableSymbol {
    pub fn new(name: impl Into<String>, kind: VariableKind, ty: TypeSymbol, is_read_only: bool) -> Arc<Self> {
        Arc::new(Self {
            id: SymbolId::next(),
            name: name.into(),
            kind,
            ty,
            is_read_only,
        })
    }

    pub fn symbol_kind(&self) -> SymbolKind {
        match self.kind {
            VariableKind::Global => SymbolKind::GlobalVariable,
            VariableKind::Local => SymbolKind::LocalVariable,
            VariableKind::Parameter => SymbolKind::Parameter,
        }
    }
}

impl PartialEq for VariableSymbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for VariableSymbol {}

impl Hash for VariableSymbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for VariableSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// ============================================================================
// Functions
// ============================================================================

#[derive(Debug)]
pub struct FunctionSymbol {
    pub id: SymbolId,
    pub name: String,
    pub parameters: Vec<Arc<VariableSymbol>>,
    pub return_type: TypeSymbol,
}

impl FunctionSymbol {
    pub fn new(name: impl Into<String>, parameters: Vec<Arc<VariableSymbol>>, return_type: TypeSymbol) -> Arc<Self> {
        Arc::new(Self {
            id: SymbolId::next(),
            name: name.into(),
            parameters,
            return_type,
        })
    }

    fn builtin(name: &str, parameters: &[(&str, TypeSymbol)], return_type: TypeSymbol) -> Arc<Self> {
        let parameters = parameters
            .iter()
            .map(|&(name, ty)| VariableSymbol::new(name, VariableKind::Parameter, ty, true))
            .collect();
        Self::new(name, parameters, return_type)
    }

    pub fn symbol_kind(&self) -> SymbolKind {
        SymbolKind::Function
    }
}

impl PartialEq for FunctionSymbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FunctionSymbol {}

impl Hash for FunctionSymbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for FunctionSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Functions every program can call without declaring them.
pub mod builtins {
    use super::{FunctionSymbol, TypeSymbol};
    use lazy_static::lazy_static;
    use std::sync::Arc;

    lazy_static! {
        pub static ref PRINT: Arc<FunctionSymbol> =
            FunctionSymbol::builtin("print", &[("text", TypeSymbol::String)], TypeSymbol::Void);
        pub static ref INPUT: Arc<FunctionSymbol> = FunctionSymbol::builtin("input", &[], TypeSymbol::String);
        pub static ref RANDOM: Arc<FunctionSymbol> = FunctionSymbol::builtin(
            "random",
            &[("min", TypeSymbol::Int), ("max", TypeSymbol::Int)],
            TypeSymbol::Int
        );
    }

    pub fn all() -> [&'static Arc<FunctionSymbol>; 3] {
        [&PRINT, &INPUT, &RANDOM]
    }
}
