//! Scope management for the binder.
//!
//! Scopes live in an arena and point at their parent by index. Variables and
//! functions occupy separate namespaces inside each scope, and each namespace
//! remembers declaration order so a global scope can list what it declared.

use crate::symbol::{builtins, FunctionSymbol, VariableSymbol};
use indexmap::IndexMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

#[derive(Debug, Default)]
struct ScopeFrame {
    parent: Option<ScopeId>,
    variables: IndexMap<String, Arc<VariableSymbol>>,
    functions: IndexMap<String, Arc<FunctionSymbol>>,
}

#[derive(Debug)]
pub struct ScopeArena {
    frames: Vec<ScopeFrame>,
}

impl ScopeArena {
    /// Create an arena whose root scope holds the built-in functions.
    pub fn new() -> Self {
        let mut arena = Self {
            frames: vec![ScopeFrame::default()],
        };
        let root = arena.root();
        for function in builtins::all() {
            arena.declare_function(root, Arc::clone(function));
        }
        arena
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Open a new scope nested in `parent`.
    pub fn push(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.frames.len() as u32);
        self.frames.push(ScopeFrame {
            parent: Some(parent),
            ..ScopeFrame::default()
        });
        id
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.frame(scope).parent
    }

    /// Declare a variable in `scope`. Returns `false`, leaving the scope
    /// untouched, when a variable of that name is already declared there.
    pub fn declare_variable(&mut self, scope: ScopeId, variable: Arc<VariableSymbol>) -> bool {
        let frame = self.frame_mut(scope);
        if frame.variables.contains_key(&variable.name) {
            return false;
        }
        frame.variables.insert(variable.name.clone(), variable);
        true
    }

    /// Declare a function in `scope`. Returns `false` on a name clash.
    pub fn declare_function(&mut self, scope: ScopeId, function: Arc<FunctionSymbol>) -> bool {
        let frame = self.frame_mut(scope);
        if frame.functions.contains_key(&function.name) {
            return false;
        }
        frame.functions.insert(function.name.clone(), function);
        true
    }

    /// Find the innermost variable named `name`, walking outward from `scope`.
    pub fn lookup_variable(&self, scope: ScopeId, name: &str) -> Option<&Arc<VariableSymbol>> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let frame = self.frame(id);
            if let Some(variable) = frame.variables.get(name) {
                return Some(variable);
            }
            current = frame.parent;
        }
        None
    }

    pub fn lookup_function(&self, scope: ScopeId, name: &str) -> Option<&Arc<FunctionSymbol>> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let frame = self.frame(id);
            if let Some(function) = frame.functions.get(name) {
                return Some(function);
            }
            current = frame.parent;
        }
        None
    }

    /// Variables declared directly in `scope`, in declaration order.
    pub fn declared_variables(&self, scope: ScopeId) -> Vec<Arc<VariableSymbol>> {
        self.frame(scope).variables.values().cloned().collect()
    }

    /// Functions declared directly in `scope`, in declaration order.
    pub fn declared_functions(&self, scope: ScopeId) -> Vec<Arc<FunctionSymbol>> {
        self.frame(scope).functions.values().cloned().collect()
    }

    fn frame(&self, scope: ScopeId) -> &ScopeFrame {
        &self.frames[scope.0 as usize]
    }

    fn frame_mut(&mut self, scope: ScopeId) -> &mut ScopeFrame {
        &mut self.frames[scope.0 as usize]
    }
}

impl Default for ScopeArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{TypeSymbol, VariableKind};

    fn variable(name: &str) -> Arc<VariableSymbol> {
        VariableSymbol::new(name, VariableKind::Local, TypeSymbol::Int, false)
    }

    #[test]
    fn test_root_holds_builtins() {
        let arena = ScopeArena::new();
        let print = arena.lookup_function(arena.root(), "print").unwrap();
        assert!(Arc::ptr_eq(print, &builtins::PRINT));
        assert!(arena.lookup_function(arena.root(), "println").is_none());
    }

    #[test]
    fn test_redeclaration_keeps_first() {
        let mut arena = ScopeArena::new();
        let scope = arena.push(arena.root());
        let first = variable("x");
        assert!(arena.declare_variable(scope, first.clone()));
        assert!(!arena.declare_variable(scope, variable("x")));
        assert_eq!(arena.lookup_variable(scope, "x"), Some(&first));
        assert_eq!(arena.declared_variables(scope).len(), 1);
    }

    #[test]
    fn test_inner_scope_shadows_outer() {
        let mut arena = ScopeArena::new();
        let outer = arena.push(arena.root());
        let inner = arena.push(outer);
        let a = variable("x");
        let b = variable("x");
        assert!(arena.declare_variable(outer, a.clone()));
        assert!(arena.declare_variable(inner, b.clone()));
        assert_eq!(arena.lookup_variable(inner, "x"), Some(&b));
        assert_eq!(arena.lookup_variable(outer, "x"), Some(&a));
        assert_eq!(arena.parent(inner), Some(outer));
    }

    #[test]
    fn test_variables_and_functions_are_separate() {
        let mut arena = ScopeArena::new();
        let scope = arena.push(arena.root());
        assert!(arena.declare_variable(scope, variable("print")));
        assert!(arena.lookup_function(scope, "print").is_some());
        assert!(arena.lookup_variable(scope, "print").is_some());
    }
}
