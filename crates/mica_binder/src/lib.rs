//! mica_binder: Semantic analysis and lowering for mica programs.
//!
//! The binder resolves names against a chain of scopes, type-checks every
//! expression and statement, and produces an immutable bound tree together
//! with diagnostics. The lowerer then rewrites structured control flow into
//! labels and gotos, and the control-flow graph built over the lowered form
//! answers reachability questions such as "do all paths return".

mod binder;
mod bound_tree;
mod control_flow;
mod conversion;
mod lowerer;
mod operators;
mod printer;
mod scope;
mod symbol;
mod value;

pub use binder::{Binder, BoundFunctionDeclaration, BoundGlobalScope, BoundProgram};
pub use bound_tree::{
    write_outline, BoundBlockStatement, BoundExpression, BoundLabel, BoundNode, BoundNodeKind, BoundStatement,
};
pub use control_flow::{BasicBlock, BasicBlockBranch, BlockId, BranchId, ControlFlowGraph};
pub use conversion::Conversion;
pub use lowerer::Lowerer;
pub use operators::{BoundBinaryOperator, BoundBinaryOperatorKind, BoundUnaryOperator, BoundUnaryOperatorKind};
pub use printer::BoundTreePrinter;
pub use scope::{ScopeArena, ScopeId};
pub use symbol::{builtins, FunctionSymbol, SymbolId, SymbolKind, TypeSymbol, VariableKind, VariableSymbol};
pub use value::Value;
