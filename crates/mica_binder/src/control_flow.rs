//! Control-flow graph over a lowered body.
//!
//! Construction happens in two phases:
//! - Split the flat statement list into basic blocks. A label starts a block;
//!   a goto, conditional goto or return ends one.
//! - Connect the blocks, plus synthetic start and end blocks, with branches.
//!   Branches guarded by a constant condition are simplified as they are
//!   added, and blocks left without predecessors are pruned until nothing
//!   changes.
//!
//! Blocks and branches are stored in vectors and refer to each other by
//! index.

use crate::bound_tree::{BoundBlockStatement, BoundExpression, BoundLabel, BoundStatement};
use crate::operators::BoundUnaryOperator;
use crate::printer::BoundTreePrinter;
use crate::symbol::TypeSymbol;
use crate::value::Value;
use mica_ast::syntax_kind::SyntaxKind;
use rustc_hash::FxHashMap;
use std::io;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchId(pub usize);

#[derive(Debug, Clone, Default)]
pub struct BasicBlock {
    pub is_start: bool,
    pub is_end: bool,
    pub statements: Vec<Arc<BoundStatement>>,
    pub incoming: Vec<BranchId>,
    pub outgoing: Vec<BranchId>,
}

impl BasicBlock {
    fn with_statements(statements: Vec<Arc<BoundStatement>>) -> Self {
        Self {
            statements,
            ..Self::default()
        }
    }

    fn text(&self) -> String {
        if self.is_start {
            return "<Start>".to_string();
        }
        if self.is_end {
            return "<End>".to_string();
        }
        self.statements
            .iter()
            .map(|s| BoundTreePrinter::statement_to_string(s))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct BasicBlockBranch {
    pub from: BlockId,
    pub to: BlockId,
    /// `None` for an unconditional branch.
    pub condition: Option<Arc<BoundExpression>>,
}

#[derive(Debug, Clone)]
pub struct ControlFlowGraph {
    blocks: Vec<BasicBlock>,
    branches: Vec<BasicBlockBranch>,
}

impl ControlFlowGraph {
    pub fn create(body: &BoundBlockStatement) -> Self {
        let statement_blocks = split_basic_blocks(&body.statements);
        GraphBuilder::new(statement_blocks).build()
    }

    /// Whether every path from the start of `body` ends in a `return`.
    pub fn all_paths_return(body: &BoundBlockStatement) -> bool {
        let graph = Self::create(body);
        let end = graph.block(graph.end());
        end.incoming.iter().all(|&branch| {
            let from = graph.block(graph.branch(branch).from);
            matches!(from.statements.last().map(|s| &**s), Some(BoundStatement::Return(_)))
        })
    }

    pub fn start(&self) -> BlockId {
        BlockId(0)
    }

    pub fn end(&self) -> BlockId {
        BlockId(self.blocks.len() - 1)
    }

    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    pub fn branches(&self) -> &[BasicBlockBranch] {
        &self.branches
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id.0]
    }

    pub fn branch(&self, id: BranchId) -> &BasicBlockBranch {
        &self.branches[id.0]
    }

    /// Render the graph in Graphviz dot format.
    pub fn write_to(&self, out: &mut impl io::Write) -> io::Result<()> {
        writeln!(out, "digraph G {{")?;
        for (i, block) in self.blocks.iter().enumerate() {
            writeln!(out, "    N{i} [label = {} shape = box]", quote(&block.text()))?;
        }
        for branch in &self.branches {
            let label = branch
                .condition
                .as_deref()
                .map(BoundTreePrinter::expression_to_string)
                .unwrap_or_default();
            writeln!(out, "    N{} -> N{} [label = {}]", branch.from.0, branch.to.0, quote(&label))?;
        }
        writeln!(out, "}}")
    }
}

fn quote(text: &str) -> String {
    let escaped = text
        .trim_end()
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\l");
    format!("\"{escaped}\"")
}

// ============================================================================
// Phase 1: basic blocks
// ============================================================================

fn split_basic_blocks(statements: &[Arc<BoundStatement>]) -> Vec<Vec<Arc<BoundStatement>>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for statement in statements {
        match &**statement {
            BoundStatement::Label(_) => {
                end_block(&mut blocks, &mut current);
                current.push(Arc::clone(statement));
            }
            BoundStatement::Goto(_) | BoundStatement::ConditionalGoto { .. } | BoundStatement::Return(_) => {
                current.push(Arc::clone(statement));
                end_block(&mut blocks, &mut current);
            }
            BoundStatement::VariableDeclaration { .. } | BoundStatement::Expression(_) => {
                current.push(Arc::clone(statement));
            }
            other => unreachable!("{:?} survived lowering", other.kind()),
        }
    }
    end_block(&mut blocks, &mut current);
    blocks
}

fn end_block(blocks: &mut Vec<Vec<Arc<BoundStatement>>>, current: &mut Vec<Arc<BoundStatement>>) {
    if !current.is_empty() {
        blocks.push(std::mem::take(current));
    }
}

// ============================================================================
// Phase 2: branches
// ============================================================================

struct GraphBuilder {
    blocks: Vec<BasicBlock>,
    branches: Vec<BasicBlockBranch>,
    labels: FxHashMap<BoundLabel, BlockId>,
}

impl GraphBuilder {
    fn new(statement_blocks: Vec<Vec<Arc<BoundStatement>>>) -> Self {
        let mut blocks = Vec::with_capacity(statement_blocks.len() + 2);
        blocks.push(BasicBlock {
            is_start: true,
            ..BasicBlock::default()
        });
        blocks.extend(statement_blocks.into_iter().map(BasicBlock::with_statements));
        blocks.push(BasicBlock {
            is_end: true,
            ..BasicBlock::default()
        });

        let mut labels = FxHashMap::default();
        for (i, block) in blocks.iter().enumerate() {
            for statement in &block.statements {
                if let BoundStatement::Label(label) = &**statement {
                    labels.insert(label.clone(), BlockId(i));
                }
            }
        }

        Self {
            blocks,
            branches: Vec::new(),
            labels,
        }
    }

    fn build(mut self) -> ControlFlowGraph {
        let start = BlockId(0);
        let end = BlockId(self.blocks.len() - 1);
        if self.blocks.len() == 2 {
            self.connect(start, end, None);
        } else {
            self.connect(start, BlockId(1), None);
        }

        for i in 1..end.0 {
            let current = BlockId(i);
            let next = BlockId(i + 1);
            let statements = self.blocks[i].statements.clone();
            let last = statements.len().saturating_sub(1);
            for (j, statement) in statements.iter().enumerate() {
                match &**statement {
                    BoundStatement::Goto(label) => {
                        let target = self.block_for(label);
                        self.connect(current, target, None);
                    }
                    BoundStatement::ConditionalGoto {
                        label,
                        condition,
                        jump_if_false,
                    } => {
                        let then_block = self.block_for(label);
                        let negated = negate(condition);
                        let (then_condition, else_condition) = if *jump_if_false {
                            (negated, Arc::clone(condition))
                        } else {
                            (Arc::clone(condition), negated)
                        };
                        self.connect(current, then_block, Some(then_condition));
                        self.connect(current, next, Some(else_condition));
                    }
                    BoundStatement::Return(_) => self.connect(current, end, None),
                    BoundStatement::VariableDeclaration { .. }
                    | BoundStatement::Label(_)
                    | BoundStatement::Expression(_) => {
                        if j == last {
                            self.connect(current, next, None);
                        }
                    }
                    other => unreachable!("{:?} survived lowering", other.kind()),
                }
            }
        }

        let removed = self.prune();
        self.compact(&removed)
    }

    fn block_for(&self, label: &BoundLabel) -> BlockId {
        match self.labels.get(label) {
            Some(&id) => id,
            None => unreachable!("label {label} is not defined in this body"),
        }
    }

    fn connect(&mut self, from: BlockId, to: BlockId, condition: Option<Arc<BoundExpression>>) {
        let condition = match condition {
            Some(condition) => match &*condition {
                BoundExpression::Literal(Value::Bool(true)) => None,
                BoundExpression::Literal(Value::Bool(false)) => return,
                _ => Some(condition),
            },
            None => None,
        };
        let id = BranchId(self.branches.len());
        self.branches.push(BasicBlockBranch { from, to, condition });
        self.blocks[from.0].outgoing.push(id);
        self.blocks[to.0].incoming.push(id);
    }

    /// Remove blocks without predecessors until none are left. Returns the
    /// removal flag of every block.
    fn prune(&mut self) -> Vec<bool> {
        let end = self.blocks.len() - 1;
        let mut removed = vec![false; self.blocks.len()];
        while let Some(index) = (1..end).find(|&i| !removed[i] && self.blocks[i].incoming.is_empty()) {
            for branch in std::mem::take(&mut self.blocks[index].outgoing) {
                let to = self.branches[branch.0].to;
                self.blocks[to.0].incoming.retain(|&b| b != branch);
            }
            removed[index] = true;
        }
        let pruned = removed.iter().filter(|r| **r).count();
        if pruned > 0 {
            tracing::debug!(pruned, "removed unreachable blocks");
        }
        removed
    }

    /// Drop removed blocks and their branches, renumbering the rest densely.
    fn compact(self, removed: &[bool]) -> ControlFlowGraph {
        let mut block_map = vec![None; self.blocks.len()];
        let mut next = 0;
        for (i, &is_removed) in removed.iter().enumerate() {
            if !is_removed {
                block_map[i] = Some(BlockId(next));
                next += 1;
            }
        }

        let mut branch_map = vec![None; self.branches.len()];
        let mut branches = Vec::new();
        for (i, branch) in self.branches.iter().enumerate() {
            if let (Some(from), Some(to)) = (block_map[branch.from.0], block_map[branch.to.0]) {
                branch_map[i] = Some(BranchId(branches.len()));
                branches.push(BasicBlockBranch {
                    from,
                    to,
                    condition: branch.condition.clone(),
                });
            }
        }

        let remap = |ids: &[BranchId]| -> Vec<BranchId> { ids.iter().filter_map(|b| branch_map[b.0]).collect() };
        let blocks = self
            .blocks
            .into_iter()
            .zip(removed)
            .filter(|(_, is_removed)| !**is_removed)
            .map(|(block, _)| BasicBlock {
                incoming: remap(&block.incoming),
                outgoing: remap(&block.outgoing),
                ..block
            })
            .collect();

        ControlFlowGraph { blocks, branches }
    }
}

fn negate(condition: &Arc<BoundExpression>) -> Arc<BoundExpression> {
    if let BoundExpression::Literal(Value::Bool(value)) = &**condition {
        return BoundExpression::literal(!value);
    }
    match BoundUnaryOperator::bind(SyntaxKind::BangToken, TypeSymbol::Bool) {
        Some(op) => Arc::new(BoundExpression::Unary {
            op,
            operand: Arc::clone(condition),
        }),
        None => unreachable!("logical negation missing from the operator table"),
    }
}
