//! Expression nodes and statements.
//!
//! An [`Expression`] is one node of the operator graph a scoring run
//! evaluates. Exactly one of three shapes describes how a node produces its
//! value: a bound signal (leaf signal/edge reads), children (operators), or
//! neither (constants). The constructors enforce the shape; the
//! [`Design`](crate::design::Design) wires parent back-links when a tree is
//! assembled.

use crate::ids::{ExprId, ModuleId, SignalId, StmtId};
use crate::op::ExprOp;
use crate::run_state::RunState;
use serde::{Deserialize, Serialize};
use vcov_common::CovVec;

/// A node of the expression graph.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Expression {
    /// The unique ID of this node.
    pub id: ExprId,
    /// The operator this node applies.
    pub op: ExprOp,
    /// The node's current value with embedded coverage flags.
    pub value: CovVec,
    /// Supplemental run state (queue membership, outcome coverage, ...).
    pub state: RunState,
    /// The bound signal for signal-reading leaf operators.
    pub signal: Option<SignalId>,
    /// Left child (operand, select index, or condition).
    pub left: Option<ExprId>,
    /// Right child.
    pub right: Option<ExprId>,
    /// Non-owning back-reference to the enclosing operator node.
    pub parent: Option<ExprId>,
}

impl Expression {
    /// Creates a constant node holding `value`.
    ///
    /// The value's bits are marked static so they never count against
    /// toggle coverage.
    pub fn constant(id: ExprId, mut value: CovVec) -> Self {
        value.mark_static();
        Self {
            id,
            op: ExprOp::Static,
            value,
            state: RunState::new(),
            signal: None,
            left: None,
            right: None,
            parent: None,
        }
    }

    /// Creates a signal-reading leaf node (`Signal`, edge detectors, or a
    /// part select whose bounds arrive as children later).
    ///
    /// The node starts 1-bit wide; binding resizes it to the signal's
    /// dimensions.
    ///
    /// # Panics
    ///
    /// Panics if `op` does not read a signal.
    pub fn leaf(id: ExprId, op: ExprOp) -> Self {
        assert!(op.reads_signal(), "leaf expression requires a signal op");
        Self {
            id,
            op,
            value: CovVec::new(1, 0),
            state: RunState::new(),
            signal: None,
            left: None,
            right: None,
            parent: None,
        }
    }

    /// Creates a unary operator node over `child`.
    ///
    /// # Panics
    ///
    /// Panics if `op` is a leaf operator.
    pub fn unary(id: ExprId, op: ExprOp, child: ExprId) -> Self {
        assert!(
            op.arity() == crate::op::Arity::Unary,
            "{op:?} is not a unary op"
        );
        Self {
            id,
            op,
            value: CovVec::new(1, 0),
            state: RunState::new(),
            signal: None,
            left: Some(child),
            right: None,
            parent: None,
        }
    }

    /// Creates a binary operator node over `left` and `right`.
    ///
    /// # Panics
    ///
    /// Panics if `op` is not a binary operator.
    pub fn binary(id: ExprId, op: ExprOp, left: ExprId, right: ExprId) -> Self {
        assert!(
            op.arity() == crate::op::Arity::Binary,
            "{op:?} is not a binary op"
        );
        Self {
            id,
            op,
            value: CovVec::new(1, 0),
            state: RunState::new(),
            signal: None,
            left: Some(left),
            right: Some(right),
            parent: None,
        }
    }

    /// Returns `true` if this node is a statement root (no parent).
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// A statement: one root expression within a module.
///
/// Each root expression corresponds to one Verilog statement; line coverage
/// asks whether the root was ever executed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Statement {
    /// The unique ID of this statement.
    pub id: StmtId,
    /// The module this statement belongs to.
    pub module: ModuleId,
    /// The root of the statement's expression tree.
    pub root: ExprId,
}
