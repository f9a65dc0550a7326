//! Expression operators.
//!
//! [`ExprOp`] is the tagged operator set the evaluator dispatches on. Each
//! variant maps to one vector operator; exhaustiveness of the dispatch match
//! is checked at compile time.

use serde::{Deserialize, Serialize};

/// The number of operands an operator consumes from its children.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Arity {
    /// No children: constants, signal reads, and edge detectors.
    Leaf,
    /// One child (`left`).
    Unary,
    /// Two children (`left`, `right`).
    Binary,
}

/// An expression operator.
///
/// Leaf operators produce their value from a constant or a bound signal;
/// unary and binary operators combine child values. Bit-select operators
/// additionally read the bound signal's declared LSB out of the node's run
/// state, so index arithmetic stays correct when a signal is resized.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum ExprOp {
    /// A constant value (no children, no signal).
    Static,
    /// A full read of the bound signal.
    Signal,
    /// A single-bit select of the bound signal; `left` is the index.
    SbitSel,
    /// A part select of the bound signal; `left`/`right` are the MSB/LSB.
    MbitSel,
    /// Concatenation of `left` (high bits) and `right` (low bits).
    Concat,
    /// Replication: `left` is the repeat count, `right` the pattern.
    Expand,

    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Bitwise XOR.
    Xor,
    /// Bitwise NAND.
    Nand,
    /// Bitwise NOR.
    Nor,
    /// Bitwise XNOR.
    Nxor,

    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
    /// Modulo.
    Mod,
    /// Logical shift left.
    Lshift,
    /// Logical shift right.
    Rshift,

    /// Equality (`==`).
    Eq,
    /// Inequality (`!=`).
    Ne,
    /// Case equality (`===`), definite even on X/Z.
    CaseEq,
    /// Case inequality (`!==`), definite even on X/Z.
    CaseNe,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,

    /// Logical AND (`&&`).
    Land,
    /// Logical OR (`||`).
    Lor,
    /// Conditional: `left` is the condition, `right` a [`CondSel`](Self::CondSel).
    Cond,
    /// Conditional arm pair: `left` is the true value, `right` the false one.
    CondSel,

    /// Bitwise invert (`~`).
    Uinv,
    /// Logical NOT (`!`).
    Unot,
    /// Reduction AND.
    Uand,
    /// Reduction OR.
    Uor,
    /// Reduction XOR.
    Uxor,
    /// Reduction NAND.
    Unand,
    /// Reduction NOR.
    Unor,
    /// Reduction XNOR.
    Unxor,

    /// Rising-edge detector on the bound signal.
    Posedge,
    /// Falling-edge detector on the bound signal.
    Negedge,
    /// Any-edge detector on the bound signal.
    Anyedge,
}

impl ExprOp {
    /// Returns how many children this operator consumes.
    pub fn arity(self) -> Arity {
        use ExprOp::*;
        match self {
            Static | Signal | Posedge | Negedge | Anyedge => Arity::Leaf,
            SbitSel | Uinv | Unot | Uand | Uor | Uxor | Unand | Unor | Unxor => Arity::Unary,
            MbitSel | Concat | Expand | And | Or | Xor | Nand | Nor | Nxor | Add | Sub | Mul
            | Div | Mod | Lshift | Rshift | Eq | Ne | CaseEq | CaseNe | Lt | Le | Gt | Ge
            | Land | Lor | Cond | CondSel => Arity::Binary,
        }
    }

    /// Returns `true` if this operator reads a bound signal.
    pub fn reads_signal(self) -> bool {
        use ExprOp::*;
        matches!(
            self,
            Signal | SbitSel | MbitSel | Posedge | Negedge | Anyedge
        )
    }

    /// Returns `true` for the bit/part-select operators, which cache the
    /// bound signal's LSB in their run state.
    pub fn is_bit_select(self) -> bool {
        matches!(self, ExprOp::SbitSel | ExprOp::MbitSel)
    }

    /// Returns `true` for the edge-detector operators.
    pub fn is_edge(self) -> bool {
        matches!(self, ExprOp::Posedge | ExprOp::Negedge | ExprOp::Anyedge)
    }
}
