//! Expression evaluation with coverage accounting.
//!
//! [`evaluate`] recomputes one expression node from its children (or its
//! bound signal), assigns the result into the node's stored vector so
//! toggle/assignment flags accumulate, and records the boolean outcome when
//! the result reduces unambiguously to 0 or 1.

use crate::error::ScoreError;
use vcov_common::{CovVec, Logic};
use vcov_db::{Design, ExprId, ExprOp, Expression, SignalId};

/// What one evaluation produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalOutcome {
    /// The node's value differs bitwise from before the evaluation.
    pub changed: bool,
    /// The result reduced unambiguously to 0 or 1.
    pub measurable: bool,
    /// The result reduced to true.
    pub result_true: bool,
    /// The result reduced to false.
    pub result_false: bool,
}

/// Evaluates one expression node.
///
/// Children are read at their current values; the scheduler guarantees that
/// within a timestep a node is only evaluated after the children that
/// enqueued it. Constants keep their value and never report a change.
pub fn evaluate(design: &mut Design, id: ExprId) -> Result<EvalOutcome, ScoreError> {
    let op = design.exprs[id].op;
    let result = compute(design, id, op)?;

    let expr = &mut design.exprs[id];
    let changed = if op == ExprOp::Static {
        false
    } else {
        if expr.value.width() != result.width() {
            expr.value.resize(result.width(), 0);
        }
        expr.value.assign(&result)
    };
    expr.state.set_executed(true);
    expr.state.set_changed(changed);

    let reduced = result.reduce_bool();
    let measurable = reduced.is_known();
    expr.state.set_measurable(measurable);
    let (mut result_true, mut result_false) = (false, false);
    match reduced {
        Logic::One => {
            expr.state.set_eval_true(true);
            expr.value.record_outcome(true);
            result_true = true;
        }
        Logic::Zero => {
            expr.state.set_eval_false(true);
            expr.value.record_outcome(false);
            result_false = true;
        }
        Logic::X | Logic::Z => {}
    }

    Ok(EvalOutcome {
        changed,
        measurable,
        result_true,
        result_false,
    })
}

/// Computes a node's new value without mutating anything.
fn compute(design: &Design, id: ExprId, op: ExprOp) -> Result<CovVec, ScoreError> {
    let expr = &design.exprs[id];
    let left = expr.left.map(|l| design.exprs[l].value.clone());
    let right = expr.right.map(|r| design.exprs[r].value.clone());

    use ExprOp::*;
    Ok(match op {
        Static => expr.value.clone(),
        Signal => design.signals[bound_signal(expr)?].value.clone(),

        SbitSel => {
            let full = &design.signals[bound_signal(expr)?].value;
            let index = operand(left);
            match index.to_u64() {
                Some(i) => {
                    let offset = i as i64 - expr.state.sig_lsb as i64;
                    if (0..full.width() as i64).contains(&offset) {
                        bit(full.get(offset as u32))
                    } else {
                        bit(Logic::X)
                    }
                }
                None => bit(Logic::X),
            }
        }

        MbitSel => {
            let full = &design.signals[bound_signal(expr)?].value;
            let msb = operand(left).to_u64();
            let lsb = operand(right).to_u64();
            match (msb, lsb) {
                (Some(m), Some(l)) if m >= l => {
                    let width = (m - l + 1) as u32;
                    let base = l as i64 - expr.state.sig_lsb as i64;
                    let mut out = CovVec::new(width, 0);
                    for i in 0..width {
                        let src = base + i as i64;
                        if (0..full.width() as i64).contains(&src) {
                            out.set(i, full.get(src as u32));
                        }
                    }
                    out
                }
                _ => bit(Logic::X),
            }
        }

        Concat => {
            let (high, low) = (operand(left), operand(right));
            let mut out = CovVec::new(high.width() + low.width(), 0);
            for i in 0..low.width() {
                out.set(i, low.get(i));
            }
            for i in 0..high.width() {
                out.set(low.width() + i, high.get(i));
            }
            out
        }

        Expand => {
            let (count, pattern) = (operand(left), operand(right));
            match count.to_u64() {
                Some(n) => {
                    let mut out = CovVec::new(pattern.width() * n as u32, 0);
                    for rep in 0..n as u32 {
                        for i in 0..pattern.width() {
                            out.set(rep * pattern.width() + i, pattern.get(i));
                        }
                    }
                    out
                }
                None => bit(Logic::X),
            }
        }

        And => &operand(left) & &operand(right),
        Or => &operand(left) | &operand(right),
        Xor => &operand(left) ^ &operand(right),
        Nand => operand(left).nand(&operand(right)),
        Nor => operand(left).nor(&operand(right)),
        Nxor => operand(left).xnor(&operand(right)),

        Add => operand(left).add(&operand(right)),
        Sub => operand(left).sub(&operand(right)),
        Mul => operand(left).mul(&operand(right)),
        Div => operand(left).div(&operand(right)),
        Mod => operand(left).rem(&operand(right)),
        Lshift => operand(left).shl(&operand(right)),
        Rshift => operand(left).shr(&operand(right)),

        Eq => bit(operand(left).cmp_eq(&operand(right))),
        Ne => bit(operand(left).cmp_ne(&operand(right))),
        CaseEq => bit(operand(left).cmp_ceq(&operand(right))),
        CaseNe => bit(operand(left).cmp_cne(&operand(right))),
        Lt => bit(operand(left).cmp_lt(&operand(right))),
        Le => bit(operand(left).cmp_le(&operand(right))),
        Gt => bit(operand(left).cmp_gt(&operand(right))),
        Ge => bit(operand(left).cmp_ge(&operand(right))),

        Land => bit(operand(left).reduce_bool() & operand(right).reduce_bool()),
        Lor => bit(operand(left).reduce_bool() | operand(right).reduce_bool()),

        Cond => {
            let sel = expr.right.expect("conditional missing selector child");
            let sel_node = &design.exprs[sel];
            let t = sel_node
                .left
                .map(|e| design.exprs[e].value.clone())
                .expect("selector missing true arm");
            let f = sel_node
                .right
                .map(|e| design.exprs[e].value.clone())
                .expect("selector missing false arm");
            match operand(left).reduce_bool() {
                Logic::One => t,
                Logic::Zero => f,
                Logic::X | Logic::Z => blend(&t, &f),
            }
        }
        CondSel => blend(&operand(left), &operand(right)),

        Uinv => !&operand(left),
        Unot => bit(!operand(left).reduce_bool()),
        Uand => bit(operand(left).red_and()),
        Uor => bit(operand(left).red_or()),
        Uxor => bit(operand(left).red_xor()),
        Unand => bit(!operand(left).red_and()),
        Unor => bit(!operand(left).red_or()),
        Unxor => bit(!operand(left).red_xor()),

        Posedge => bit(edge_bit(expr.state.saw_rise())),
        Negedge => bit(edge_bit(expr.state.saw_fall())),
        Anyedge => bit(edge_bit(expr.state.saw_rise() || expr.state.saw_fall())),
    })
}

fn bound_signal(expr: &Expression) -> Result<SignalId, ScoreError> {
    expr.signal.ok_or(ScoreError::UnboundExpression {
        expr: expr.id.as_raw(),
    })
}

/// Unwraps a child value whose presence the node constructors guarantee.
fn operand(value: Option<CovVec>) -> CovVec {
    value.expect("operator node missing operand")
}

fn bit(value: Logic) -> CovVec {
    let mut v = CovVec::new(1, 0);
    v.set(0, value);
    v
}

fn edge_bit(seen: bool) -> Logic {
    if seen {
        Logic::One
    } else {
        Logic::Zero
    }
}

/// Per-bit merge of two vectors: agreeing bits survive, disagreeing bits
/// become X (the Verilog unknown-condition blend).
fn blend(a: &CovVec, b: &CovVec) -> CovVec {
    let width = a.width().max(b.width());
    let mut out = CovVec::new(width, 0);
    for i in 0..width {
        let x = if i < a.width() { a.get(i) } else { Logic::Zero };
        let y = if i < b.width() { b.get(i) } else { Logic::Zero };
        out.set(i, if x == y { x } else { Logic::X });
    }
    out
}
