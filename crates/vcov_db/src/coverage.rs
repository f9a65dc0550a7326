//! Read-only coverage summaries.
//!
//! The report and serialization layers consume these; nothing here mutates
//! the database. Line coverage asks whether a statement's root expression
//! ever executed; toggle coverage counts 0→1/1→0 activity per signal bit;
//! expression coverage asks whether each measurable operator node has been
//! observed both true and false.

use crate::design::Design;
use crate::ids::ModuleId;
use crate::op::ExprOp;
use serde::{Deserialize, Serialize};

/// Per-module toggle coverage totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleSummary {
    /// Bits that have toggled 0→1.
    pub toggled_0_to_1: u32,
    /// Bits that have toggled 1→0.
    pub toggled_1_to_0: u32,
    /// Total scoreable bits (coverage-enabled signals only).
    pub total_bits: u32,
}

impl ToggleSummary {
    /// Collects toggle totals for one module.
    ///
    /// Signals whose coverage is disabled (oversized/unsized) are skipped
    /// entirely rather than counted as uncovered.
    pub fn for_module(design: &Design, module: ModuleId) -> Self {
        let mut summary = Self {
            toggled_0_to_1: 0,
            toggled_1_to_0: 0,
            total_bits: 0,
        };
        for &sig_id in &design.modules[module].signals {
            let sig = &design.signals[sig_id];
            if !sig.coverage {
                continue;
            }
            let (t01, t10) = sig.value.toggle_counts();
            summary.toggled_0_to_1 += t01;
            summary.toggled_1_to_0 += t10;
            summary.total_bits += sig.value.width();
        }
        summary
    }
}

/// Per-module line coverage totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSummary {
    /// Statements whose root expression has executed.
    pub executed: u32,
    /// Total statements.
    pub total: u32,
}

impl LineSummary {
    /// Collects line totals for one module.
    pub fn for_module(design: &Design, module: ModuleId) -> Self {
        let mut summary = Self {
            executed: 0,
            total: 0,
        };
        for &stmt_id in &design.modules[module].statements {
            let root = design.statements[stmt_id].root;
            summary.total += 1;
            if design.exprs[root].state.executed() {
                summary.executed += 1;
            }
        }
        summary
    }
}

/// Per-module expression (combinational) coverage totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExprSummary {
    /// Operator nodes observed evaluating both true and false.
    pub both_outcomes: u32,
    /// Total operator nodes (constants excluded).
    pub total: u32,
}

impl ExprSummary {
    /// Collects expression totals for one module by walking each
    /// statement's tree.
    pub fn for_module(design: &Design, module: ModuleId) -> Self {
        let mut summary = Self {
            both_outcomes: 0,
            total: 0,
        };
        for &stmt_id in &design.modules[module].statements {
            let mut stack = vec![design.statements[stmt_id].root];
            while let Some(id) = stack.pop() {
                let expr = &design.exprs[id];
                if expr.op != ExprOp::Static {
                    summary.total += 1;
                    if expr.state.eval_true() && expr.state.eval_false() {
                        summary.both_outcomes += 1;
                    }
                }
                stack.extend(expr.left);
                stack.extend(expr.right);
            }
        }
        summary
    }
}
