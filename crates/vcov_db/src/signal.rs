//! Signal definitions.
//!
//! A [`Signal`] is a named, scoped container for a coverage vector. It owns
//! the ordered list of expressions that read it; the binding resolver is the
//! only writer of that list, and teardown must unlink through
//! [`Design::unlink_statement`](crate::design::Design::unlink_statement) so
//! the reader list and the expressions' back-references never diverge.

use crate::ids::{ExprId, ModuleId, SignalId};
use serde::{Deserialize, Serialize};
use vcov_common::{CovVec, Ident};

/// The declaration kind of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    /// A net (`wire`).
    Wire,
    /// A variable (`reg`).
    Reg,
    /// An input port.
    Input,
    /// An output port.
    Output,
    /// A bidirectional port.
    Inout,
    /// A referenced but never declared signal, auto-created as 1 bit.
    Implicit,
}

/// A named signal within a module definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    /// The unique ID of this signal.
    pub id: SignalId,
    /// The leaf name (the hierarchical prefix comes from the instance tree).
    pub name: Ident,
    /// The declaration kind.
    pub kind: SignalKind,
    /// The module scope that owns this signal.
    pub module: ModuleId,
    /// The current value with embedded per-bit toggle coverage.
    pub value: CovVec,
    /// Expressions that read this signal, in binding order. Non-owning.
    pub readers: Vec<ExprId>,
    /// Whether width-dependent coverage is collected for this signal.
    /// Cleared when the declared width exceeds the supported maximum.
    pub coverage: bool,
}

impl Signal {
    /// Appends an expression to the reader list if not already present.
    pub fn add_reader(&mut self, expr: ExprId) {
        if !self.readers.contains(&expr) {
            self.readers.push(expr);
        }
    }

    /// Removes an expression from the reader list.
    ///
    /// Returns `true` if the expression was present.
    pub fn remove_reader(&mut self, expr: ExprId) -> bool {
        let before = self.readers.len();
        self.readers.retain(|&r| r != expr);
        self.readers.len() != before
    }
}
