//! Module definitions — the unit coverage is accumulated against.
//!
//! A [`Module`] is a shared definition: every instantiation of it in the
//! instance tree scores into the same signals and statements, which is what
//! merges coverage across instances of the same design unit.

use crate::ids::{ModuleId, SignalId, StmtId};
use serde::{Deserialize, Serialize};
use vcov_common::Ident;

/// A module parameter resolved by elaboration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// The parameter name.
    pub name: Ident,
    /// The resolved value.
    pub value: u64,
}

/// A module definition.
///
/// Signal lookup by name goes through
/// [`Design::signal_by_name`](crate::design::Design::signal_by_name), which
/// scans the declaration-ordered signal list against the signal arena.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// The unique ID of this module in the design.
    pub id: ModuleId,
    /// The module name.
    pub name: Ident,
    /// Signals declared in this module, in declaration order.
    pub signals: Vec<SignalId>,
    /// Statements (root expressions) of this module.
    pub statements: Vec<StmtId>,
    /// Parameters resolved by elaboration.
    pub params: Vec<Parameter>,
}

impl Module {
    /// Creates a new empty module.
    pub fn new(id: ModuleId, name: Ident) -> Self {
        Self {
            id,
            name,
            signals: Vec::new(),
            statements: Vec::new(),
            params: Vec::new(),
        }
    }
}
