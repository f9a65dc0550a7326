//! The instance tree.
//!
//! An [`Instance`] names one concrete instantiation of a module definition.
//! Several instances may share one definition; per-instance sizing
//! information synthesized during binding is carried as [`InstParam`]
//! records on the instance, not on the shared module.

use crate::ids::{InstanceId, ModuleId};
use serde::{Deserialize, Serialize};
use vcov_common::Ident;

/// A parameter attached to one specific instance.
///
/// The binding resolver synthesizes these for cross-scope references whose
/// width depends on the referenced instance (spelled `name` after the
/// referenced signal); elaboration reads them when finalizing sizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstParam {
    /// The synthesized parameter name.
    pub name: Ident,
    /// The carried width.
    pub width: u32,
    /// The carried LSB.
    pub lsb: i32,
}

/// A node of the instance tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    /// The unique ID of this instance.
    pub id: InstanceId,
    /// The instance name (one component of a hierarchical path).
    pub name: Ident,
    /// The module definition this instance points at.
    pub module: ModuleId,
    /// Child instances, in declaration order.
    pub children: Vec<InstanceId>,
    /// Instance-scoped parameters synthesized during binding.
    pub params: Vec<InstParam>,
}

impl Instance {
    /// Creates a new instance of `module` with no children.
    pub fn new(id: InstanceId, name: Ident, module: ModuleId) -> Self {
        Self {
            id,
            name,
            module,
            children: Vec::new(),
            params: Vec::new(),
        }
    }
}
