//! Hierarchical signal-to-expression binding for the vcov coverage engine.
//!
//! Parsing runs before the instance tree exists, so expressions that
//! reference signals are collected as pending records and resolved in a
//! single deterministic pass once the full tree is known. The
//! [`Binder`] owns that worklist; [`Binder::resolve_all`] converts every
//! record into a direct signal↔expression link or fails fatally.

#![warn(missing_docs)]

pub mod error;
pub mod resolver;

pub use error::BindError;
pub use resolver::{teardown_statement, BindOptions, Binder, PendingBinding};
