//! Shared foundational types for the vcov coverage engine.
//!
//! This crate provides the 4-state logic value, the packed coverage vector
//! that embeds per-bit toggle/assignment bookkeeping, and interned
//! identifiers for hierarchical names.

#![warn(missing_docs)]

pub mod cov_vec;
pub mod ident;
pub mod logic;

pub use cov_vec::{CovVec, MAX_BIT_WIDTH};
pub use ident::{split_hierarchical, Ident, Interner};
pub use logic::Logic;
