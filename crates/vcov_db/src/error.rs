//! Database error types.

/// Structural inconsistencies detected in the design database.
///
/// These indicate internal defects (a bug in binding or teardown), not bad
/// user input, and callers are expected to fail loudly on them.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A signal's reader list names an expression that does not point back.
    #[error(
        "reader list of signal {signal} contains expression {expr} \
         whose signal back-reference does not match"
    )]
    ReaderWithoutBackref {
        /// Raw ID of the signal whose reader list is inconsistent.
        signal: u32,
        /// Raw ID of the offending expression.
        expr: u32,
    },

    /// An expression references a signal whose reader list omits it.
    #[error(
        "expression {expr} references signal {signal} \
         but is missing from its reader list"
    )]
    BackrefWithoutReader {
        /// Raw ID of the offending expression.
        expr: u32,
        /// Raw ID of the referenced signal.
        signal: u32,
    },
}
