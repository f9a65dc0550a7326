//! Binding error types.

/// Errors that abort binding resolution.
///
/// Both variants are user errors in the design or its references, not
/// internal defects; no partial linking is performed for the failing record.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    /// A hierarchical reference names a scope absent from the instance tree.
    #[error("undefined hierarchical reference '{path}': no such scope")]
    UndefinedScope {
        /// The full hierarchical name that failed to resolve.
        path: String,
    },

    /// A referenced signal does not exist and implicit declarations are
    /// disallowed.
    #[error("undefined signal '{path}' and implicit declarations are disabled")]
    UndefinedSignal {
        /// The full name that failed to resolve.
        path: String,
    },
}
