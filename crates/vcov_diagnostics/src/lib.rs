//! Diagnostic reporting for the vcov coverage engine.
//!
//! Warnings and notes produced during binding and scoring (implicit signal
//! creation, oversized vectors, unknown dump symbols) are accumulated in a
//! [`DiagnosticSink`] for the caller to render; fatal conditions travel as
//! error values instead.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use severity::Severity;
pub use sink::DiagnosticSink;

/// `W101` — a referenced but undeclared signal was implicitly created.
pub const IMPLICIT_SIGNAL: DiagnosticCode = DiagnosticCode {
    category: Category::Warning,
    number: 101,
};

/// `W102` — a vector exceeds the maximum supported width; coverage disabled.
pub const OVERSIZED_VECTOR: DiagnosticCode = DiagnosticCode {
    category: Category::Warning,
    number: 102,
};

/// `W103` — a dump symbol names a signal absent from the design; ignored.
pub const UNKNOWN_DUMP_SIGNAL: DiagnosticCode = DiagnosticCode {
    category: Category::Warning,
    number: 103,
};

/// `E201` — a hierarchical reference names a scope absent from the design.
pub const UNDEFINED_SCOPE: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 201,
};
