//! Scoring error types.
//!
//! A value-change event that cannot be applied stops the run: silently
//! dropping it would corrupt coverage for every downstream statement.

/// Errors that can occur while replaying a value-change trace.
#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    /// A value change arrived for a symbol no signal was assigned to.
    ///
    /// This indicates a mismatch between the design and the replayed trace.
    #[error("symbol '{symbol}' at time {time} does not map to any design signal")]
    UnknownSymbol {
        /// The unmapped waveform symbol.
        symbol: String,
        /// The timestep the event arrived at.
        time: u64,
    },

    /// The trace delivered a timestamp earlier than the current one.
    #[error("time moved backwards: {from} -> {to}")]
    TimeReversal {
        /// The current timestep.
        from: u64,
        /// The offending earlier timestamp.
        to: u64,
    },

    /// A value string contained a character outside `{0,1,x,z}`.
    #[error("invalid value bit '{bit}' in change for symbol '{symbol}'")]
    InvalidValueBit {
        /// The waveform symbol the change targeted.
        symbol: String,
        /// The offending character.
        bit: char,
    },

    /// A signal-reading expression reached evaluation without a bound
    /// signal. This is a structural defect left behind by binding, not a
    /// trace problem.
    #[error("expression {expr} evaluated with no bound signal")]
    UnboundExpression {
        /// Raw ID of the offending expression.
        expr: u32,
    },
}
