//! Trace replay driver.
//!
//! Waveform decoders hand the engine a stream of timestamped value changes.
//! [`replay`] is the one place the time-ordering contract is enforced:
//! every event of timestep T is applied and fully propagated before any
//! event of timestep T+1 is observed.

use crate::error::ScoreError;
use crate::scheduler::Scheduler;
use vcov_db::Design;

/// One decoded value change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueChange {
    /// The timestep the change occurred at.
    pub time: u64,
    /// The waveform symbol.
    pub symbol: String,
    /// The new value, MSB-first over `{0,1,x,z}`.
    pub bits: String,
}

impl ValueChange {
    /// Creates a value change.
    pub fn new(time: u64, symbol: impl Into<String>, bits: impl Into<String>) -> Self {
        Self {
            time,
            symbol: symbol.into(),
            bits: bits.into(),
        }
    }
}

/// Replays a stream of value changes to completion.
///
/// Events must arrive in non-decreasing time order. The queue is drained at
/// every time boundary and once more at end-of-stream, so the final
/// timestep's propagation is never lost.
pub fn replay(
    design: &mut Design,
    scheduler: &mut Scheduler,
    events: impl IntoIterator<Item = ValueChange>,
) -> Result<(), ScoreError> {
    for event in events {
        if event.time != scheduler.time() {
            if event.time < scheduler.time() {
                return Err(ScoreError::TimeReversal {
                    from: scheduler.time(),
                    to: event.time,
                });
            }
            scheduler.advance_timestep(design)?;
            scheduler.set_time(event.time)?;
        }
        scheduler.on_value_change(design, &event.symbol, &event.bits)?;
    }
    scheduler.advance_timestep(design)
}
