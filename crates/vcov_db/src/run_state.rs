//! Supplemental run state carried by every expression node.

use serde::{Deserialize, Serialize};

const IN_QUEUE: u16 = 1 << 0;
const EXECUTED: u16 = 1 << 1;
const CHANGED: u16 = 1 << 2;
const MEASURABLE: u16 = 1 << 3;
const EVAL_TRUE: u16 = 1 << 4;
const EVAL_FALSE: u16 = 1 << 5;
const SIZED_EXTERNALLY: u16 = 1 << 6;
const SAW_RISE: u16 = 1 << 7;
const SAW_FALL: u16 = 1 << 8;

/// Packed per-expression run state with typed accessors.
///
/// Three lifetimes of flag coexist in one word:
/// - sticky for the run: `executed`, `eval_true`, `eval_false`,
///   `sized_externally`;
/// - transient per timestep: `in_queue`, `changed`, `saw_rise`, `saw_fall`
///   (cleared by [`clear_timestep`](Self::clear_timestep) when the
///   scheduler finishes a drain);
/// - recomputed per evaluation: `measurable`.
///
/// `sig_lsb` caches the declared LSB of the bound signal for the bit-select
/// operators; it must be rewritten whenever that signal is resized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    flags: u16,
    /// Declared LSB of the bound signal, cached for bit-select indexing.
    pub sig_lsb: i32,
}

macro_rules! flag_accessors {
    ($(#[$get_meta:meta])* $get:ident, $set:ident, $flag:ident) => {
        $(#[$get_meta])*
        pub fn $get(&self) -> bool {
            self.flags & $flag != 0
        }

        /// Sets or clears the flag.
        pub fn $set(&mut self, value: bool) {
            if value {
                self.flags |= $flag;
            } else {
                self.flags &= !$flag;
            }
        }
    };
}

impl RunState {
    /// Creates a cleared run state.
    pub fn new() -> Self {
        Self::default()
    }

    flag_accessors!(
        /// The expression is awaiting evaluation this timestep.
        in_queue,
        set_in_queue,
        IN_QUEUE
    );

    flag_accessors!(
        /// The expression has been evaluated at least once this run.
        executed,
        set_executed,
        EXECUTED
    );

    flag_accessors!(
        /// The last evaluation produced a different value.
        changed,
        set_changed,
        CHANGED
    );

    flag_accessors!(
        /// The last evaluation reduced unambiguously to 0 or 1.
        measurable,
        set_measurable,
        MEASURABLE
    );

    flag_accessors!(
        /// A definite true outcome has been observed this run.
        eval_true,
        set_eval_true,
        EVAL_TRUE
    );

    flag_accessors!(
        /// A definite false outcome has been observed this run.
        eval_false,
        set_eval_false,
        EVAL_FALSE
    );

    flag_accessors!(
        /// The expression's width is supplied by elaboration, not by itself.
        sized_externally,
        set_sized_externally,
        SIZED_EXTERNALLY
    );

    flag_accessors!(
        /// The bound signal's bit 0 rose 0→1 this timestep.
        saw_rise,
        set_saw_rise,
        SAW_RISE
    );

    flag_accessors!(
        /// The bound signal's bit 0 fell 1→0 this timestep.
        saw_fall,
        set_saw_fall,
        SAW_FALL
    );

    /// Clears the transient per-timestep flags, leaving the sticky coverage
    /// flags untouched.
    pub fn clear_timestep(&mut self) {
        self.flags &= !(IN_QUEUE | CHANGED | SAW_RISE | SAW_FALL);
    }
}
