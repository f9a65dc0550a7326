//! The propagation scheduler.
//!
//! [`Scheduler::on_value_change`] applies one decoded value change to its
//! signal and enqueues the signal's reader expressions;
//! [`Scheduler::advance_timestep`] drains the queue bottom-up, enqueueing a
//! parent only when a child's value actually changed. The in-queue flag
//! makes enqueueing at-most-once per timestep, which both bounds the drain
//! and prevents re-entrant evaluation of a node mid-drain.
//!
//! A node is enqueued only in reaction to an observed child or signal
//! change, never eagerly, so within one drain no node evaluates on stale
//! child data. A timestep always drains fully before the decoder may
//! deliver the next timestamp.

use crate::error::ScoreError;
use crate::eval::evaluate;
use crate::symbol::SymbolTable;
use std::collections::VecDeque;
use vcov_common::{Interner, Logic};
use vcov_db::{Design, ExprId};
use vcov_diagnostics::DiagnosticSink;

/// The event queue and per-timestep state of a scoring run.
#[derive(Debug, Default)]
pub struct Scheduler {
    queue: VecDeque<ExprId>,
    symbols: SymbolTable,
    time: u64,
    /// Expressions evaluated this timestep, for transient-flag clearing.
    processed: Vec<ExprId>,
}

impl Scheduler {
    /// Creates an idle scheduler at time 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current timestep.
    pub fn time(&self) -> u64 {
        self.time
    }

    /// Registers a waveform symbol for a hierarchical signal name.
    ///
    /// Must be called before any value change for that symbol arrives.
    #[allow(clippy::too_many_arguments)]
    pub fn assign_symbol(
        &mut self,
        design: &Design,
        interner: &Interner,
        hier_name: &str,
        symbol: &str,
        msb: i32,
        lsb: i32,
        sink: &DiagnosticSink,
    ) {
        self.symbols
            .assign(design, interner, hier_name, symbol, msb, lsb, sink);
    }

    /// Marks a symbol as an out-of-band control code to be dropped.
    pub fn ignore_symbol(&mut self, symbol: &str) {
        self.symbols.ignore(symbol);
    }

    /// Moves the clock forward.
    ///
    /// The decoder must deliver timestamps in non-decreasing order; going
    /// backwards is fatal.
    pub fn set_time(&mut self, time: u64) -> Result<(), ScoreError> {
        if time < self.time {
            return Err(ScoreError::TimeReversal {
                from: self.time,
                to: time,
            });
        }
        self.time = time;
        Ok(())
    }

    /// Applies one value change.
    ///
    /// The symbol is resolved to its signal bindings, the bits are written
    /// through the coverage-recording path, the 0→1/1→0 classification of
    /// the signal's LSB is recorded onto edge-detector readers, and every
    /// reader is enqueued at most once.
    ///
    /// `bits` is MSB-first over `{0,1,x,z}`, the way dump formats spell
    /// vector values.
    pub fn on_value_change(
        &mut self,
        design: &mut Design,
        symbol: &str,
        bits: &str,
    ) -> Result<(), ScoreError> {
        if self.symbols.is_ignored(symbol) {
            return Ok(());
        }
        let bindings = self
            .symbols
            .resolve(symbol)
            .ok_or_else(|| ScoreError::UnknownSymbol {
                symbol: symbol.to_string(),
                time: self.time,
            })?
            .to_vec();
        let bits = parse_bits(symbol, bits)?;

        for binding in bindings {
            let (rise, fall) = {
                let sig = &mut design.signals[binding.signal];
                let offset =
                    (binding.lsb as i64 - sig.value.lsb() as i64).max(0) as u32;
                let old = sig.value.get(0);
                sig.value.set_bits(&bits, offset);
                let new = sig.value.get(0);
                (
                    old == Logic::Zero && new == Logic::One,
                    old == Logic::One && new == Logic::Zero,
                )
            };

            let readers = design.signals[binding.signal].readers.clone();
            for reader in readers {
                let expr = &mut design.exprs[reader];
                if expr.op.is_edge() {
                    if rise {
                        expr.state.set_saw_rise(true);
                    }
                    if fall {
                        expr.state.set_saw_fall(true);
                    }
                }
                if !expr.state.in_queue() {
                    expr.state.set_in_queue(true);
                    self.queue.push_back(reader);
                }
            }
        }
        Ok(())
    }

    /// Drains the queue for the current timestep.
    ///
    /// Pops and evaluates expressions until the queue empties, enqueueing a
    /// parent whenever a child's value changed. Afterwards the per-timestep
    /// state is cleared: in-queue/changed/edge flags of every processed
    /// expression and the symbol resolution cache. Toggle coverage is
    /// cumulative for the run and untouched.
    pub fn advance_timestep(&mut self, design: &mut Design) -> Result<(), ScoreError> {
        while let Some(id) = self.queue.pop_front() {
            let outcome = evaluate(design, id)?;
            self.processed.push(id);
            if outcome.changed {
                if let Some(parent) = design.exprs[id].parent {
                    let state = &mut design.exprs[parent].state;
                    if !state.in_queue() {
                        state.set_in_queue(true);
                        self.queue.push_back(parent);
                    }
                }
            }
        }
        for id in self.processed.drain(..) {
            design.exprs[id].state.clear_timestep();
        }
        self.symbols.clear_timestep();
        Ok(())
    }
}

/// Parses an MSB-first value string into LSB-first logic values.
fn parse_bits(symbol: &str, s: &str) -> Result<Vec<Logic>, ScoreError> {
    s.chars()
        .rev()
        .map(|c| {
            Logic::from_char(c).ok_or(ScoreError::InvalidValueBit {
                symbol: symbol.to_string(),
                bit: c,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vcov_bind::{BindOptions, Binder};
    use vcov_db::{ExprOp, SignalId, SignalKind};

    struct Fixture {
        design: Design,
        interner: Interner,
        sink: DiagnosticSink,
        sched: Scheduler,
    }

    /// One module `top` instantiated as the tree root, with a 1-bit wire
    /// `s` dumped under symbol `s_sym`.
    fn fixture() -> (Fixture, SignalId) {
        let mut design = Design::new();
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let m = design.add_module(interner.get_or_intern("top"));
        design.add_instance(interner.get_or_intern("top"), m, None);
        let s = design.add_signal(
            m,
            interner.get_or_intern("s"),
            SignalKind::Wire,
            1,
            0,
            &interner,
            &sink,
        );
        let mut sched = Scheduler::new();
        sched.assign_symbol(&design, &interner, "top.s", "s_sym", 0, 0, &sink);
        (
            Fixture {
                design,
                interner,
                sink,
                sched,
            },
            s,
        )
    }

    fn bind_all(f: &mut Fixture, binder: Binder) {
        binder
            .resolve_all(
                &mut f.design,
                &f.interner,
                &BindOptions::default(),
                &f.sink,
            )
            .unwrap();
    }

    #[test]
    fn sig_unot_chain_scores_both_nodes() {
        let (mut f, _s) = fixture();
        let m = f.design.modules.iter().next().unwrap().0;
        let e1 = f.design.add_leaf(ExprOp::Signal);
        let e2 = f.design.add_unary(ExprOp::Unot, e1);
        f.design.add_statement(m, e2);
        let mut binder = Binder::new();
        binder.add("s", e1, m);
        bind_all(&mut f, binder);

        f.sched
            .on_value_change(&mut f.design, "s_sym", "0")
            .unwrap();
        f.sched.advance_timestep(&mut f.design).unwrap();

        assert_eq!(f.design.exprs[e1].value.to_u64(), Some(0));
        assert!(f.design.exprs[e1].state.executed());
        assert_eq!(f.design.exprs[e2].value.to_u64(), Some(1));
        assert!(f.design.exprs[e2].state.executed());
        assert!(f.design.exprs[e2].state.eval_true());
    }

    #[test]
    fn chain_evaluates_bottom_up_with_fresh_values() {
        let (mut f, _s) = fixture();
        let m = f.design.modules.iter().next().unwrap().0;
        let a = f.design.add_leaf(ExprOp::Signal);
        let b = f.design.add_unary(ExprOp::Uinv, a);
        let c = f.design.add_unary(ExprOp::Uinv, b);
        f.design.add_statement(m, c);
        let mut binder = Binder::new();
        binder.add("s", a, m);
        bind_all(&mut f, binder);

        f.sched
            .on_value_change(&mut f.design, "s_sym", "0")
            .unwrap();
        f.sched.advance_timestep(&mut f.design).unwrap();

        // Had C seen B's stale (X) value, C would be X; instead the drain
        // order guarantees C observes B's updated value.
        assert_eq!(f.design.exprs[b].value.to_u64(), Some(1));
        assert_eq!(f.design.exprs[c].value.to_u64(), Some(0));
        assert!(f.design.exprs[c].state.executed());
    }

    #[test]
    fn aliased_symbols_enqueue_readers_once() {
        let (mut f, _s) = fixture();
        let m = f.design.modules.iter().next().unwrap().0;
        // A second symbol for the same signal
        f.sched
            .assign_symbol(&f.design, &f.interner, "top.s", "alias", 0, 0, &f.sink);
        let e1 = f.design.add_leaf(ExprOp::Signal);
        f.design.add_statement(m, e1);
        let mut binder = Binder::new();
        binder.add("s", e1, m);
        bind_all(&mut f, binder);

        f.sched
            .on_value_change(&mut f.design, "s_sym", "1")
            .unwrap();
        f.sched
            .on_value_change(&mut f.design, "alias", "1")
            .unwrap();
        // Both symbols updated the shared signal, but the reader sits in
        // the queue exactly once.
        assert_eq!(f.sched.queue.len(), 1);
        f.sched.advance_timestep(&mut f.design).unwrap();
        assert_eq!(f.design.exprs[e1].value.to_u64(), Some(1));
    }

    #[test]
    fn unknown_symbol_is_fatal() {
        let (mut f, _s) = fixture();
        let err = f
            .sched
            .on_value_change(&mut f.design, "bogus", "1")
            .unwrap_err();
        assert!(matches!(err, ScoreError::UnknownSymbol { .. }));
    }

    #[test]
    fn ignored_symbol_is_dropped() {
        let (mut f, s) = fixture();
        f.sched.ignore_symbol("$off");
        f.sched
            .on_value_change(&mut f.design, "$off", "1")
            .unwrap();
        assert_eq!(f.design.signals[s].value.get(0), Logic::X);
    }

    #[test]
    fn invalid_value_bit_is_fatal() {
        let (mut f, _s) = fixture();
        let err = f
            .sched
            .on_value_change(&mut f.design, "s_sym", "2")
            .unwrap_err();
        assert!(matches!(err, ScoreError::InvalidValueBit { bit: '2', .. }));
    }

    #[test]
    fn time_must_not_reverse() {
        let (mut f, _s) = fixture();
        f.sched.set_time(100).unwrap();
        let err = f.sched.set_time(90).unwrap_err();
        assert!(matches!(
            err,
            ScoreError::TimeReversal { from: 100, to: 90 }
        ));
        // Equal time is allowed
        f.sched.set_time(100).unwrap();
    }

    #[test]
    fn in_queue_flags_cleared_after_drain() {
        let (mut f, _s) = fixture();
        let m = f.design.modules.iter().next().unwrap().0;
        let e1 = f.design.add_leaf(ExprOp::Signal);
        f.design.add_statement(m, e1);
        let mut binder = Binder::new();
        binder.add("s", e1, m);
        bind_all(&mut f, binder);

        f.sched
            .on_value_change(&mut f.design, "s_sym", "1")
            .unwrap();
        assert!(f.design.exprs[e1].state.in_queue());
        f.sched.advance_timestep(&mut f.design).unwrap();
        assert!(!f.design.exprs[e1].state.in_queue());
        assert!(!f.design.exprs[e1].state.changed());
        // Sticky coverage survives the timestep boundary
        assert!(f.design.exprs[e1].state.executed());
    }

    #[test]
    fn toggle_coverage_accumulates_across_timesteps() {
        let (mut f, s) = fixture();
        f.sched
            .on_value_change(&mut f.design, "s_sym", "0")
            .unwrap();
        f.sched.advance_timestep(&mut f.design).unwrap();
        f.sched.set_time(10).unwrap();
        f.sched
            .on_value_change(&mut f.design, "s_sym", "1")
            .unwrap();
        f.sched.advance_timestep(&mut f.design).unwrap();
        f.sched.set_time(20).unwrap();
        f.sched
            .on_value_change(&mut f.design, "s_sym", "0")
            .unwrap();
        f.sched.advance_timestep(&mut f.design).unwrap();

        let value = &f.design.signals[s].value;
        assert!(value.toggled_0_to_1(0));
        assert!(value.toggled_1_to_0(0));
    }

    #[test]
    fn edge_detector_sees_rise_then_not_fall() {
        let (mut f, _s) = fixture();
        let m = f.design.modules.iter().next().unwrap().0;
        let edge = f.design.add_leaf(ExprOp::Posedge);
        f.design.add_statement(m, edge);
        let mut binder = Binder::new();
        binder.add("s", edge, m);
        bind_all(&mut f, binder);

        // Establish a 0 first, then a rising edge
        f.sched
            .on_value_change(&mut f.design, "s_sym", "0")
            .unwrap();
        f.sched.advance_timestep(&mut f.design).unwrap();
        f.sched.set_time(10).unwrap();
        f.sched
            .on_value_change(&mut f.design, "s_sym", "1")
            .unwrap();
        f.sched.advance_timestep(&mut f.design).unwrap();
        assert!(f.design.exprs[edge].state.eval_true());

        // A repeated 1 is no edge: the detector evaluates false
        f.sched.set_time(20).unwrap();
        f.sched
            .on_value_change(&mut f.design, "s_sym", "1")
            .unwrap();
        f.sched.advance_timestep(&mut f.design).unwrap();
        assert!(f.design.exprs[edge].state.eval_false());
    }

    #[test]
    fn statement_executes_and_counts_for_line_coverage() {
        let (mut f, _s) = fixture();
        let m = f.design.modules.iter().next().unwrap().0;
        let e1 = f.design.add_leaf(ExprOp::Signal);
        let e2 = f.design.add_unary(ExprOp::Unot, e1);
        f.design.add_statement(m, e2);
        let mut binder = Binder::new();
        binder.add("s", e1, m);
        bind_all(&mut f, binder);

        let before = vcov_db::LineSummary::for_module(&f.design, m);
        assert_eq!(before.executed, 0);
        assert_eq!(before.total, 1);

        f.sched
            .on_value_change(&mut f.design, "s_sym", "1")
            .unwrap();
        f.sched.advance_timestep(&mut f.design).unwrap();

        let after = vcov_db::LineSummary::for_module(&f.design, m);
        assert_eq!(after.executed, 1);
    }

    #[test]
    fn multi_bit_change_updates_all_bits() {
        let (mut f, _s) = fixture();
        let m = f.design.modules.iter().next().unwrap().0;
        let bus = f.design.add_signal(
            m,
            f.interner.get_or_intern("bus"),
            SignalKind::Wire,
            4,
            0,
            &f.interner,
            &f.sink,
        );
        f.sched
            .assign_symbol(&f.design, &f.interner, "top.bus", "b", 3, 0, &f.sink);
        f.sched
            .on_value_change(&mut f.design, "b", "10xz")
            .unwrap();
        let value = &f.design.signals[bus].value;
        assert_eq!(value.get(3), Logic::One);
        assert_eq!(value.get(2), Logic::Zero);
        assert_eq!(value.get(1), Logic::X);
        assert_eq!(value.get(0), Logic::Z);
    }
}
