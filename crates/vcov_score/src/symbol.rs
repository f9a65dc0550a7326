//! Waveform symbol resolution.
//!
//! Dump formats identify signals with short symbol codes. The decoder calls
//! [`SymbolTable::assign`] once per definition-section entry before any
//! value changes; scoring then resolves each arriving symbol to its signal
//! bindings. One symbol may fan out to several signals (aliased nets), and
//! several symbols may target one signal, so resolution yields a list.
//!
//! Resolutions are cached per timestep and re-resolved after each boundary,
//! since aliasing can stay ambiguous until a concrete value has arrived.

use std::collections::{HashMap, HashSet};
use vcov_common::{split_hierarchical, Ident, Interner};
use vcov_db::{Design, SignalId};
use vcov_diagnostics::{Diagnostic, DiagnosticSink, UNKNOWN_DUMP_SIGNAL};

/// One resolved target of a waveform symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolBinding {
    /// The target signal.
    pub signal: SignalId,
    /// MSB of the covered range, in the signal's declared index space.
    pub msb: i32,
    /// LSB of the covered range, in the signal's declared index space.
    pub lsb: i32,
}

/// The symbol registry plus the per-timestep resolution cache.
#[derive(Debug, Default)]
pub struct SymbolTable {
    registry: HashMap<String, Vec<SymbolBinding>>,
    active: HashMap<String, Vec<SymbolBinding>>,
    ignored: HashSet<String>,
}

impl SymbolTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `symbol` as covering `[msb:lsb]` of the signal named by
    /// `hier_name`.
    ///
    /// A name that resolves to no design signal is warned about (`W103`) and
    /// the symbol joins the ignored set; dump files routinely carry scopes
    /// that are not being scored.
    #[allow(clippy::too_many_arguments)]
    pub fn assign(
        &mut self,
        design: &Design,
        interner: &Interner,
        hier_name: &str,
        symbol: &str,
        msb: i32,
        lsb: i32,
        sink: &DiagnosticSink,
    ) {
        match find_signal(design, interner, hier_name) {
            Some(signal) => {
                self.registry
                    .entry(symbol.to_string())
                    .or_default()
                    .push(SymbolBinding { signal, msb, lsb });
            }
            None => {
                sink.emit(
                    Diagnostic::warning(
                        UNKNOWN_DUMP_SIGNAL,
                        format!("dump signal '{hier_name}' is not part of the design; ignored"),
                    )
                    .with_path(hier_name),
                );
                self.ignored.insert(symbol.to_string());
            }
        }
    }

    /// Marks a symbol as an out-of-band control code whose value changes
    /// are dropped (dump-on/off markers and the like).
    pub fn ignore(&mut self, symbol: &str) {
        self.ignored.insert(symbol.to_string());
    }

    /// Returns `true` if value changes for `symbol` should be dropped.
    pub fn is_ignored(&self, symbol: &str) -> bool {
        self.ignored.contains(symbol)
    }

    /// Resolves a symbol to its bindings, caching the result for the rest
    /// of the current timestep.
    pub fn resolve(&mut self, symbol: &str) -> Option<&[SymbolBinding]> {
        if !self.active.contains_key(symbol) {
            let bindings = self.registry.get(symbol)?.clone();
            self.active.insert(symbol.to_string(), bindings);
        }
        self.active.get(symbol).map(Vec::as_slice)
    }

    /// Drops the per-timestep resolution cache.
    pub fn clear_timestep(&mut self) {
        self.active.clear();
    }
}

/// Resolves a hierarchical signal name through the instance tree.
fn find_signal(design: &Design, interner: &Interner, hier_name: &str) -> Option<SignalId> {
    let (scope_path, leaf) = split_hierarchical(hier_name);
    if scope_path.is_empty() {
        return None;
    }
    let idents: Option<Vec<Ident>> = scope_path.iter().map(|c| interner.get(c)).collect();
    let instance = design.resolve_scope(&idents?)?;
    let leaf_ident = interner.get(leaf)?;
    design.signal_by_name(design.instances[instance].module, leaf_ident)
}
