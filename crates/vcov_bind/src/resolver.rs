//! The binding resolver.
//!
//! [`Binder::resolve_all`] runs exactly once, after the full instance tree
//! exists. Each pending record is resolved by walking the tree for its
//! scope prefix, looking the leaf name up in the resolved module, and
//! linking the signal's reader list with the expression's back-reference.
//! The pass consumes the worklist: an entry that survived resolution would
//! be a structural bug, and the consuming signature makes that state
//! unrepresentable.

use crate::error::BindError;
use vcov_common::{split_hierarchical, Ident, Interner};
use vcov_db::{Design, ExprId, ExprOp, InstParam, ModuleId, SignalKind};
use vcov_diagnostics::{Diagnostic, DiagnosticSink, IMPLICIT_SIGNAL, UNDEFINED_SCOPE};

/// Options controlling binding resolution.
#[derive(Debug, Clone, Copy)]
pub struct BindOptions {
    /// Whether a referenced but undeclared signal may be auto-created as a
    /// 1-bit implicit signal (Verilog default semantics).
    pub allow_implicit: bool,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self {
            allow_implicit: true,
        }
    }
}

/// A pending signal reference awaiting resolution.
#[derive(Debug, Clone)]
pub struct PendingBinding {
    /// The referenced name, possibly hierarchical (`top.u0.count`).
    pub name: String,
    /// The expression that reads the signal.
    pub expr: ExprId,
    /// The module scope the reference appears in.
    pub scope: ModuleId,
}

/// The binding worklist.
#[derive(Debug, Default)]
pub struct Binder {
    pending: Vec<PendingBinding>,
}

impl Binder {
    /// Creates an empty binder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a pending binding for `expr` in `scope`.
    pub fn add(&mut self, name: impl Into<String>, expr: ExprId, scope: ModuleId) {
        self.pending.push(PendingBinding {
            name: name.into(),
            expr,
            scope,
        });
    }

    /// Removes every pending entry naming `expr`.
    ///
    /// Must be called before an expression is torn down; an entry that
    /// outlived its expression would resolve into a dangling target.
    /// Returns `true` if any entry was removed.
    pub fn remove_expr(&mut self, expr: ExprId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.expr != expr);
        self.pending.len() != before
    }

    /// Returns the number of unresolved entries.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if no entries are pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Resolves every pending binding against the finished instance tree.
    ///
    /// A single deterministic pass; the worklist is consumed. Implicit
    /// signal creation emits `W101` and continues; an undefined scope or
    /// (with implicit declarations disabled) an undefined signal aborts with
    /// no partial linking for the failing record.
    pub fn resolve_all(
        self,
        design: &mut Design,
        interner: &Interner,
        opts: &BindOptions,
        sink: &DiagnosticSink,
    ) -> Result<(), BindError> {
        for entry in self.pending {
            resolve_one(&entry, design, interner, opts, sink)?;
        }
        Ok(())
    }
}

/// Resolves one pending record.
fn resolve_one(
    entry: &PendingBinding,
    design: &mut Design,
    interner: &Interner,
    opts: &BindOptions,
    sink: &DiagnosticSink,
) -> Result<(), BindError> {
    let (scope_path, leaf) = split_hierarchical(&entry.name);

    // A dotted prefix selects a scope through the instance tree; an
    // undotted name resolves in the owning module.
    let target_module = if scope_path.is_empty() {
        entry.scope
    } else {
        let idents: Option<Vec<Ident>> =
            scope_path.iter().map(|c| interner.get(c)).collect();
        let instance = idents
            .as_deref()
            .and_then(|path| design.resolve_scope(path));
        match instance {
            Some(inst) => design.instances[inst].module,
            None => {
                sink.emit(
                    Diagnostic::error(
                        UNDEFINED_SCOPE,
                        format!("hierarchical reference '{}' names no scope", entry.name),
                    )
                    .with_path(entry.name.clone()),
                );
                return Err(BindError::UndefinedScope {
                    path: entry.name.clone(),
                });
            }
        }
    };

    let leaf_ident = interner.get_or_intern(leaf);
    let signal = match design.signal_by_name(target_module, leaf_ident) {
        Some(sig) => sig,
        None if opts.allow_implicit => {
            sink.emit(
                Diagnostic::warning(
                    IMPLICIT_SIGNAL,
                    format!("signal '{}' was never declared; creating 1-bit implicit net", leaf),
                )
                .with_path(entry.name.clone()),
            );
            design.add_signal(
                target_module,
                leaf_ident,
                SignalKind::Implicit,
                1,
                0,
                interner,
                sink,
            )
        }
        None => {
            return Err(BindError::UndefinedSignal {
                path: entry.name.clone(),
            });
        }
    };

    link(design, entry.expr, signal);

    // Cross-scope references: the referenced signal's width may only be
    // final once its own module is elaborated, so the expression defers its
    // sizing to elaboration and each instance of the referencing module
    // carries the size as a synthesized parameter.
    if target_module != entry.scope {
        let (width, lsb) = {
            let value = &design.signals[signal].value;
            (value.width(), value.lsb())
        };
        design.exprs[entry.expr].state.set_sized_externally(true);
        let instances: Vec<_> = design
            .instances
            .iter()
            .filter(|(_, inst)| inst.module == entry.scope)
            .map(|(id, _)| id)
            .collect();
        for inst in instances {
            let params = &mut design.instances[inst].params;
            if !params.iter().any(|p| p.name == leaf_ident) {
                params.push(InstParam {
                    name: leaf_ident,
                    width,
                    lsb,
                });
            }
        }
    }

    Ok(())
}

/// Tears down a statement together with its binding state.
///
/// Unlinks every node of the statement's expression tree from signal reader
/// lists and drops any pending entry still naming one of them. Skipping the
/// binder half would leave an entry that resolves into a dangling target.
pub fn teardown_statement(design: &mut Design, binder: &mut Binder, stmt: vcov_db::StmtId) {
    design.unlink_statement(stmt, |expr| {
        binder.remove_expr(expr);
    });
}

/// Wires the bidirectional signal↔expression link and sizes the expression.
fn link(design: &mut Design, expr: ExprId, signal: vcov_db::SignalId) {
    let (width, lsb) = {
        let value = &design.signals[signal].value;
        (value.width(), value.lsb())
    };
    design.signals[signal].add_reader(expr);
    let node = &mut design.exprs[expr];
    debug_assert!(node.signal.is_none(), "expression bound twice");
    node.signal = Some(signal);
    if node.op.is_bit_select() {
        node.state.sig_lsb = lsb;
    }
    if node.op == ExprOp::Signal {
        node.value.resize(width, 0);
    }
}
