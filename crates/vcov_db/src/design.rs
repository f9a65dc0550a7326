//! Top-level design container.
//!
//! A [`Design`] owns every arena of the database plus the instance tree
//! root. All cross-entity links (expression children and parents, signal
//! reader lists, instance children) are IDs into these arenas.

use crate::arena::Arena;
use crate::error::DbError;
use crate::expr::{Expression, Statement};
use crate::ids::{ExprId, InstanceId, ModuleId, SignalId, StmtId};
use crate::instance::Instance;
use crate::module::Module;
use crate::op::ExprOp;
use crate::signal::{Signal, SignalKind};
use serde::{Deserialize, Serialize};
use vcov_common::{CovVec, Ident, Interner, MAX_BIT_WIDTH};
use vcov_diagnostics::{Diagnostic, DiagnosticSink, OVERSIZED_VECTOR};

/// The complete in-memory model a scoring run operates on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Design {
    /// All module definitions.
    pub modules: Arena<ModuleId, Module>,
    /// The instance tree nodes.
    pub instances: Arena<InstanceId, Instance>,
    /// All signals, owned by their modules.
    pub signals: Arena<SignalId, Signal>,
    /// All expression nodes.
    pub exprs: Arena<ExprId, Expression>,
    /// All statements.
    pub statements: Arena<StmtId, Statement>,
    /// The root of the instance tree.
    pub top: Option<InstanceId>,
}

impl Design {
    /// Creates an empty design.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a module definition.
    pub fn add_module(&mut self, name: Ident) -> ModuleId {
        let id = ModuleId::from_raw(self.modules.len() as u32);
        self.modules.alloc(Module::new(id, name))
    }

    /// Adds an instance of `module` under `parent`.
    ///
    /// Passing `parent = None` makes the instance the tree root.
    ///
    /// # Panics
    ///
    /// Panics if a second root is added.
    pub fn add_instance(
        &mut self,
        name: Ident,
        module: ModuleId,
        parent: Option<InstanceId>,
    ) -> InstanceId {
        let id = InstanceId::from_raw(self.instances.len() as u32);
        let inst = self.instances.alloc(Instance::new(id, name, module));
        match parent {
            Some(p) => self.instances[p].children.push(inst),
            None => {
                assert!(self.top.is_none(), "instance tree already has a root");
                self.top = Some(inst);
            }
        }
        inst
    }

    /// Adds a signal to a module.
    ///
    /// A declared width beyond [`MAX_BIT_WIDTH`] is rejected with a `W102`
    /// warning: the signal is stored 1 bit wide with coverage disabled, so
    /// the run degrades instead of aborting.
    #[allow(clippy::too_many_arguments)]
    pub fn add_signal(
        &mut self,
        module: ModuleId,
        name: Ident,
        kind: SignalKind,
        width: u32,
        lsb: i32,
        interner: &Interner,
        sink: &DiagnosticSink,
    ) -> SignalId {
        let (width, coverage) = if width > MAX_BIT_WIDTH {
            sink.emit(
                Diagnostic::warning(
                    OVERSIZED_VECTOR,
                    format!(
                        "signal '{}' declared {width} bits wide exceeds the \
                         {MAX_BIT_WIDTH}-bit maximum; treated as unsized",
                        interner.resolve(name)
                    ),
                )
                .with_path(interner.resolve(name)),
            );
            (1, false)
        } else {
            (width, true)
        };

        let id = SignalId::from_raw(self.signals.len() as u32);
        let sig = self.signals.alloc(Signal {
            id,
            name,
            kind,
            module,
            value: CovVec::new(width, lsb),
            readers: Vec::new(),
            coverage,
        });
        self.modules[module].signals.push(sig);
        sig
    }

    /// Looks up a signal by leaf name within a module.
    pub fn signal_by_name(&self, module: ModuleId, name: Ident) -> Option<SignalId> {
        self.modules[module]
            .signals
            .iter()
            .copied()
            .find(|&s| self.signals[s].name == name)
    }

    /// Resolves a hierarchical scope path to an instance.
    ///
    /// The first component must name the tree root; each further component
    /// selects a child by instance name. Returns `None` if any component is
    /// absent.
    pub fn resolve_scope(&self, path: &[Ident]) -> Option<InstanceId> {
        let top = self.top?;
        let (first, rest) = path.split_first()?;
        if self.instances[top].name != *first {
            return None;
        }
        let mut current = top;
        for component in rest {
            current = self.instances[current]
                .children
                .iter()
                .copied()
                .find(|&c| self.instances[c].name == *component)?;
        }
        Some(current)
    }

    /// Adds a constant expression node.
    pub fn add_const(&mut self, value: CovVec) -> ExprId {
        let id = ExprId::from_raw(self.exprs.len() as u32);
        self.exprs.alloc(Expression::constant(id, value))
    }

    /// Adds a signal-reading leaf node; the signal is bound later by the
    /// resolver.
    pub fn add_leaf(&mut self, op: ExprOp) -> ExprId {
        let id = ExprId::from_raw(self.exprs.len() as u32);
        self.exprs.alloc(Expression::leaf(id, op))
    }

    /// Adds a unary operator node and wires the child's parent link.
    ///
    /// # Panics
    ///
    /// Panics if the child already has a parent.
    pub fn add_unary(&mut self, op: ExprOp, child: ExprId) -> ExprId {
        let id = ExprId::from_raw(self.exprs.len() as u32);
        let node = self.exprs.alloc(Expression::unary(id, op, child));
        self.set_parent(child, node);
        node
    }

    /// Adds a binary operator node and wires both children's parent links.
    ///
    /// # Panics
    ///
    /// Panics if either child already has a parent.
    pub fn add_binary(&mut self, op: ExprOp, left: ExprId, right: ExprId) -> ExprId {
        let id = ExprId::from_raw(self.exprs.len() as u32);
        let node = self.exprs.alloc(Expression::binary(id, op, left, right));
        self.set_parent(left, node);
        self.set_parent(right, node);
        node
    }

    fn set_parent(&mut self, child: ExprId, parent: ExprId) {
        let slot = &mut self.exprs[child].parent;
        assert!(slot.is_none(), "expression {} already has a parent", child.as_raw());
        *slot = Some(parent);
    }

    /// Registers `root` as a statement of `module`.
    ///
    /// # Panics
    ///
    /// Panics if `root` is not a root expression.
    pub fn add_statement(&mut self, module: ModuleId, root: ExprId) -> StmtId {
        assert!(
            self.exprs[root].is_root(),
            "statement root {} has a parent",
            root.as_raw()
        );
        let id = StmtId::from_raw(self.statements.len() as u32);
        let stmt = self.statements.alloc(Statement { id, module, root });
        self.modules[module].statements.push(stmt);
        stmt
    }

    /// Resizes a signal to new dimensions.
    ///
    /// This is the elaboration-phase hook that finalizes parameter-dependent
    /// sizes. The signal's vector keeps accumulated coverage on overlapping
    /// bits; every bit-select reader has its cached `sig_lsb` rewritten, and
    /// every externally-sized reader has its result vector re-sized to
    /// follow the signal.
    pub fn resize_signal(&mut self, sig: SignalId, width: u32, lsb: i32) {
        let readers = self.signals[sig].readers.clone();
        self.signals[sig].value.resize(width, lsb);
        for reader in readers {
            let expr = &mut self.exprs[reader];
            if expr.op.is_bit_select() {
                expr.state.sig_lsb = lsb;
            }
            if expr.state.sized_externally() || expr.op == ExprOp::Signal {
                expr.value.resize(width, 0);
            }
        }
    }

    /// Tears down a statement: unlinks every node of its expression tree
    /// from signal reader lists, clears the back-references, and removes the
    /// statement from its module.
    ///
    /// `on_unlink` is invoked for every expression node and is where the
    /// caller must drop any pending-binding entry still naming the node (a
    /// pending entry that survives teardown would resolve into a dangling
    /// target).
    pub fn unlink_statement(&mut self, stmt: StmtId, mut on_unlink: impl FnMut(ExprId)) {
        let module = self.statements[stmt].module;
        let mut stack = vec![self.statements[stmt].root];
        while let Some(id) = stack.pop() {
            let (signal, left, right) = {
                let e = &self.exprs[id];
                (e.signal, e.left, e.right)
            };
            if let Some(sig) = signal {
                self.signals[sig].remove_reader(id);
                self.exprs[id].signal = None;
            }
            on_unlink(id);
            stack.extend(left);
            stack.extend(right);
        }
        self.modules[module].statements.retain(|&s| s != stmt);
    }

    /// Checks the bidirectional reader-list/back-reference invariant.
    ///
    /// A failure indicates a structural bug in binding or teardown, never
    /// bad input; callers should treat it as fatal.
    pub fn verify_consistency(&self) -> Result<(), DbError> {
        for (sig_id, sig) in self.signals.iter() {
            for &reader in &sig.readers {
                if self.exprs[reader].signal != Some(sig_id) {
                    return Err(DbError::ReaderWithoutBackref {
                        signal: sig_id.as_raw(),
                        expr: reader.as_raw(),
                    });
                }
            }
        }
        for (expr_id, expr) in self.exprs.iter() {
            if let Some(sig) = expr.signal {
                if !self.signals[sig].readers.contains(&expr_id) {
                    return Err(DbError::BackrefWithoutReader {
                        expr: expr_id.as_raw(),
                        signal: sig.as_raw(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Design, Interner, DiagnosticSink) {
        (Design::new(), Interner::new(), DiagnosticSink::new())
    }

    #[test]
    fn add_module_and_signal() {
        let (mut d, interner, sink) = setup();
        let m = d.add_module(interner.get_or_intern("counter"));
        let s = d.add_signal(
            m,
            interner.get_or_intern("count"),
            SignalKind::Reg,
            8,
            0,
            &interner,
            &sink,
        );
        assert_eq!(d.signals[s].value.width(), 8);
        assert!(d.signals[s].coverage);
        assert_eq!(d.modules[m].signals, vec![s]);
        assert!(!sink.has_errors());
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn oversized_signal_degrades_with_warning() {
        let (mut d, interner, sink) = setup();
        let m = d.add_module(interner.get_or_intern("wide"));
        let s = d.add_signal(
            m,
            interner.get_or_intern("bus"),
            SignalKind::Wire,
            4096,
            0,
            &interner,
            &sink,
        );
        assert!(!d.signals[s].coverage);
        assert_eq!(d.signals[s].value.width(), 1);
        let diags = sink.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(format!("{}", diags[0].code), "W102");
        assert!(!sink.has_errors());
    }

    #[test]
    fn signal_by_name() {
        let (mut d, interner, sink) = setup();
        let m = d.add_module(interner.get_or_intern("m"));
        let clk = interner.get_or_intern("clk");
        let s = d.add_signal(m, clk, SignalKind::Wire, 1, 0, &interner, &sink);
        assert_eq!(d.signal_by_name(m, clk), Some(s));
        assert_eq!(d.signal_by_name(m, interner.get_or_intern("rst")), None);
    }

    #[test]
    fn instance_tree_resolution() {
        let (mut d, interner, _sink) = setup();
        let top_mod = d.add_module(interner.get_or_intern("top"));
        let sub_mod = d.add_module(interner.get_or_intern("sub"));
        let top_name = interner.get_or_intern("top");
        let u0 = interner.get_or_intern("u0");
        let u1 = interner.get_or_intern("u1");
        let root = d.add_instance(top_name, top_mod, None);
        let child0 = d.add_instance(u0, sub_mod, Some(root));
        let child1 = d.add_instance(u1, sub_mod, Some(root));

        assert_eq!(d.resolve_scope(&[top_name]), Some(root));
        assert_eq!(d.resolve_scope(&[top_name, u0]), Some(child0));
        assert_eq!(d.resolve_scope(&[top_name, u1]), Some(child1));
        assert_eq!(d.resolve_scope(&[u0]), None);
        assert_eq!(
            d.resolve_scope(&[top_name, interner.get_or_intern("nope")]),
            None
        );
    }

    #[test]
    fn shared_module_between_instances() {
        let (mut d, interner, _sink) = setup();
        let top_mod = d.add_module(interner.get_or_intern("top"));
        let sub_mod = d.add_module(interner.get_or_intern("sub"));
        let root = d.add_instance(interner.get_or_intern("top"), top_mod, None);
        let a = d.add_instance(interner.get_or_intern("a"), sub_mod, Some(root));
        let b = d.add_instance(interner.get_or_intern("b"), sub_mod, Some(root));
        assert_eq!(d.instances[a].module, d.instances[b].module);
    }

    #[test]
    fn expression_tree_wiring() {
        let (mut d, _interner, _sink) = setup();
        let leaf = d.add_leaf(ExprOp::Signal);
        let inv = d.add_unary(ExprOp::Unot, leaf);
        assert_eq!(d.exprs[leaf].parent, Some(inv));
        assert!(d.exprs[inv].is_root());
    }

    #[test]
    #[should_panic(expected = "already has a parent")]
    fn double_parent_rejected() {
        let (mut d, _interner, _sink) = setup();
        let leaf = d.add_leaf(ExprOp::Signal);
        let _ = d.add_unary(ExprOp::Unot, leaf);
        let _ = d.add_unary(ExprOp::Uinv, leaf);
    }

    #[test]
    fn statement_registration() {
        let (mut d, interner, _sink) = setup();
        let m = d.add_module(interner.get_or_intern("m"));
        let leaf = d.add_leaf(ExprOp::Signal);
        let stmt = d.add_statement(m, leaf);
        assert_eq!(d.modules[m].statements, vec![stmt]);
        assert_eq!(d.statements[stmt].root, leaf);
    }

    #[test]
    fn resize_signal_rewrites_bit_select_lsb() {
        let (mut d, interner, sink) = setup();
        let m = d.add_module(interner.get_or_intern("m"));
        let s = d.add_signal(
            m,
            interner.get_or_intern("bus"),
            SignalKind::Wire,
            4,
            0,
            &interner,
            &sink,
        );
        let index = d.add_const(CovVec::from_u64(2, 4));
        let sel = d.add_unary(ExprOp::SbitSel, index);
        d.exprs[sel].signal = Some(s);
        d.signals[s].add_reader(sel);

        d.resize_signal(s, 8, 4);
        assert_eq!(d.signals[s].value.width(), 8);
        assert_eq!(d.signals[s].value.lsb(), 4);
        assert_eq!(d.exprs[sel].state.sig_lsb, 4);
    }

    #[test]
    fn resize_signal_follows_externally_sized_readers() {
        let (mut d, interner, sink) = setup();
        let m = d.add_module(interner.get_or_intern("m"));
        let s = d.add_signal(
            m,
            interner.get_or_intern("bus"),
            SignalKind::Wire,
            4,
            0,
            &interner,
            &sink,
        );
        let leaf = d.add_leaf(ExprOp::Signal);
        d.exprs[leaf].signal = Some(s);
        d.exprs[leaf].state.set_sized_externally(true);
        d.signals[s].add_reader(leaf);

        d.resize_signal(s, 16, 0);
        assert_eq!(d.exprs[leaf].value.width(), 16);
    }

    #[test]
    fn unlink_statement_severs_reader_links() {
        let (mut d, interner, sink) = setup();
        let m = d.add_module(interner.get_or_intern("m"));
        let s = d.add_signal(
            m,
            interner.get_or_intern("a"),
            SignalKind::Wire,
            1,
            0,
            &interner,
            &sink,
        );
        let leaf = d.add_leaf(ExprOp::Signal);
        d.exprs[leaf].signal = Some(s);
        d.signals[s].add_reader(leaf);
        let inv = d.add_unary(ExprOp::Unot, leaf);
        let stmt = d.add_statement(m, inv);

        let mut unlinked = Vec::new();
        d.unlink_statement(stmt, |e| unlinked.push(e));

        assert!(d.signals[s].readers.is_empty());
        assert!(d.exprs[leaf].signal.is_none());
        assert!(d.modules[m].statements.is_empty());
        assert!(unlinked.contains(&leaf));
        assert!(unlinked.contains(&inv));
        d.verify_consistency().unwrap();
    }

    #[test]
    fn verify_consistency_detects_missing_backref() {
        let (mut d, interner, sink) = setup();
        let m = d.add_module(interner.get_or_intern("m"));
        let s = d.add_signal(
            m,
            interner.get_or_intern("a"),
            SignalKind::Wire,
            1,
            0,
            &interner,
            &sink,
        );
        let leaf = d.add_leaf(ExprOp::Signal);
        // Reader registered without the matching back-reference
        d.signals[s].add_reader(leaf);
        assert!(matches!(
            d.verify_consistency(),
            Err(DbError::ReaderWithoutBackref { .. })
        ));
    }

    #[test]
    fn verify_consistency_detects_missing_reader() {
        let (mut d, interner, sink) = setup();
        let m = d.add_module(interner.get_or_intern("m"));
        let s = d.add_signal(
            m,
            interner.get_or_intern("a"),
            SignalKind::Wire,
            1,
            0,
            &interner,
            &sink,
        );
        let leaf = d.add_leaf(ExprOp::Signal);
        // Back-reference set without the matching reader entry
        d.exprs[leaf].signal = Some(s);
        assert!(matches!(
            d.verify_consistency(),
            Err(DbError::BackrefWithoutReader { .. })
        ));
    }

    #[test]
    fn consistent_design_passes() {
        let (mut d, interner, sink) = setup();
        let m = d.add_module(interner.get_or_intern("m"));
        let s = d.add_signal(
            m,
            interner.get_or_intern("a"),
            SignalKind::Wire,
            1,
            0,
            &interner,
            &sink,
        );
        let leaf = d.add_leaf(ExprOp::Signal);
        d.exprs[leaf].signal = Some(s);
        d.signals[s].add_reader(leaf);
        d.verify_consistency().unwrap();
    }
}
