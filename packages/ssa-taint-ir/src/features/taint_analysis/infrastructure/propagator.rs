//! §4.C6 depth-first taint propagator: a complementary, flow-sensitive walk
//! run independently of the EAR union-find (§4.C1-C5), used to reject
//! propagations the EAR's flow-insensitive alias view cannot.
//!
//! Grounded on the teacher's `taint_analysis/infrastructure/ifds_taint_service.rs`
//! single-root depth-first worklist, adapted from its IFDS-style summary
//! edges to the per-variant neighbor policy this crate's table calls for.

use rustc_hash::{FxHashMap, FxHashSet};

use super::referrer_index::ReferrerIndex;
use crate::features::points_to::ports::SourceFieldPredicate;
use crate::features::taint_analysis::domain::{Sanitizer, TaintSummary};
use crate::features::taint_analysis::ports::SinkCallPredicate;
use crate::ssa::dominance::block_reachable;
use crate::ssa::{
    BasicBlock, BlockId, CallKind, Callee, DominatorTree, Function, FunctionId, Instruction,
    InstrId, InstrSite, Program, Type, ValueId,
};

/// Owns the per-function [`DominatorTree`] cache so repeated `taint()` calls
/// against the same function don't rebuild it.
pub struct Propagator<'a> {
    program: &'a Program,
    referrers: &'a ReferrerIndex,
    dominators: FxHashMap<FunctionId, DominatorTree>,
}

impl<'a> Propagator<'a> {
    pub fn new(program: &'a Program, referrers: &'a ReferrerIndex) -> Self {
        Propagator { program, referrers, dominators: FxHashMap::default() }
    }

    /// §4.C6 `taint(root)`. `func` must be the function owning `root`;
    /// the walk never crosses function boundaries (dominance and block
    /// reachability are only meaningful within one CFG).
    pub fn taint<P: SinkCallPredicate + SourceFieldPredicate>(
        &mut self,
        predicates: &P,
        func: &'a Function,
        root: ValueId,
    ) -> TaintSummary {
        let dom = self.dominators.entry(func.id).or_insert_with(|| DominatorTree::build(func));
        let mut instr_locations = FxHashMap::default();
        for block in &func.blocks {
            for (i, site) in block.instructions.iter().enumerate() {
                instr_locations.insert(site.id, (block.id, i));
            }
        }
        let mut walk = Walk {
            program: self.program,
            referrers: self.referrers,
            func,
            dom,
            predicates,
            root,
            instr_locations,
            processed_instrs: FxHashSet::default(),
            max_instr_reached: FxHashMap::default(),
            last_block_visited: None,
            summary: TaintSummary::default(),
        };
        walk.visit(root);
        walk.summary
    }
}

struct Walk<'a, 'p, P> {
    program: &'a Program,
    referrers: &'a ReferrerIndex,
    func: &'a Function,
    dom: &'a DominatorTree,
    predicates: &'p P,
    /// The value the whole walk was seeded from (§4.C6 Call row: "skip
    /// entirely if callee is a method whose receiver is [this]").
    root: ValueId,
    instr_locations: FxHashMap<InstrId, (BlockId, usize)>,
    /// Visited non-value-producing instructions (`Store`, `MapUpdate`,
    /// `Send`, `Go`, ...); kept separate from `summary.tainted` because
    /// those instructions never define a `ValueId`.
    processed_instrs: FxHashSet<InstrId>,
    max_instr_reached: FxHashMap<BlockId, usize>,
    last_block_visited: Option<BlockId>,
    summary: TaintSummary,
}

impl<'a, 'p, P: SinkCallPredicate + SourceFieldPredicate> Walk<'a, 'p, P> {
    /// Visits a value node: flow-sensitive pruning, then dispatch on what
    /// produced it (leaf `ValueKind` or a specific `Instruction` variant).
    fn visit(&mut self, v: ValueId) {
        if self.summary.tainted.contains(&v) {
            return;
        }
        let Some(val) = self.program.value(v) else { return };
        if !val.ty.is_taintable() {
            return;
        }

        let defining = self.program.defining_instr(v);
        if let Some((block, _)) = defining {
            if !self.flow_reachable(block.id) {
                return;
            }
        }

        self.summary.tainted.insert(v);
        self.summary.pre_order.push(v);

        match defining {
            Some((block, site)) => {
                self.mark_instr_progress(block.id, site.id);
                self.dispatch_producing(block, site, v);
            }
            None => self.dispatch_leaf(v),
        }
    }

    /// Leaf `ValueKind`s: `Const`/`FreeVar`/`Global`/`Parameter` propagate
    /// to their referrers; `Function`/`Builtin` are dead ends (§4.C6 table).
    fn dispatch_leaf(&mut self, v: ValueId) {
        use crate::ssa::ValueKind::*;
        let Some(val) = self.program.value(v) else { return };
        match &val.kind {
            Const | Global | Parameter | FreeVar => self.visit_referrers(v),
            Function(_) | Builtin(_) => {}
            Instruction(_) => unreachable!("dispatch_leaf only called for values with no defining instruction"),
        }
    }

    /// Producing instructions: the per-variant neighbor policy.
    fn dispatch_producing(&mut self, block: &'a BasicBlock, site: &'a InstrSite, v: ValueId) {
        use Instruction::*;
        match &site.kind {
            Alloc { is_array, .. } => {
                if *is_array {
                    self.visit_referrers(v);
                }
            }
            Call { kind: CallKind::Call, callee, args, .. } => {
                if self.call_receiver_is_source(args) {
                    return;
                }
                self.visit_referrers(v);
                self.visit_taintable_call_args(block.id, site.id, callee, args);
            }
            Call { kind: CallKind::Go, .. } => {
                for a in site.kind.operands() {
                    self.visit(a);
                }
            }
            Call { kind: CallKind::Defer, .. } => {}
            FieldAddr { x, field, .. } => {
                if self.is_source_field_access(*x, field) {
                    self.visit_referrers(v);
                }
                self.visit(*x);
            }
            IndexAddr { x, .. } | Index { x, .. } => {
                self.visit_referrers(v);
                self.visit(*x);
            }
            Field { x, .. } => {
                self.visit_referrers(v);
                self.visit(*x);
            }
            MakeInterface { operand, .. } | UnOp { operand, .. } | TypeAssert { operand, .. } => {
                self.visit_referrers(v);
                self.visit(*operand);
            }
            Select { states, .. } => {
                self.visit_referrers(v);
                for s in states.iter() {
                    self.visit(s.channel);
                    if let Some(sv) = s.send_value {
                        self.visit(sv);
                    }
                }
            }
            Slice { x, low, high, max, .. } => {
                self.visit_referrers(v);
                self.visit(*x);
                for opt in [low, high, max] {
                    if let Some(o) = opt {
                        self.visit(*o);
                    }
                }
            }
            BinOp { .. }
            | ChangeInterface { .. }
            | ChangeType { .. }
            | Convert { .. }
            | Extract { .. }
            | MakeChan { .. }
            | MakeMap { .. }
            | MakeSlice { .. }
            | Phi { .. }
            | Range { .. }
            | Lookup { .. } => {
                self.visit_referrers(v);
            }
            // Builtin/MakeClosure/Next: visited (tainted) but a dead end.
            _ => {}
        }
    }

    /// Follows every referrer of `v` within the walk's own function,
    /// applying the "backward in time through a prior call" rule before
    /// descending into each one.
    fn visit_referrers(&mut self, v: ValueId) {
        let refs: Vec<(FunctionId, InstrId)> = self.referrers.referrers_of(v).to_vec();
        for (owner, instr_id) in refs {
            if owner != self.func.id {
                continue;
            }
            let Some(&(block_id, _)) = self.instr_locations.get(&instr_id) else { continue };
            let Some(block) = self.func.block(block_id) else { continue };
            let Some(site) = block.instructions.iter().find(|s| s.id == instr_id) else { continue };
            if self.is_stale_call_referrer(block_id, instr_id, site) {
                continue;
            }
            self.visit_instr_as_referrer(block, site);
        }
    }

    /// §4.C6: "a `Call` instruction visited as a referrer whose index in
    /// its block is strictly less than `max_instr_reached[block]`" is
    /// skipped. Only `Call` (kind `Call`) is subject to this rule.
    fn is_stale_call_referrer(&self, block: BlockId, instr: InstrId, site: &InstrSite) -> bool {
        if !matches!(&site.kind, Instruction::Call { kind: CallKind::Call, .. }) {
            return false;
        }
        let Some(&(_, idx)) = self.instr_locations.get(&instr) else { return false };
        self.max_instr_reached.get(&block).is_some_and(|&max| idx < max)
    }

    /// Entry point for a referrer instruction: applies block reachability,
    /// then either delegates to `visit` (producing instructions share the
    /// same dispatch as every other value node) or handles the fixed set
    /// of non-producing instructions the table calls out.
    fn visit_instr_as_referrer(&mut self, block: &'a BasicBlock, site: &'a InstrSite) {
        if !self.flow_reachable(block.id) {
            return;
        }
        if let Some(result) = site.kind.result() {
            self.visit(result);
            return;
        }
        if !self.processed_instrs.insert(site.id) {
            return;
        }
        self.mark_instr_progress(block.id, site.id);
        match &site.kind {
            Instruction::Store { addr, .. } => self.visit(*addr),
            Instruction::MapUpdate { map, .. } => self.visit(*map),
            Instruction::Send { channel, .. } => self.visit(*channel),
            Instruction::Call { kind: CallKind::Call, callee, args, .. } => {
                if self.call_receiver_is_source(args) {
                    return;
                }
                self.visit_taintable_call_args(block.id, site.id, callee, args);
            }
            Instruction::Call { kind: CallKind::Go, .. } => {
                for a in site.kind.operands() {
                    self.visit(a);
                }
            }
            // MapUpdate/Defer/Builtin(void)/DebugRef/If/Jump/Panic/Return/RunDefers: no-op.
            _ => {}
        }
    }

    /// Default rule: DFS every argument whose type can be tainted by a
    /// call. Refined when the callee matches a known
    /// [`library_summaries`] entry (§4.C6 "External library summaries"),
    /// in which case only the summary's own argument bits are followed.
    fn visit_taintable_call_args(&mut self, block: BlockId, instr: InstrId, callee: &Callee, args: &[ValueId]) {
        if let Some(summary) = self.library_summary_for(callee) {
            for (i, &a) in args.iter().enumerate() {
                let bit = 1u64 << i;
                let propagates = summary.tainted_args & bit != 0 || (summary.tainted_rets && summary.if_tainted_bitmask & bit != 0);
                if propagates {
                    self.record_sanitizer_and_visit(block, instr, callee, a);
                }
            }
            return;
        }
        for &a in args.iter() {
            if self.value_type(a).can_be_tainted_by_call() {
                self.record_sanitizer_and_visit(block, instr, callee, a);
            }
        }
    }

    fn record_sanitizer_and_visit(&mut self, block: BlockId, instr: InstrId, callee: &Callee, a: ValueId) {
        if self.is_sanitizer_call(callee) {
            self.summary.sanitizers.push(Sanitizer::new(instr, block, a));
        }
        self.visit(a);
    }

    fn library_summary_for(&self, callee: &Callee) -> Option<&'static library_summaries::LibrarySummary> {
        match callee {
            Callee::External(name) => library_summaries::lookup(name),
            Callee::Static(id) => self.program.function(*id).and_then(|f| library_summaries::lookup(&f.name)),
            Callee::Dynamic(_) | Callee::Builtin(_) => None,
        }
    }

    /// §4.C6: "skip entirely if callee is a method whose receiver is a
    /// source" — modeled as "the call's first argument (the receiver, by
    /// the IR's lowering convention) is the walk's own root".
    fn call_receiver_is_source(&self, args: &[ValueId]) -> bool {
        args.first().is_some_and(|&a| a == self.root)
    }

    fn is_sanitizer_call(&self, callee: &Callee) -> bool {
        let name = match callee {
            Callee::Static(id) => self.program.function(*id).map(|f| f.name.clone()),
            Callee::External(name) => Some(name.clone()),
            Callee::Dynamic(_) | Callee::Builtin(_) => None,
        };
        let Some(name) = name else { return false };
        let (package, receiver, method) = crate::ssa::split_call_name(&name);
        self.predicates.is_sanitizer(&package, &receiver, &method)
    }

    fn is_source_field_access(&self, x: ValueId, field: &str) -> bool {
        let (package, ty_name) = crate::ssa::struct_parts(self.value_type(x));
        self.predicates.is_source_field(&package, &ty_name, field)
    }

    fn value_type(&self, v: ValueId) -> &'a Type {
        &self.program.value(v).expect("every ValueId in the program has a Value entry").ty
    }

    /// Fast path `Dominates`, falling back to DAG reachability over
    /// successor edges (§4.C6).
    fn flow_reachable(&self, block: BlockId) -> bool {
        match self.last_block_visited {
            None => true,
            Some(last) => last == block || self.dom.dominates_block(last, block) || block_reachable(self.func, last, block),
        }
    }

    fn mark_instr_progress(&mut self, block: BlockId, instr: InstrId) {
        let idx = self.instr_locations.get(&instr).map(|&(_, i)| i).unwrap_or(0);
        let entry = self.max_instr_reached.entry(block).or_insert(0);
        if idx > *entry {
            *entry = idx;
        }
        self.last_block_visited = Some(block);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use super::*;
    use crate::ssa::{BasicKind, Value, ValueKind};

    struct NoPredicates;

    impl SinkCallPredicate for NoPredicates {
        fn is_sink_fn(&self, _: &str, _: &str, _: &str) -> bool {
            false
        }
        fn is_sanitizer(&self, _: &str, _: &str, _: &str) -> bool {
            false
        }
        fn is_excluded(&self, _: &str, _: &str, _: &str) -> bool {
            false
        }
    }

    impl SourceFieldPredicate for NoPredicates {
        fn is_source_field(&self, _: &str, _: &str, _: &str) -> bool {
            false
        }
    }

    fn string_value(id: u32, func: FunctionId, kind: ValueKind) -> (ValueId, Value) {
        (ValueId(id), Value { id: ValueId(id), function: func, ty: Type::Basic(BasicKind::String), position: None, kind })
    }

    /// `p := param; x := UnOp(Deref, p); y := BinOp(Add, x, x)` — a single
    /// straight-line block, taint starting at `p` should reach `x` and `y`.
    fn straight_line_program() -> (Program, FunctionId, ValueId) {
        let func_id = FunctionId(0);
        let mut values = HashMap::new();
        let (p_id, p) = string_value(0, func_id, ValueKind::Parameter);
        values.insert(p_id, p);
        let (x_id, x) = string_value(1, func_id, ValueKind::Instruction(InstrId(0)));
        values.insert(x_id, x);
        let (y_id, y) = string_value(2, func_id, ValueKind::Instruction(InstrId(1)));
        values.insert(y_id, y);

        let block = BasicBlock {
            id: BlockId(0),
            function: func_id,
            instructions: vec![
                InstrSite { id: InstrId(0), position: None, kind: Instruction::UnOp { result: x_id, op: crate::ssa::UnaryOp::Deref, operand: p_id } },
                InstrSite { id: InstrId(1), position: None, kind: Instruction::BinOp { result: y_id, op: crate::ssa::BinaryOp::Add, x: x_id, y: x_id } },
            ],
            preds: vec![],
            succs: vec![],
        };
        let func = Function { id: func_id, name: Arc::from("straight_line"), params: vec![p_id], free_vars: vec![], blocks: vec![block], is_variadic: false, has_body: true };
        let program = Program { functions: vec![func], values };
        (program, func_id, p_id)
    }

    #[test]
    fn taint_flows_through_unop_and_binop_referrers() {
        let (program, func_id, root) = straight_line_program();
        let referrers = ReferrerIndex::build(&program);
        let func = program.function(func_id).unwrap();
        let mut propagator = Propagator::new(&program, &referrers);
        let summary = propagator.taint(&NoPredicates, func, root);

        assert!(summary.is_tainted(ValueId(1)));
        assert!(summary.is_tainted(ValueId(2)));
        assert_eq!(summary.pre_order, vec![ValueId(0), ValueId(1), ValueId(2)]);
    }

    #[test]
    fn boolean_typed_value_is_never_tainted() {
        let func_id = FunctionId(0);
        let mut values = HashMap::new();
        let p_id = ValueId(0);
        values.insert(p_id, Value { id: p_id, function: func_id, ty: Type::Basic(BasicKind::Bool), position: None, kind: ValueKind::Parameter });
        let func = Function { id: func_id, name: Arc::from("f"), params: vec![p_id], free_vars: vec![], blocks: vec![], is_variadic: false, has_body: true };
        let program = Program { functions: vec![func], values };
        let referrers = ReferrerIndex::build(&program);
        let func = program.function(func_id).unwrap();
        let mut propagator = Propagator::new(&program, &referrers);
        let summary = propagator.taint(&NoPredicates, func, p_id);
        assert!(summary.tainted.is_empty());
    }
}
