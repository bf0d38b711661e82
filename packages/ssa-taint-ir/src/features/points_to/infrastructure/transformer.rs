//! §4.C4 EAR transformer: walks the SSA program and emits unification
//! constraints into a [`HeapState`].
//!
//! Grounded on `points_to/infrastructure/steensgaard_solver.rs`'s
//! unification-based (not inclusion-based) solving style, and on the
//! exhaustive-`match`-over-statement idiom used throughout
//! `other_examples/...circomspect...taint_analysis.rs`.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{trace, warn};

use crate::config::AnalysisConfig;
use crate::features::points_to::domain::heap::HeapState;
use crate::features::points_to::domain::reference::{Context, Field, Reference, ReferenceFactory, SyntheticKind};
use crate::features::taint_analysis::infrastructure::library_summaries;
use crate::ssa::{
    BasicBlock, Callee, Function, FunctionId, IndexOperand, InstrId, Instruction, Program,
    TupleProducer, Type, UnaryOp, Value, ValueId, ValueKind,
};
use crate::ssa::callgraph::CallGraph;

pub struct Transformer<'a> {
    program: &'a Program,
    call_graph: &'a dyn CallGraph,
    k: u32,
    factory: ReferenceFactory,
    heap: HeapState,
    contexts_cache: FxHashMap<(FunctionId, u32), Vec<Context>>,
}

impl<'a> Transformer<'a> {
    pub fn new(program: &'a Program, call_graph: &'a dyn CallGraph, config: &AnalysisConfig) -> Self {
        Transformer {
            program,
            call_graph,
            k: config.context_k,
            factory: ReferenceFactory::new(),
            heap: HeapState::new(),
            contexts_cache: FxHashMap::default(),
        }
    }

    pub fn run(mut self) -> HeapState {
        self.prepopulate();
        for func in &self.program.functions {
            if !func.has_body {
                continue;
            }
            let contexts = self.contexts_for(func.id, self.k);
            for ctx in contexts {
                for block in &func.blocks {
                    for site in &block.instructions {
                        self.visit_instruction(func, block, &ctx, site.id, &site.kind);
                    }
                }
            }
        }
        self.heap
    }

    /// §4.C4 "Contexts": computed bottom-up, memoized on `(function, depth
    /// remaining)`. Recursion terminates because `depth` strictly
    /// decreases, independent of call-graph cycles.
    fn contexts_for(&mut self, f: FunctionId, depth: u32) -> Vec<Context> {
        if let Some(cached) = self.contexts_cache.get(&(f, depth)) {
            return cached.clone();
        }
        let result = if depth == 0 {
            vec![Context::empty()]
        } else {
            let incoming = self.call_graph.callers(f);
            if incoming.is_empty() {
                vec![Context::empty()]
            } else {
                let mut set: FxHashSet<Context> = FxHashSet::default();
                for edge in incoming {
                    for caller_ctx in self.contexts_for(edge.caller, depth - 1) {
                        set.insert(caller_ctx.extended(edge.site));
                    }
                }
                set.into_iter().collect()
            }
        };
        self.contexts_cache.insert((f, depth), result.clone());
        result
    }

    fn value(&self, id: ValueId) -> &Value {
        self.program.value(id).expect("every ValueId in the program has a Value entry")
    }

    fn reference_of(&self, ctx: &Context, id: ValueId) -> Reference {
        let v = self.value(id);
        match v.kind {
            ValueKind::Global => Reference::Global { value: id },
            _ => Reference::Local { context: ctx.clone(), value: id },
        }
    }

    fn prepopulate(&mut self) {
        for v in self.program.values.values() {
            if matches!(v.kind, ValueKind::Global) && v.ty.may_share_object() {
                let r = Reference::Global { value: v.id };
                self.heap.insert(&r);
            }
        }
        for func in &self.program.functions {
            let contexts = self.contexts_for(func.id, self.k);
            for ctx in &contexts {
                for &p in &func.params {
                    if self.value(p).ty.may_share_object() {
                        self.heap.insert(&self.reference_of(ctx, p));
                    }
                }
                for &fv in &func.free_vars {
                    if self.value(fv).ty.may_share_object() {
                        self.heap.insert(&self.reference_of(ctx, fv));
                    }
                }
                for block in &func.blocks {
                    for site in &block.instructions {
                        let Some(result) = site.kind.result() else { continue };
                        let ty = &self.value(result).ty;
                        let is_multi_return_tuple =
                            matches!(&site.kind, Instruction::Call { .. }) && matches!(ty, Type::Tuple(elems) if elems.len() > 1);
                        if ty.may_share_object() || is_multi_return_tuple {
                            self.heap.insert(&self.reference_of(ctx, result));
                        }
                    }
                }
            }
        }
    }

    /// Finds or creates the reference `owner[->]` points to, materializing
    /// a `ValueOf` synthetic only if `owner` has no pointee yet — this lets
    /// a `Store` and a later `FieldAddr` on the same pointer converge onto
    /// one pointee rather than two unrelated synthetics.
    fn get_or_install_pointee(&mut self, owner: &Reference) -> Reference {
        self.get_or_install(owner, Field::points_to(), SyntheticKind::ValueOf)
    }

    fn get_or_install(&mut self, owner: &Reference, field: Field, kind: SyntheticKind) -> Reference {
        let rep = self.heap.representative(owner);
        if let Ok(fields) = self.heap.field_map(&rep) {
            if let Some(existing) = fields.get(&field) {
                return existing.clone();
            }
        }
        let synth = self.factory.make_synthetic(kind, rep.clone());
        self.heap.insert(&synth);
        let rep = self.heap.representative(owner);
        if let Ok(fields) = self.heap.field_map_mut(&rep) {
            fields.insert(field, synth.clone());
        }
        synth
    }

    /// §4.C2 `unify_reps`-driving helper: unify `val` into `owner`'s field
    /// `field`, installing it if the field is unset.
    fn field_install_or_unify(&mut self, owner: &Reference, field: Field, val: &Reference) {
        let rep = self.heap.representative(owner);
        let existing = self.heap.field_map(&rep).ok().and_then(|m| m.get(&field).cloned());
        match existing {
            Some(existing) => self.heap.unify(val, &existing),
            None => {
                let rep = self.heap.representative(owner);
                if let Ok(fields) = self.heap.field_map_mut(&rep) {
                    fields.insert(field, val.clone());
                }
            }
        }
    }

    /// §4.C4 "`unify_by_value(a, b)`": field-wise copy, never unifying `a`
    /// and `b` themselves (§8 boundary test: "`copy(dst, src)` does not
    /// unify `dst` with `src`"). Fields present on only one side are
    /// installed on the other; common fields unify their values directly.
    fn unify_by_value(&mut self, a: &Reference, b: &Reference) {
        let rep_a = self.heap.representative(a);
        let rep_b = self.heap.representative(b);
        if rep_a == rep_b {
            return;
        }
        let fields_a: Vec<(Field, Reference)> = self
            .heap
            .field_map(&rep_a)
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        let fields_b: Vec<(Field, Reference)> = self
            .heap
            .field_map(&rep_b)
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        let map_b: FxHashMap<Field, Reference> = fields_b.into_iter().collect();
        let mut seen_b: FxHashSet<Field> = FxHashSet::default();
        let mut to_unify = Vec::new();

        for (f, va) in &fields_a {
            match map_b.get(f) {
                Some(vb) => {
                    seen_b.insert(f.clone());
                    to_unify.push((va.clone(), vb.clone()));
                }
                None => {
                    let rep_b_now = self.heap.representative(&rep_b);
                    if let Ok(fields) = self.heap.field_map_mut(&rep_b_now) {
                        fields.insert(f.clone(), va.clone());
                    }
                }
            }
        }
        for (f, vb) in map_b {
            if !seen_b.contains(&f) {
                let rep_a_now = self.heap.representative(&rep_a);
                if let Ok(fields) = self.heap.field_map_mut(&rep_a_now) {
                    fields.insert(f, vb);
                }
            }
        }
        for (va, vb) in to_unify {
            self.heap.unify(&va, &vb);
        }
    }

    fn unify_respecting_type(&mut self, a: &Reference, b: &Reference, ty: &Type) {
        if !ty.may_share_object() {
            return;
        }
        if ty.is_unify_by_reference() {
            self.heap.unify(a, b);
        } else {
            self.unify_by_value(a, b);
        }
    }

    fn visit_instruction(&mut self, func: &Function, block: &BasicBlock, ctx: &Context, site_id: InstrId, instr: &Instruction) {
        trace!(function = %func.name, block = block.id.0, instr = ?instr, "C4 visiting instruction");
        match instr {
            Instruction::FieldAddr { result, x, field } => {
                let rx = self.reference_of(ctx, *x);
                let pointee = self.get_or_install_pointee(&rx);
                let t = self.reference_of(ctx, *result);
                self.heap.insert(&t);
                self.field_install_or_unify(&pointee, Field::named(field), &t);
            }
            Instruction::Field { result, x, field } => {
                let rx = self.reference_of(ctx, *x);
                let t = self.reference_of(ctx, *result);
                self.heap.insert(&t);
                self.field_install_or_unify(&rx, Field::named(field), &t);
            }
            Instruction::IndexAddr { result, x, index } => {
                let rx = self.reference_of(ctx, *x);
                let pointee = self.get_or_install_pointee(&rx);
                let t = self.reference_of(ctx, *result);
                self.heap.insert(&t);
                if let IndexOperand::Const(name) = index {
                    self.field_install_or_unify(&pointee, Field::named(name), &t);
                }
                self.field_install_or_unify(&pointee, Field::any_field(), &t);
            }
            Instruction::Index { result, x, index } => {
                let rx = self.reference_of(ctx, *x);
                let t = self.reference_of(ctx, *result);
                self.heap.insert(&t);
                if let IndexOperand::Const(name) = index {
                    self.field_install_or_unify(&rx, Field::named(name), &t);
                }
                self.field_install_or_unify(&rx, Field::any_field(), &t);
            }
            Instruction::Lookup { result, map, comma_ok, .. } => {
                if *comma_ok {
                    return; // handled at the consuming Extract
                }
                let rmap = self.reference_of(ctx, *map);
                let t = self.reference_of(ctx, *result);
                self.heap.insert(&t);
                self.field_install_or_unify(&rmap, Field::any_field(), &t);
            }
            Instruction::Store { addr, value } => {
                if !self.value(*value).ty.may_share_object() {
                    return;
                }
                let ra = self.reference_of(ctx, *addr);
                let rv = self.reference_of(ctx, *value);
                self.heap.insert(&rv);
                self.field_install_or_unify(&ra, Field::points_to(), &rv);
            }
            Instruction::Phi { result, incoming } => {
                let ty = self.value(*result).ty.clone();
                let t = self.reference_of(ctx, *result);
                self.heap.insert(&t);
                for v in incoming.iter() {
                    let rv = self.reference_of(ctx, *v);
                    self.heap.insert(&rv);
                    self.unify_respecting_type(&t, &rv, &ty);
                }
            }
            Instruction::MapUpdate { map, value, .. } => {
                if !self.value(*value).ty.may_share_object() {
                    return;
                }
                let rmap = self.reference_of(ctx, *map);
                let rv = self.reference_of(ctx, *value);
                self.heap.insert(&rv);
                self.field_install_or_unify(&rmap, Field::any_field(), &rv);
            }
            Instruction::Convert { result, operand }
            | Instruction::ChangeType { result, operand }
            | Instruction::ChangeInterface { result, operand }
            | Instruction::MakeInterface { result, operand }
            | Instruction::Slice { result, x: operand, .. } => {
                let ty = self.value(*result).ty.clone();
                let t = self.reference_of(ctx, *result);
                let ro = self.reference_of(ctx, *operand);
                self.heap.insert(&t);
                self.heap.insert(&ro);
                self.unify_respecting_type(&t, &ro, &ty);
            }
            Instruction::TypeAssert { result, operand, comma_ok } => {
                if *comma_ok {
                    return; // handled at the consuming Extract
                }
                let ty = self.value(*result).ty.clone();
                let t = self.reference_of(ctx, *result);
                let ro = self.reference_of(ctx, *operand);
                self.heap.insert(&t);
                self.heap.insert(&ro);
                self.unify_respecting_type(&t, &ro, &ty);
            }
            Instruction::UnOp { result, op: UnaryOp::Deref, operand } => {
                let t = self.reference_of(ctx, *result);
                let ra = self.reference_of(ctx, *operand);
                self.heap.insert(&t);
                self.field_install_or_unify(&ra, Field::points_to(), &t);
            }
            Instruction::UnOp { result, op: UnaryOp::Recv, operand } => {
                let t = self.reference_of(ctx, *result);
                let rch = self.reference_of(ctx, *operand);
                self.heap.insert(&t);
                self.field_install_or_unify(&rch, Field::any_field(), &t);
            }
            Instruction::UnOp { .. } => {} // Neg/Not/Xor: numeric, no-op
            Instruction::Send { channel, value } => {
                if !self.value(*value).ty.may_share_object() {
                    return;
                }
                let rch = self.reference_of(ctx, *channel);
                let rv = self.reference_of(ctx, *value);
                self.heap.insert(&rv);
                self.field_install_or_unify(&rch, Field::any_field(), &rv);
            }
            Instruction::Select { states, .. } => {
                for state in states.iter() {
                    let rch = self.reference_of(ctx, state.channel);
                    match state.send_value {
                        Some(v) if self.value(v).ty.may_share_object() => {
                            let rv = self.reference_of(ctx, v);
                            self.heap.insert(&rv);
                            self.field_install_or_unify(&rch, Field::any_field(), &rv);
                        }
                        Some(_) => {}
                        None => {
                            // Receive state: establish (but do not yet bind
                            // to a concrete value) the channel's element
                            // slot so a later Extract converges onto it.
                            self.get_or_install(&rch, Field::any_field(), SyntheticKind::Field);
                        }
                    }
                }
            }
            Instruction::BinOp { result, op, x, y } => {
                let vx = self.value(*x);
                let vy = self.value(*y);
                let is_string_concat = matches!(op, crate::ssa::BinaryOp::Add)
                    && matches!(vx.ty, Type::Basic(crate::ssa::BasicKind::String))
                    && matches!(vy.ty, Type::Basic(crate::ssa::BasicKind::String));
                if !is_string_concat {
                    return; // other BinOps are numeric/boolean: no-op
                }
                let t = self.reference_of(ctx, *result);
                let rx = self.reference_of(ctx, *x);
                let ry = self.reference_of(ctx, *y);
                self.heap.insert(&t);
                self.heap.insert(&rx);
                self.heap.insert(&ry);
                self.field_install_or_unify(&t, Field::named("left"), &rx);
                self.field_install_or_unify(&t, Field::named("right"), &ry);
            }
            Instruction::Extract { result, tuple, index, producer } => {
                self.visit_extract(ctx, *result, *tuple, *index, *producer);
            }
            Instruction::MakeClosure { function, bindings, .. } => {
                let Some(target) = self.program.function(*function) else { return };
                let target_contexts = self.contexts_for(*function, self.k);
                for (binding, &fv) in bindings.iter().zip(target.free_vars.iter()) {
                    if !self.value(fv).ty.may_share_object() {
                        continue;
                    }
                    let rb = self.reference_of(ctx, *binding);
                    self.heap.insert(&rb);
                    for target_ctx in &target_contexts {
                        let rfv = self.reference_of(target_ctx, fv);
                        self.heap.insert(&rfv);
                        self.heap.unify(&rb, &rfv);
                    }
                }
            }
            Instruction::Builtin { result, name, args } => {
                self.visit_builtin(ctx, *result, name, args);
            }
            Instruction::Call { result, kind: _, callee, args, .. } => {
                self.visit_call(func, ctx, site_id, *result, callee, args);
            }
            Instruction::Alloc { .. }
            | Instruction::MakeChan { .. }
            | Instruction::MakeMap { .. }
            | Instruction::MakeSlice { .. }
            | Instruction::Range { .. }
            | Instruction::Next { .. }
            | Instruction::Return { .. }
            | Instruction::Panic { .. }
            | Instruction::If { .. }
            | Instruction::Jump
            | Instruction::RunDefers
            | Instruction::DebugRef { .. } => {}
            Instruction::Other => {
                warn!(function = %func.name, "C4: unknown SSA instruction variant, treated as no-op");
            }
        }
    }

    fn visit_extract(&mut self, ctx: &Context, result: ValueId, tuple: ValueId, index: u32, producer: TupleProducer) {
        let t = self.reference_of(ctx, result);
        if !self.value(result).ty.may_share_object() {
            return;
        }
        self.heap.insert(&t);
        let Some((_, origin)) = self.program.defining_instr(tuple) else {
            return;
        };
        match (producer, &origin.kind) {
            (TupleProducer::TypeAssertComma, Instruction::TypeAssert { operand, .. }) if index == 0 => {
                let ro = self.reference_of(ctx, *operand);
                self.heap.insert(&ro);
                self.heap.unify(&t, &ro);
            }
            (TupleProducer::MapRangeNext, Instruction::Next { iter, .. }) if index == 2 => {
                let riter = self.reference_of(ctx, *iter);
                self.field_install_or_unify(&riter, Field::any_field(), &t);
            }
            (TupleProducer::LookupComma, Instruction::Lookup { map, .. }) if index == 0 => {
                let rmap = self.reference_of(ctx, *map);
                self.field_install_or_unify(&rmap, Field::any_field(), &t);
            }
            (TupleProducer::RecvComma, Instruction::UnOp { operand, op: UnaryOp::Recv, .. }) if index == 0 => {
                let rch = self.reference_of(ctx, *operand);
                self.field_install_or_unify(&rch, Field::any_field(), &t);
            }
            (TupleProducer::Select, Instruction::Select { states, .. }) if index >= 2 => {
                // §9 open question: fewer receive states than `index - 2`
                // is silently skipped.
                if let Some(state) = states.get((index - 2) as usize) {
                    let rch = self.reference_of(ctx, state.channel);
                    self.field_install_or_unify(&rch, Field::any_field(), &t);
                }
            }
            _ => {
                // Default: treat the producer as an aggregate with
                // integer-named fields.
                let rtuple = self.reference_of(ctx, tuple);
                self.field_install_or_unify(&rtuple, Field::index(index as i64), &t);
            }
        }
    }

    fn visit_builtin(&mut self, ctx: &Context, result: Option<ValueId>, name: &str, args: &[ValueId]) {
        match name {
            "append" => {
                let Some(result) = result else { return };
                if !self.value(result).ty.may_share_object() {
                    return;
                }
                let t = self.reference_of(ctx, result);
                self.heap.insert(&t);
                for &a in args {
                    if !self.value(a).ty.may_share_object() {
                        continue;
                    }
                    let ra = self.reference_of(ctx, a);
                    self.heap.insert(&ra);
                    self.heap.unify(&t, &ra);
                }
            }
            "copy" => {
                if args.len() < 2 {
                    return;
                }
                let dst = self.reference_of(ctx, args[0]);
                let src = self.reference_of(ctx, args[1]);
                self.heap.insert(&dst);
                self.heap.insert(&src);
                self.unify_by_value(&dst, &src);
            }
            _ => {} // "delete" and anything else: no aliasing effect modeled
        }
    }

    fn visit_call(&mut self, caller: &Function, ctx: &Context, site_id: InstrId, result: Option<ValueId>, callee: &Callee, args: &[ValueId]) {
        match callee {
            Callee::External(qualified) => {
                self.visit_library_call(ctx, result, qualified, args);
                return;
            }
            Callee::Builtin(name) => {
                self.visit_builtin(ctx, result, name, args);
                return;
            }
            Callee::Static(target_id) => {
                self.visit_static_call(ctx, site_id, result, *target_id, args);
            }
            Callee::Dynamic(_) => {
                // The call graph supplies this exact site's candidate
                // statically-known targets; unify against each as a
                // conservative over-approximation of the dynamic dispatch.
                for edge in self.call_graph.callees(caller.id).into_iter().filter(|e| e.site == site_id) {
                    self.visit_static_call(ctx, site_id, result, edge.callee, args);
                }
            }
        }
    }

    fn visit_library_call(&mut self, ctx: &Context, result: Option<ValueId>, qualified: &str, args: &[ValueId]) {
        if library_summaries::matches_sprint_family(qualified) {
            let Some(result) = result else { return };
            let t = self.reference_of(ctx, result);
            self.heap.insert(&t);
            for (i, &a) in args.iter().enumerate() {
                if !self.value(a).ty.may_share_object() {
                    continue;
                }
                let ra = self.reference_of(ctx, a);
                self.heap.insert(&ra);
                self.field_install_or_unify(&t, Field::index(i as i64), &ra);
            }
            return;
        }
        if library_summaries::matches_fprint_family(qualified) {
            if args.is_empty() {
                return;
            }
            let writer = self.reference_of(ctx, args[0]);
            self.heap.insert(&writer);
            for (i, &a) in args.iter().enumerate().skip(1) {
                if !self.value(a).ty.may_share_object() {
                    continue;
                }
                let ra = self.reference_of(ctx, a);
                self.heap.insert(&ra);
                self.field_install_or_unify(&writer, Field::index((i - 1) as i64), &ra);
            }
            return;
        }
        if let Some(summary) = library_summaries::lookup(qualified) {
            let any_tainted = args
                .iter()
                .enumerate()
                .any(|(i, &a)| (summary.if_tainted_bitmask & (1 << i)) != 0 && self.value(a).ty.may_share_object());
            if !any_tainted {
                return;
            }
            if summary.tainted_rets {
                if let Some(result) = result {
                    if self.value(result).ty.may_share_object() {
                        let t = self.reference_of(ctx, result);
                        self.heap.insert(&t);
                        for (i, &a) in args.iter().enumerate() {
                            if (summary.if_tainted_bitmask & (1 << i)) != 0 {
                                let ra = self.reference_of(ctx, a);
                                self.heap.insert(&ra);
                                self.heap.unify(&t, &ra);
                            }
                        }
                    }
                }
            }
            for (i, &a) in args.iter().enumerate() {
                if (summary.tainted_args & (1 << i)) != 0 {
                    let ra = self.reference_of(ctx, a);
                    self.heap.insert(&ra);
                    for (j, &b) in args.iter().enumerate() {
                        if i != j && (summary.if_tainted_bitmask & (1 << j)) != 0 {
                            let rb = self.reference_of(ctx, b);
                            self.heap.insert(&rb);
                            self.heap.unify(&ra, &rb);
                        }
                    }
                }
            }
        }
    }

    fn visit_static_call(&mut self, ctx: &Context, site_id: InstrId, result: Option<ValueId>, callee_id: FunctionId, args: &[ValueId]) {
        let Some(callee) = self.program.function(callee_id) else { return };
        // §7/§4.C4 "Failure semantics": undefined functions or a
        // parameter-count mismatch are skipped silently.
        if !callee.has_body || callee.params.len() != args.len() {
            return;
        }

        let callee_ctx = ctx.extended(site_id);
        let callee_contexts = self.contexts_for(callee_id, self.k);
        let Some(matched) = callee_contexts.iter().find(|c| c.k_equal(&callee_ctx, self.k)) else {
            return;
        };

        for (&param, &arg) in callee.params.iter().zip(args.iter()) {
            let ty = self.value(param).ty.clone();
            if !ty.may_share_object() {
                continue;
            }
            let rparam = self.reference_of(matched, param);
            let rarg = self.reference_of(ctx, arg);
            self.heap.insert(&rparam);
            self.heap.insert(&rarg);
            self.unify_respecting_type(&rparam, &rarg, &ty);
        }

        let Some(result) = result else { return };
        if !self.value(result).ty.may_share_object() {
            return;
        }
        let rresult = self.reference_of(ctx, result);
        self.heap.insert(&rresult);

        for block in &callee.blocks {
            for site in &block.instructions {
                if let Instruction::Return { values } = &site.kind {
                    if values.len() == 1 {
                        let ty = self.value(values[0]).ty.clone();
                        if ty.may_share_object() {
                            let rv = self.reference_of(matched, values[0]);
                            self.heap.insert(&rv);
                            self.unify_respecting_type(&rresult, &rv, &ty);
                        }
                    } else {
                        for (i, &v) in values.iter().enumerate() {
                            if !self.value(v).ty.may_share_object() {
                                continue;
                            }
                            let rv = self.reference_of(matched, v);
                            self.heap.insert(&rv);
                            self.field_install_or_unify(&rresult, Field::index(i as i64), &rv);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use super::*;
    use crate::config::RawConfig;
    use crate::features::points_to::domain::partitions::Partitions;
    use crate::ssa::{BasicKind, BlockId, CallKind, InstrSite, PetgraphCallGraph};

    fn ptr_int() -> Type {
        Type::Pointer(Box::new(Type::Basic(BasicKind::Int)))
    }

    /// `func f(x, y *int) { g(x); g(y) } ; func g(a *int) {}` — §8.8 /
    /// scenario 4. With `K = 0` all of `f.x`, `f.y`, `g.a` collapse into
    /// one partition; with `K = 1` the two call sites must keep `g.a`
    /// disjoint per caller argument.
    fn two_call_sites_program() -> (Program, PetgraphCallGraph, ValueId, ValueId, ValueId, FunctionId, FunctionId, InstrId, InstrId) {
        let f_id = FunctionId(0);
        let g_id = FunctionId(1);
        let x = ValueId(0);
        let y = ValueId(1);
        let a = ValueId(2);

        let mut values = HashMap::new();
        values.insert(x, Value { id: x, function: f_id, ty: ptr_int(), position: None, kind: ValueKind::Parameter });
        values.insert(y, Value { id: y, function: f_id, ty: ptr_int(), position: None, kind: ValueKind::Parameter });
        values.insert(a, Value { id: a, function: g_id, ty: ptr_int(), position: None, kind: ValueKind::Parameter });

        let site0 = InstrId(0);
        let site1 = InstrId(1);
        let f_block = BasicBlock {
            id: BlockId(0),
            function: f_id,
            instructions: vec![
                InstrSite { id: site0, position: None, kind: Instruction::Call { result: None, kind: CallKind::Call, callee: Callee::Static(g_id), args: Arc::from(vec![x]), signature_variadic: false } },
                InstrSite { id: site1, position: None, kind: Instruction::Call { result: None, kind: CallKind::Call, callee: Callee::Static(g_id), args: Arc::from(vec![y]), signature_variadic: false } },
            ],
            preds: vec![],
            succs: vec![],
        };
        let g_block = BasicBlock { id: BlockId(0), function: g_id, instructions: vec![], preds: vec![], succs: vec![] };

        let f_func = Function { id: f_id, name: Arc::from("pkg.f"), params: vec![x, y], free_vars: vec![], blocks: vec![f_block], is_variadic: false, has_body: true };
        let g_func = Function { id: g_id, name: Arc::from("pkg.g"), params: vec![a], free_vars: vec![], blocks: vec![g_block], is_variadic: false, has_body: true };

        let mut call_graph = PetgraphCallGraph::new();
        call_graph.add_function(f_id);
        call_graph.add_function(g_id);
        call_graph.add_edge(f_id, g_id, site0);
        call_graph.add_edge(f_id, g_id, site1);

        (Program { functions: vec![f_func, g_func], values }, call_graph, x, y, a, f_id, g_id, site0, site1)
    }

    #[test]
    fn k0_collapses_both_call_sites_into_one_partition() {
        let (program, call_graph, x, y, a, _f_id, _g_id, _site0, _site1) = two_call_sites_program();
        let config = RawConfig { context_k: 0, ..RawConfig::default() }.compile().unwrap();
        let heap = Transformer::new(&program, &call_graph, &config).run();
        let partitions = Partitions::finalize(heap);

        let factory = ReferenceFactory::new();
        let rx = factory.make_local(Context::empty(), x);
        let ry = factory.make_local(Context::empty(), y);
        let ra = factory.make_local(Context::empty(), a);
        assert_eq!(partitions.representative(&rx), partitions.representative(&ra));
        assert_eq!(partitions.representative(&ry), partitions.representative(&ra));
    }

    #[test]
    fn k1_keeps_the_two_call_sites_disjoint() {
        let (program, call_graph, x, y, a, _f_id, _g_id, site0, site1) = two_call_sites_program();
        let config = RawConfig { context_k: 1, ..RawConfig::default() }.compile().unwrap();
        let heap = Transformer::new(&program, &call_graph, &config).run();
        let partitions = Partitions::finalize(heap);

        let factory = ReferenceFactory::new();
        let rx = factory.make_local(Context::empty(), x);
        let ry = factory.make_local(Context::empty(), y);
        let ra_site0 = factory.make_local(Context::empty().extended(site0), a);
        let ra_site1 = factory.make_local(Context::empty().extended(site1), a);

        assert_eq!(partitions.representative(&rx), partitions.representative(&ra_site0));
        assert_eq!(partitions.representative(&ry), partitions.representative(&ra_site1));
        assert_ne!(partitions.representative(&rx), partitions.representative(&ry));
    }

    /// A `Callee::Dynamic` call site whose call graph has exactly one
    /// candidate target must still unify arguments with that candidate's
    /// parameters (§4.C4.3's "for each callee in the call graph for this
    /// site"), not silently emit no constraints.
    #[test]
    fn dynamic_call_site_unifies_against_its_call_graph_candidate() {
        let f_id = FunctionId(0);
        let g_id = FunctionId(1);
        let x = ValueId(0);
        let a = ValueId(1);

        let mut values = HashMap::new();
        values.insert(x, Value { id: x, function: f_id, ty: ptr_int(), position: None, kind: ValueKind::Parameter });
        values.insert(a, Value { id: a, function: g_id, ty: ptr_int(), position: None, kind: ValueKind::Parameter });

        let site0 = InstrId(0);
        let f_block = BasicBlock {
            id: BlockId(0),
            function: f_id,
            instructions: vec![InstrSite {
                id: site0,
                position: None,
                kind: Instruction::Call { result: None, kind: CallKind::Call, callee: Callee::Dynamic(x), args: Arc::from(vec![x]), signature_variadic: false },
            }],
            preds: vec![],
            succs: vec![],
        };
        let g_block = BasicBlock { id: BlockId(0), function: g_id, instructions: vec![], preds: vec![], succs: vec![] };
        let f_func = Function { id: f_id, name: Arc::from("pkg.f"), params: vec![x], free_vars: vec![], blocks: vec![f_block], is_variadic: false, has_body: true };
        let g_func = Function { id: g_id, name: Arc::from("pkg.g"), params: vec![a], free_vars: vec![], blocks: vec![g_block], is_variadic: false, has_body: true };

        let mut call_graph = PetgraphCallGraph::new();
        call_graph.add_function(f_id);
        call_graph.add_function(g_id);
        call_graph.add_edge(f_id, g_id, site0);

        let program = Program { functions: vec![f_func, g_func], values };
        let config = RawConfig { context_k: 0, ..RawConfig::default() }.compile().unwrap();
        let heap = Transformer::new(&program, &call_graph, &config).run();
        let partitions = Partitions::finalize(heap);

        let factory = ReferenceFactory::new();
        let rx = factory.make_local(Context::empty(), x);
        let ra = factory.make_local(Context::empty(), a);
        assert_eq!(partitions.representative(&rx), partitions.representative(&ra));
    }
}
