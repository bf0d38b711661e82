//! §4.C5 queries over a finalized [`Partitions`] view: reachability,
//! source/sink classification, and the `reaches` predicate the driver uses
//! to cross sources with sinks.
//!
//! Grounded on the teacher's `points_to/application/analyzer.rs` split
//! between graph construction and the read-only query layer built on top
//! of it.

use rustc_hash::FxHashSet;

use crate::features::points_to::domain::partitions::Partitions;
use crate::features::points_to::domain::reference::{Context, Field, Reference};
use crate::features::points_to::ports::SourceFieldPredicate;
use crate::ssa::{Program, Type, ValueId};

pub struct Queries<'a> {
    program: &'a Program,
    partitions: &'a Partitions,
}

impl<'a> Queries<'a> {
    pub fn new(program: &'a Program, partitions: &'a Partitions) -> Self {
        Queries { program, partitions }
    }

    /// §4.C5 "Reachable set": every reference transitively reachable from
    /// `start` by following field-map edges, bounded to `depth` hops
    /// (`None` for unbounded).
    pub fn reachable(&self, start: &Reference, depth: Option<u32>) -> FxHashSet<Reference> {
        let mut visited: FxHashSet<Reference> = FxHashSet::default();
        let Some(start_rep) = self.partitions.representative(start) else {
            return visited;
        };
        let mut frontier = vec![(start_rep.clone(), 0u32)];
        visited.insert(start_rep);
        while let Some((rep, d)) = frontier.pop() {
            if let Some(max) = depth {
                if d >= max {
                    continue;
                }
            }
            let Ok(fields) = self.partitions.field_map(&rep) else { continue };
            for v in fields.values() {
                let Some(v_rep) = self.partitions.representative(v) else { continue };
                if visited.insert(v_rep.clone()) {
                    frontier.push((v_rep, d + 1));
                }
            }
        }
        visited
    }

    /// §4.C5 "Source reference set": the field-sensitive recursive walk
    /// that classifies a value `v` of declared type `ty` as a taint source
    /// by consulting `is_source_field` at every struct-field boundary
    /// encountered while walking `v`'s reachable partition structure.
    pub fn source_refs(&self, predicates: &impl SourceFieldPredicate, ctx: &Context, v: ValueId, ty: &Type) -> FxHashSet<Reference> {
        let mut found = FxHashSet::default();
        let start = Reference::Local { context: ctx.clone(), value: v };
        let Some(start_rep) = self.partitions.representative(&start) else {
            return found;
        };
        let (package, ty_name) = named_parts(ty);
        let mut visited = FxHashSet::default();
        self.walk_source_fields(predicates, &start_rep, ty.underlying(), &package, &ty_name, &mut visited, &mut found);
        found
    }

    #[allow(clippy::too_many_arguments)]
    fn walk_source_fields(
        &self,
        predicates: &impl SourceFieldPredicate,
        rep: &Reference,
        ty: &Type,
        package: &str,
        ty_name: &str,
        visited: &mut FxHashSet<Reference>,
        found: &mut FxHashSet<Reference>,
    ) {
        if !visited.insert(rep.clone()) {
            return;
        }
        match ty {
            Type::Struct(struct_fields) => {
                let Ok(fields) = self.partitions.field_map(rep) else { return };
                for sf in struct_fields.iter() {
                    let Some(v) = fields.get(&Field::named(&sf.name)) else { continue };
                    let Some(v_rep) = self.partitions.representative(v) else { continue };
                    let (field_package, field_ty_name) = inherit_named_parts(&sf.ty, package, "");
                    if predicates.is_source_field(package, ty_name, &sf.name) {
                        found.insert(v_rep.clone());
                    }
                    self.walk_source_fields(predicates, &v_rep, sf.ty.underlying(), &field_package, &field_ty_name, visited, found);
                }
            }
            Type::Pointer(inner) | Type::Slice(inner) | Type::Array(inner, _) | Type::Chan(inner) => {
                if let Ok(fields) = self.partitions.field_map(rep) {
                    if let Some(v) = fields.get(&Field::points_to()).or_else(|| fields.get(&Field::any_field())) {
                        if let Some(v_rep) = self.partitions.representative(v) {
                            let (inner_package, inner_ty_name) = inherit_named_parts(inner, package, ty_name);
                            self.walk_source_fields(predicates, &v_rep, inner.underlying(), &inner_package, &inner_ty_name, visited, found);
                        }
                    }
                }
            }
            Type::Map { value, .. } => {
                if let Ok(fields) = self.partitions.field_map(rep) {
                    if let Some(v) = fields.get(&Field::any_field()) {
                        if let Some(v_rep) = self.partitions.representative(v) {
                            let (value_package, value_ty_name) = inherit_named_parts(value, package, ty_name);
                            self.walk_source_fields(predicates, &v_rep, value.underlying(), &value_package, &value_ty_name, visited, found);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    /// §4.C5 "Sink reference set": every representative in the partition
    /// reachable from a sink call's tainted-relevant argument, used as the
    /// RHS of `reaches`.
    pub fn sink_refs(&self, ctx: &Context, v: ValueId) -> FxHashSet<Reference> {
        let start = Reference::Local { context: ctx.clone(), value: v };
        self.reachable(&start, None)
    }

    /// `reaches(sink, source_refs)`: true iff the sink's own reachable set
    /// intersects the supplied source-reference set (i.e. they share a
    /// common representative, meaning the sink may read taint-tagged
    /// memory).
    pub fn reaches(&self, sink: &FxHashSet<Reference>, sources: &FxHashSet<Reference>) -> bool {
        sink.iter().any(|r| sources.contains(r))
    }

    pub fn program(&self) -> &Program {
        self.program
    }
}

/// Recovers `(package, type_name)` from a `Named` type wrapper, used to feed
/// `is_source_field`'s `(package, ty_name, field_name)` signature. Anything
/// else (anonymous structs, basic kinds) has no name to report.
fn named_parts(ty: &Type) -> (String, String) {
    match ty {
        Type::Named { name, .. } => crate::ssa::split_type_name(name),
        _ => (String::new(), String::new()),
    }
}

/// Like [`named_parts`], but falls back to the enclosing type's own
/// `(package, ty_name)` when `ty` itself isn't `Named` — an anonymous
/// struct field or element type is still considered part of its parent's
/// package for matcher purposes.
fn inherit_named_parts(ty: &Type, fallback_package: &str, fallback_ty_name: &str) -> (String, String) {
    let (package, ty_name) = named_parts(ty);
    let package = if package.is_empty() { fallback_package.to_string() } else { package };
    let ty_name = if ty_name.is_empty() { fallback_ty_name.to_string() } else { ty_name };
    (package, ty_name)
}
