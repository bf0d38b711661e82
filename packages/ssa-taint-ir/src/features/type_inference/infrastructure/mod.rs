//! §4.C8 field/type inference: builds a directed "depends-on" graph over
//! every named type the program declares — `A -> B` whenever `B`'s
//! underlying type mentions `A`, transitively through arrays, slices,
//! pointers, chans, maps and structs, but never through function
//! signatures or interfaces — then topologically propagates the "inferred
//! source" fact forward from configured source types and source-matching
//! fields.
//!
//! Grounded on the depends-on/topological pattern consulted from the
//! teacher's file-level dependency graph during transformation; re-expressed
//! here directly against this crate's own `ssa::types` type declarations
//! since the teacher's graph was file-level, not type-level, and the
//! propagation algorithm itself is fully specified in §4.C8.

use std::sync::Arc;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::SourcePredicates;
use crate::ssa::{split_type_name, Program, Type};

/// A directed graph of named-type dependencies plus the underlying type
/// each node was declared with, queryable for §4.C8's forward propagation.
pub struct TypeDependencyGraph {
    graph: DiGraph<Arc<str>, ()>,
    nodes: FxHashMap<Arc<str>, NodeIndex>,
    underlying: FxHashMap<Arc<str>, Type>,
}

impl TypeDependencyGraph {
    /// Discovers every `Type::Named` reachable from any value's declared
    /// type anywhere in the program (nested through fields, elements,
    /// pointees, ...), then links `A -> B` whenever `B`'s underlying type
    /// mentions `A`.
    pub fn build(program: &Program) -> Self {
        let mut underlying: FxHashMap<Arc<str>, Type> = FxHashMap::default();
        for v in program.values.values() {
            collect_named_types(&v.ty, &mut underlying);
        }

        let mut graph = DiGraph::new();
        let mut nodes = FxHashMap::default();
        for name in underlying.keys() {
            nodes.insert(name.clone(), graph.add_node(name.clone()));
        }
        for (name, ty) in &underlying {
            let mut deps = FxHashSet::default();
            collect_named_deps(ty, &mut deps);
            let b = nodes[name];
            for dep in deps {
                if let Some(&a) = nodes.get(&dep) {
                    graph.add_edge(a, b, ());
                }
            }
        }

        TypeDependencyGraph { graph, nodes, underlying }
    }

    /// §4.C8 propagation: seeds every named type matching
    /// `is_source_type`, or whose own declared fields match
    /// `is_source_field`, then propagates the fact forward through the
    /// depends-on graph. Strongly-connected components (type cycles) are
    /// each visited once, node order within a component unspecified but
    /// stable across calls for the same graph, per §4.C8's explicit
    /// allowance for cyclic declarations.
    pub fn infer_sources(&self, predicates: &impl SourcePredicates) -> FxHashSet<Arc<str>> {
        let mut inferred: FxHashSet<Arc<str>> = FxHashSet::default();
        // Reverse topological order of components; reversing again gives a
        // valid forward (dependency-first) visitation order.
        for scc in tarjan_scc(&self.graph).into_iter().rev() {
            for node in scc {
                let name = self.graph[node].clone();
                let (package, ty_name) = split_type_name(&name);
                let mut is_source = predicates.is_source_type(&package, &ty_name);
                if !is_source {
                    if let Some(Type::Struct(fields)) = self.underlying.get(&name) {
                        is_source = fields.iter().any(|f| predicates.is_source_field(&package, &ty_name, &f.name));
                    }
                }
                if !is_source {
                    is_source = self
                        .graph
                        .neighbors_directed(node, Direction::Incoming)
                        .any(|pred| inferred.contains(&self.graph[pred]));
                }
                if is_source {
                    inferred.insert(name);
                }
            }
        }
        inferred
    }

    /// The named types `name` directly depends on (its immediate
    /// predecessors in the depends-on graph), for diagnostics/testing.
    pub fn depends_on(&self, name: &str) -> Vec<Arc<str>> {
        match self.nodes.get(name) {
            Some(&idx) => self.graph.neighbors_directed(idx, Direction::Incoming).map(|p| self.graph[p].clone()).collect(),
            None => Vec::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }
}

/// Records every distinct `Named` type reachable from `ty`, keyed by name,
/// descending into pointees, elements and fields so a type that only ever
/// appears nested (never as a value's own top-level type) is still found.
fn collect_named_types(ty: &Type, table: &mut FxHashMap<Arc<str>, Type>) {
    match ty {
        Type::Named { name, underlying } => {
            if table.contains_key(name) {
                return;
            }
            table.insert(name.clone(), (**underlying).clone());
            collect_named_types(underlying, table);
        }
        Type::Pointer(inner) | Type::Slice(inner) | Type::Array(inner, _) | Type::Chan(inner) => collect_named_types(inner, table),
        Type::Map { key, value } => {
            collect_named_types(key, table);
            collect_named_types(value, table);
        }
        Type::Struct(fields) => {
            for f in fields.iter() {
                collect_named_types(&f.ty, table);
            }
        }
        Type::Interface | Type::Signature | Type::Tuple(_) | Type::Basic(_) => {}
    }
}

/// §4.C8: the immediate named-type dependencies mentioned by `ty`,
/// descending through pointers/arrays/slices/chans/maps/structs but
/// stopping at the first `Named` boundary along each path — that type's
/// own dependencies are its own node's concern, discovered when it is
/// processed in turn.
fn collect_named_deps(ty: &Type, out: &mut FxHashSet<Arc<str>>) {
    match ty {
        Type::Named { name, .. } => {
            out.insert(name.clone());
        }
        Type::Pointer(inner) | Type::Slice(inner) | Type::Array(inner, _) | Type::Chan(inner) => collect_named_deps(inner, out),
        Type::Map { key, value } => {
            collect_named_deps(key, out);
            collect_named_deps(value, out);
        }
        Type::Struct(fields) => {
            for f in fields.iter() {
                collect_named_deps(&f.ty, out);
            }
        }
        Type::Interface | Type::Signature | Type::Tuple(_) | Type::Basic(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::config::{FieldTag, SinkPredicates};
    use crate::ssa::{BasicKind, FunctionId, StructField, Value, ValueId, ValueKind};

    struct StubPredicates {
        source_type: &'static str,
    }

    impl SourcePredicates for StubPredicates {
        fn is_source_type(&self, _package: &str, ty_name: &str) -> bool {
            ty_name == self.source_type
        }
        fn is_source_field(&self, _package: &str, _ty_name: &str, _field_name: &str) -> bool {
            false
        }
        fn field_tag_matches(&self, _tag: &FieldTag) -> bool {
            false
        }
    }

    impl SinkPredicates for StubPredicates {
        fn is_sink_fn(&self, _package: &str, _receiver: &str, _method: &str) -> bool {
            false
        }
        fn is_sanitizer(&self, _package: &str, _receiver: &str, _method: &str) -> bool {
            false
        }
        fn is_excluded(&self, _package: &str, _receiver: &str, _method: &str) -> bool {
            false
        }
    }

    /// `type Credentials struct { Token string }`, `type Request struct {
    /// Creds *Credentials }` — a source fact on `Credentials` should reach
    /// `Request` through the pointer field.
    fn program_with_pointer_field() -> Program {
        let creds = Type::Named {
            name: Arc::from("pkg.Credentials"),
            underlying: Box::new(Type::Struct(Arc::from(vec![StructField { name: Arc::from("Token"), ty: Type::Basic(BasicKind::String) }]))),
        };
        let request = Type::Named {
            name: Arc::from("pkg.Request"),
            underlying: Box::new(Type::Struct(Arc::from(vec![StructField { name: Arc::from("Creds"), ty: Type::Pointer(Box::new(creds)) }]))),
        };
        let mut values = HashMap::new();
        values.insert(ValueId(0), Value { id: ValueId(0), function: FunctionId(0), ty: request, position: None, kind: ValueKind::Parameter });
        Program { functions: vec![], values }
    }

    #[test]
    fn pointer_field_dependency_propagates_inferred_source() {
        let program = program_with_pointer_field();
        let graph = TypeDependencyGraph::build(&program);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.depends_on("pkg.Request"), vec![Arc::<str>::from("pkg.Credentials")]);

        let predicates = StubPredicates { source_type: "Credentials" };
        let inferred = graph.infer_sources(&predicates);
        assert!(inferred.contains("pkg.Credentials"));
        assert!(inferred.contains("pkg.Request"));
    }

    #[test]
    fn unrelated_type_is_not_inferred_as_source() {
        let program = program_with_pointer_field();
        let graph = TypeDependencyGraph::build(&program);
        let predicates = StubPredicates { source_type: "Nothing" };
        let inferred = graph.infer_sources(&predicates);
        assert!(inferred.is_empty());
    }

    #[test]
    fn self_referential_type_is_visited_once() {
        // type Node struct { Next *Node }
        let mut values = HashMap::new();
        let node_underlying = Type::Struct(Arc::from(vec![StructField {
            name: Arc::from("Next"),
            ty: Type::Pointer(Box::new(Type::Named { name: Arc::from("pkg.Node"), underlying: Box::new(Type::Basic(BasicKind::Invalid)) })),
        }]));
        let node = Type::Named { name: Arc::from("pkg.Node"), underlying: Box::new(node_underlying) };
        values.insert(ValueId(0), Value { id: ValueId(0), function: FunctionId(0), ty: node, position: None, kind: ValueKind::Parameter });
        let program = Program { functions: vec![], values };

        let graph = TypeDependencyGraph::build(&program);
        assert_eq!(graph.node_count(), 1);
        let predicates = StubPredicates { source_type: "Node" };
        let inferred = graph.infer_sources(&predicates);
        assert!(inferred.contains("pkg.Node"));
    }
}
