//! Default `source_map` builder (§3 "Initial source set", §6 `is_source_type`
//! / `is_source_field` / `field_tag_matches`): walks every function's
//! parameters, free variables and instruction results, consulting the
//! `SourcePredicates` port at each candidate value and field access.
//!
//! Grounded on the predicate-port consultation pattern used throughout
//! `points_to`'s own `SourceFieldPredicate` (`ports/mod.rs`), generalized
//! here from "is this one field a source" to "scan the whole program for
//! source sites."

use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::SourcePredicates;
use crate::ssa::{struct_parts, FunctionId, Instruction, Program, Type, ValueId};

/// A value the analysis should treat as tainted from the start: the
/// originating SSA value plus its declared type (§3's `SourceSite`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSite {
    pub value: ValueId,
    pub ty: Type,
}

/// Builds `source_map : Function -> [SourceSite]` by scanning `program`
/// against `predicates`. Functions with no source sites are omitted from
/// the map; callers should treat a missing key as an empty list.
///
/// Two independent ways a value becomes a source site:
/// - its own declared type (peeled through pointers to the first `Named`
///   wrapper) matches `is_source_type`;
/// - it is the result of a `FieldAddr`/`Field` access whose base struct and
///   field name match `is_source_field`. `field_tag_matches` is not
///   consulted here: the IR's own `StructField` carries no literal
///   key/value tag data, so there is nothing to check a configured or
///   built-in `FieldTag` against at this layer (same reasoning as C8's
///   seeding, documented in `DESIGN.md`).
pub fn identify_sources(program: &Program, predicates: &impl SourcePredicates) -> FxHashMap<FunctionId, Vec<SourceSite>> {
    let mut source_map: FxHashMap<FunctionId, Vec<SourceSite>> = FxHashMap::default();

    for func in &program.functions {
        let mut sites = Vec::new();
        let mut seen: FxHashSet<ValueId> = FxHashSet::default();

        let whole_value_candidates = func.params.iter().chain(func.free_vars.iter()).copied().chain(
            func.blocks.iter().flat_map(|b| b.instructions.iter().filter_map(|s| s.kind.result())),
        );
        for vid in whole_value_candidates {
            if seen.contains(&vid) {
                continue;
            }
            let Some(v) = program.value(vid) else { continue };
            let (package, ty_name) = struct_parts(&v.ty);
            if !ty_name.is_empty() && predicates.is_source_type(&package, &ty_name) {
                sites.push(SourceSite { value: vid, ty: v.ty.clone() });
                seen.insert(vid);
            }
        }

        for block in &func.blocks {
            for site in &block.instructions {
                let (result, x, field) = match &site.kind {
                    Instruction::FieldAddr { result, x, field } | Instruction::Field { result, x, field } => (*result, *x, field),
                    _ => continue,
                };
                if seen.contains(&result) {
                    continue;
                }
                let Some(base) = program.value(x) else { continue };
                let (package, ty_name) = struct_parts(&base.ty);
                let is_source = predicates.is_source_field(&package, &ty_name, field);
                if is_source {
                    if let Some(v) = program.value(result) {
                        sites.push(SourceSite { value: result, ty: v.ty.clone() });
                        seen.insert(result);
                    }
                }
            }
        }

        if !sites.is_empty() {
            source_map.insert(func.id, sites);
        }
    }

    source_map
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use super::*;
    use crate::config::{FieldTag, SinkPredicates};
    use crate::ssa::{BasicBlock, BasicKind, BlockId, Function, InstrId, InstrSite, StructField, Value, ValueKind};

    struct StubPredicates {
        source_type: &'static str,
        source_field: &'static str,
    }

    impl SourcePredicates for StubPredicates {
        fn is_source_type(&self, _package: &str, ty_name: &str) -> bool {
            ty_name == self.source_type
        }
        fn is_source_field(&self, _package: &str, _ty_name: &str, field_name: &str) -> bool {
            field_name == self.source_field
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

    /// `func f(creds *Credentials) { tok := creds.Token }` — `creds` itself
    /// is a whole-value source (its type matches); `tok` is a field-access
    /// source (its field name matches).
    fn program_with_param_and_field() -> (Program, FunctionId, ValueId, ValueId) {
        let func_id = FunctionId(0);
        let creds_ty = Type::Pointer(Box::new(Type::Named {
            name: Arc::from("pkg.Credentials"),
            underlying: Box::new(Type::Struct(Arc::from(vec![StructField { name: Arc::from("Token"), ty: Type::Basic(BasicKind::String) }]))),
        }));
        let creds = ValueId(0);
        let tok = ValueId(1);

        let mut values = HashMap::new();
        values.insert(creds, Value { id: creds, function: func_id, ty: creds_ty, position: None, kind: ValueKind::Parameter });
        values.insert(tok, Value { id: tok, function: func_id, ty: Type::Basic(BasicKind::String), position: None, kind: ValueKind::Instruction(InstrId(0)) });

        let block = BasicBlock {
            id: BlockId(0),
            function: func_id,
            instructions: vec![InstrSite { id: InstrId(0), position: None, kind: Instruction::Field { result: tok, x: creds, field: Arc::from("Token") } }],
            preds: vec![],
            succs: vec![],
        };
        let func = Function { id: func_id, name: Arc::from("f"), params: vec![creds], free_vars: vec![], blocks: vec![block], is_variadic: false, has_body: true };
        (Program { functions: vec![func], values }, func_id, creds, tok)
    }

    #[test]
    fn whole_value_and_field_access_both_identified() {
        let (program, func_id, creds, tok) = program_with_param_and_field();
        let predicates = StubPredicates { source_type: "Credentials", source_field: "Token" };
        let source_map = identify_sources(&program, &predicates);
        let sites = &source_map[&func_id];
        let values: Vec<ValueId> = sites.iter().map(|s| s.value).collect();
        assert!(values.contains(&creds));
        assert!(values.contains(&tok));
    }

    #[test]
    fn no_match_yields_no_entry_for_function() {
        let (program, func_id, ..) = program_with_param_and_field();
        let predicates = StubPredicates { source_type: "Nothing", source_field: "Nothing" };
        let source_map = identify_sources(&program, &predicates);
        assert!(!source_map.contains_key(&func_id));
    }
}
