//! §4.C3 Partitions (finalized view): an immutable, path-compressed
//! snapshot of a [`HeapState`], built once and then read-only.

use rustc_hash::FxHashMap;

use super::heap::{FieldMap, HeapState};
use super::reference::Reference;
use crate::errors::{AnalysisError, Result};

pub struct Partitions {
    representative: FxHashMap<Reference, Reference>,
    members: FxHashMap<Reference, Vec<Reference>>,
    fields: FxHashMap<Reference, FieldMap>,
    field_parents: FxHashMap<Reference, Vec<Reference>>,
}

impl Partitions {
    /// §4.C3 finalization algorithm.
    pub fn finalize(heap: HeapState) -> Partitions {
        let (parents, partitions) = heap.into_parts();

        // Step 1: collapse `parents` so every reference maps directly to
        // its current representative.
        let mut representative: FxHashMap<Reference, Reference> = FxHashMap::default();
        for r in parents.keys() {
            let mut cur = r.clone();
            loop {
                let next = parents.get(&cur).expect("closed parent chain").clone();
                if next == cur {
                    break;
                }
                cur = next;
            }
            representative.insert(r.clone(), cur);
        }

        // Step 2: bucket references by representative.
        let mut members: FxHashMap<Reference, Vec<Reference>> = FxHashMap::default();
        for (r, rep) in &representative {
            members.entry(rep.clone()).or_default().push(r.clone());
        }

        // Step 3: rewrite every field-map value to its current
        // representative.
        let mut fields: FxHashMap<Reference, FieldMap> = FxHashMap::default();
        for (rep, info) in partitions {
            let mut rewritten = FieldMap::default();
            for (field, value) in info.fields {
                let resolved = representative.get(&value).cloned().unwrap_or(value);
                rewritten.insert(field, resolved);
            }
            fields.insert(rep, rewritten);
        }

        // Step 4: reverse field index.
        let mut field_parents: FxHashMap<Reference, Vec<Reference>> = FxHashMap::default();
        for (rep, field_map) in &fields {
            for value in field_map.values() {
                field_parents.entry(value.clone()).or_default().push(rep.clone());
            }
        }

        Partitions { representative, members, fields, field_parents }
    }

    pub fn has(&self, r: &Reference) -> bool {
        self.representative.contains_key(r)
    }

    /// O(1) via the compressed map.
    pub fn representative(&self, r: &Reference) -> Option<Reference> {
        self.representative.get(r).cloned()
    }

    pub fn members_of_rep(&self, rep: &Reference) -> &[Reference] {
        self.members.get(rep).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn members(&self, r: &Reference) -> &[Reference] {
        match self.representative(r) {
            Some(rep) => self.members_of_rep(&rep),
            None => &[],
        }
    }

    /// Precondition: `rep` is a representative (§7 "Inconsistent heap
    /// assertion" — fatal if violated).
    pub fn field_map(&self, rep: &Reference) -> Result<&FieldMap> {
        self.fields.get(rep).ok_or_else(|| {
            AnalysisError::internal(format!(
                "field_map requested of non-representative {} after finalization",
                rep.canonical_string()
            ))
        })
    }

    pub fn field_parents(&self, v: &Reference) -> &[Reference] {
        self.field_parents.get(v).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn representatives(&self) -> impl Iterator<Item = &Reference> {
        self.fields.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::points_to::domain::reference::Field;
    use crate::ssa::ValueId;

    fn local(id: u32) -> Reference {
        Reference::Local { context: super::super::reference::Context::empty(), value: ValueId(id) }
    }

    #[test]
    fn finalization_is_idempotent_in_effect() {
        let mut heap = HeapState::new();
        let a = local(0);
        let b = local(1);
        heap.insert(&a);
        heap.insert(&b);
        heap.unify(&a, &b);

        let p1 = Partitions::finalize(heap);
        let rep_a = p1.representative(&a).unwrap();
        let rep_b = p1.representative(&b).unwrap();
        assert_eq!(rep_a, rep_b);
        assert_eq!(p1.representative(&rep_a).unwrap(), rep_a);
    }

    #[test]
    fn field_map_values_are_representatives() {
        let mut heap = HeapState::new();
        let a = local(0);
        let b = local(1);
        heap.insert(&a);
        let rep_a = heap.representative(&a);
        heap.field_map_mut(&rep_a).unwrap().insert(Field::named("x"), b.clone());
        heap.insert(&b);

        let p = Partitions::finalize(heap);
        let rep_a2 = p.representative(&a).unwrap();
        let fmap = p.field_map(&rep_a2).unwrap();
        let field_val = fmap.get(&Field::named("x")).unwrap();
        assert_eq!(p.representative(field_val).unwrap(), *field_val);
    }

    #[test]
    fn reverse_field_index_is_sound() {
        let mut heap = HeapState::new();
        let a = local(0);
        let b = local(1);
        heap.insert(&a);
        heap.insert(&b);
        let rep_a = heap.representative(&a);
        heap.field_map_mut(&rep_a).unwrap().insert(Field::named("x"), b.clone());

        let p = Partitions::finalize(heap);
        let rep_b = p.representative(&b).unwrap();
        let parents_of_b = p.field_parents(&rep_b);
        assert!(parents_of_b.contains(&rep_a));
    }
}
