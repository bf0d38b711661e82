//! §4.C2 Heap state: union-find over [`Reference`], union-by-size with a
//! stable insertion-order tie-break, and a per-representative [`FieldMap`].

use rustc_hash::FxHashMap;

use super::reference::{Field, Reference};
use crate::errors::AnalysisError;

pub type FieldMap = FxHashMap<Field, Reference>;

pub(crate) struct PartitionInfo {
    pub(crate) size: u32,
    pub(crate) fields: FieldMap,
}

/// Mutable union-find heap built by C4 and consumed (read-only, after
/// [`HeapState::finalize`]) as [`super::partitions::Partitions`].
pub struct HeapState {
    parents: FxHashMap<Reference, Reference>,
    partitions: FxHashMap<Reference, PartitionInfo>,
    /// Monotonically increasing id assigned at first insertion — the §9
    /// open-question tie-break key ("a stable insertion-order id as a
    /// tertiary key") for equal-size unions.
    insertion_order: FxHashMap<Reference, u64>,
    next_insertion_id: u64,
}

impl HeapState {
    pub fn new() -> Self {
        HeapState {
            parents: FxHashMap::default(),
            partitions: FxHashMap::default(),
            insertion_order: FxHashMap::default(),
            next_insertion_id: 0,
        }
    }

    /// §4.C2 `insert`: idempotent; returns the representative of `r`.
    pub fn insert(&mut self, r: &Reference) -> Reference {
        if !self.parents.contains_key(r) {
            self.parents.insert(r.clone(), r.clone());
            self.partitions.insert(r.clone(), PartitionInfo { size: 1, fields: FxHashMap::default() });
            self.insertion_order.insert(r.clone(), self.next_insertion_id);
            self.next_insertion_id += 1;
            return r.clone();
        }
        self.representative(r)
    }

    /// §4.C2 `representative`: follows `parents` to a fixed point. A lookup
    /// of an unknown reference auto-inserts (§7 "Unresolved reference"),
    /// supporting incomplete SSA inputs such as undeclared external
    /// globals.
    pub fn representative(&mut self, r: &Reference) -> Reference {
        if !self.parents.contains_key(r) {
            return self.insert(r);
        }
        // Chase to the root, then path-compress every link walked.
        let mut path = Vec::new();
        let mut cur = r.clone();
        loop {
            let next = self.parents.get(&cur).expect("reference present in parents").clone();
            if next == cur {
                break;
            }
            path.push(cur);
            cur = next;
        }
        for node in path {
            self.parents.insert(node, cur.clone());
        }
        cur
    }

    /// §4.C2 `field_map`: precondition `r` is a representative.
    pub fn field_map(&self, r: &Reference) -> Result<&FieldMap, AnalysisError> {
        self.partitions
            .get(r)
            .map(|p| &p.fields)
            .ok_or_else(|| AnalysisError::internal(format!(
                "field_map requested of non-representative {}",
                r.canonical_string()
            )))
    }

    pub fn field_map_mut(&mut self, r: &Reference) -> Result<&mut FieldMap, AnalysisError> {
        self.partitions
            .get_mut(r)
            .map(|p| &mut p.fields)
            .ok_or_else(|| AnalysisError::internal("field_map_mut requested of non-representative"))
    }

    /// §4.C2 `unify`: `unify_reps(rep(a), rep(b))`.
    pub fn unify(&mut self, a: &Reference, b: &Reference) {
        let ra = self.representative(a);
        let rb = self.representative(b);
        self.unify_reps(&ra, &rb);
    }

    /// §4.C2 `unify_reps`: the only mutating operation that may recurse.
    /// Invariant 2 (idempotence, §8): unifying two references already in
    /// the same partition is a no-op.
    pub fn unify_reps(&mut self, p: &Reference, q: &Reference) {
        if p == q {
            return;
        }
        let size_p = self.partitions.get(p).map(|i| i.size).unwrap_or(1);
        let size_q = self.partitions.get(q).map(|i| i.size).unwrap_or(1);

        let (survivor, loser) = match size_p.cmp(&size_q) {
            std::cmp::Ordering::Greater => (p.clone(), q.clone()),
            std::cmp::Ordering::Less => (q.clone(), p.clone()),
            std::cmp::Ordering::Equal => {
                let id_p = *self.insertion_order.get(p).unwrap_or(&u64::MAX);
                let id_q = *self.insertion_order.get(q).unwrap_or(&u64::MAX);
                if id_p <= id_q {
                    (p.clone(), q.clone())
                } else {
                    (q.clone(), p.clone())
                }
            }
        };

        let loser_info = match self.partitions.remove(&loser) {
            Some(info) => info,
            None => return, // already merged away by a prior step in this batch
        };
        self.parents.insert(loser.clone(), survivor.clone());

        let survivor_size = self.partitions.get(&survivor).map(|i| i.size).unwrap_or(1);
        if let Some(survivor_info) = self.partitions.get_mut(&survivor) {
            survivor_info.size = survivor_size + loser_info.size;
        }

        let mut to_unify: Vec<(Reference, Reference)> = Vec::new();
        for (field, loser_value) in loser_info.fields {
            let survivor_info = self.partitions.get_mut(&survivor).expect("survivor has partition info");
            match survivor_info.fields.get(&field).cloned() {
                Some(existing) => to_unify.push((loser_value, existing)),
                None => {
                    survivor_info.fields.insert(field, loser_value);
                }
            }
        }

        for (a, b) in to_unify {
            self.unify(&a, &b);
        }
    }

    pub fn is_representative(&self, r: &Reference) -> bool {
        self.parents.get(r) == Some(r)
    }

    pub fn contains(&self, r: &Reference) -> bool {
        self.parents.contains_key(r)
    }

    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        self.parents.keys()
    }

    pub fn insertion_id(&self, r: &Reference) -> Option<u64> {
        self.insertion_order.get(r).copied()
    }

    pub(crate) fn into_parts(
        self,
    ) -> (FxHashMap<Reference, Reference>, FxHashMap<Reference, PartitionInfo>) {
        (self.parents, self.partitions)
    }
}

impl Default for HeapState {
    fn default() -> Self {
        Self::new()
    }
}
