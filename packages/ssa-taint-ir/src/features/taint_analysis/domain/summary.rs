//! Per-function taint summary: the result of one `taint(root)` walk (§4.C6),
//! kept so C7 can reuse a propagation without re-walking the same root
//! twice, and so diagnostics can report the order taint was discovered in.

use rustc_hash::FxHashSet;

use super::sanitizer::Sanitizer;
use crate::ssa::ValueId;

/// What the depth-first walk from one taint root discovered.
#[derive(Debug, Clone, Default)]
pub struct TaintSummary {
    pub tainted: FxHashSet<ValueId>,
    /// Visitation order, preserved for deterministic diagnostic ordering
    /// (§5 "Ordering guarantees").
    pub pre_order: Vec<ValueId>,
    pub sanitizers: Vec<Sanitizer>,
}

impl TaintSummary {
    pub fn is_tainted(&self, v: ValueId) -> bool {
        self.tainted.contains(&v)
    }

    /// True iff some recorded sanitizer sanitizes `v` specifically (callers
    /// still need dominator-tree confirmation against the sink site).
    pub fn sanitizers_of(&self, v: ValueId) -> impl Iterator<Item = &Sanitizer> {
        self.sanitizers.iter().filter(move |s| s.sanitizes == v)
    }
}
