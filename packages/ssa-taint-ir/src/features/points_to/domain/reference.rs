//! §4.C1 Reference model: the opaque, hashable heap-partition identity.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::ssa::{InstrId, Type, Value, ValueId, ValueKind};

/// §3 "Context": an ordered sequence of call sites, bounded by a configured
/// `K`. The empty context (`Context::EMPTY`, an empty slice) is the unique
/// representative for globals and for `K = 0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Context(pub Arc<[InstrId]>);

impl Context {
    pub fn empty() -> Self {
        Context(Arc::from(&[][..]))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Appends a call site, producing the context of a callee reached from
    /// this one (§4.C4 "Contexts").
    pub fn extended(&self, site: InstrId) -> Context {
        let mut v: Vec<InstrId> = self.0.to_vec();
        v.push(site);
        Context(Arc::from(v))
    }

    /// Two contexts are *K-equal* iff their last `k` sites are equal.
    pub fn k_equal(&self, other: &Context, k: u32) -> bool {
        let k = k as usize;
        let a = &self.0[self.0.len().saturating_sub(k)..];
        let b = &other.0[other.0.len().saturating_sub(k)..];
        a == b
    }

    /// Truncates to the last `k` sites, the representative used to bucket
    /// contexts at context-sensitivity bound `K`.
    pub fn truncated(&self, k: u32) -> Context {
        let k = k as usize;
        let start = self.0.len().saturating_sub(k);
        Context(Arc::from(&self.0[start..]))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntheticKind {
    /// `ValueOf(r)`: the value pointed to by `r`.
    ValueOf,
    /// `Field(r)`: an anonymous field of `r` created by copy-by-value
    /// merging.
    Field,
}

/// A structural field key. Either a name (struct field, string-encoded
/// tuple/array index, or a reserved pseudo-field) — reserved names are
/// guaranteed by the IR not to collide with real field names (§6).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field(pub Arc<str>);

pub const ANY_FIELD: &str = "AnyField";
pub const POINTS_TO_FIELD: &str = "->";

impl Field {
    pub fn named(name: &str) -> Self {
        Field(Arc::from(name))
    }

    pub fn index(i: i64) -> Self {
        Field(Arc::from(i.to_string().as_str()))
    }

    pub fn any_field() -> Self {
        Field(Arc::from(ANY_FIELD))
    }

    pub fn points_to() -> Self {
        Field(Arc::from(POINTS_TO_FIELD))
    }
}

/// §3 "Reference": an opaque identity usable as a map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reference {
    Local { context: Context, value: ValueId },
    Global { value: ValueId },
    Synthetic { kind: SyntheticKind, parent: Arc<Reference> },
}

impl Reference {
    /// The SSA value this reference ultimately names; synthetics forward to
    /// their parent (§4.C1).
    pub fn underlying_value(&self) -> Option<ValueId> {
        match self {
            Reference::Local { value, .. } | Reference::Global { value } => Some(*value),
            Reference::Synthetic { parent, .. } => parent.underlying_value(),
        }
    }

    /// Deterministic, debug-only canonical string form (§4.C1: "used only
    /// for debugging and test oracles").
    pub fn canonical_string(&self) -> String {
        match self {
            Reference::Local { context, value } => {
                if context.is_empty() {
                    format!("v{}", value.0)
                } else {
                    let sites: Vec<String> =
                        context.0.iter().map(|s| s.0.to_string()).collect();
                    format!("[{}]v{}", sites.join(","), value.0)
                }
            }
            Reference::Global { value } => format!("g{}", value.0),
            Reference::Synthetic { kind, parent } => match kind {
                SyntheticKind::ValueOf => format!("*({})", parent.canonical_string()),
                SyntheticKind::Field => format!("field({})", parent.canonical_string()),
            },
        }
    }
}

/// Hash-conses `Synthetic` references per parent so that repeated requests
/// for the same `(kind, parent)` pair yield structurally (and pointer-)
/// equal references, per §3's "hash-consed per parent" requirement.
#[derive(Default)]
pub struct ReferenceFactory {
    synthetics: FxHashMap<(SyntheticKind, Reference), Arc<Reference>>,
}

impl ReferenceFactory {
    pub fn new() -> Self {
        ReferenceFactory { synthetics: FxHashMap::default() }
    }

    pub fn make_local(&self, context: Context, value: ValueId) -> Reference {
        Reference::Local { context, value }
    }

    pub fn make_global(&self, value: ValueId) -> Reference {
        Reference::Global { value }
    }

    /// Inspects the value's kind to pick `Local` vs `Global`.
    pub fn make(&self, context: Context, value: &Value) -> Reference {
        match value.kind {
            ValueKind::Global => Reference::Global { value: value.id },
            _ => Reference::Local { context, value: value.id },
        }
    }

    pub fn make_synthetic(&mut self, kind: SyntheticKind, parent: Reference) -> Reference {
        let key = (kind, parent.clone());
        let arc_parent = self
            .synthetics
            .entry(key)
            .or_insert_with(|| Arc::new(parent))
            .clone();
        Reference::Synthetic { kind, parent: arc_parent }
    }
}

/// §4.C1 `may_share_object` convenience bound to a reference's own type, for
/// callers that only have a `Type` in hand (e.g. C4 deciding whether to
/// generate a constraint at all).
pub fn may_share_object(ty: &Type) -> bool {
    ty.may_share_object()
}
