//! A recorded sanitizer call (§4.C6 "Sanitizer dominance").

use crate::ssa::{BlockId, InstrId, ValueId};

/// A call site the propagator recognized as a sanitizer for some tainted
/// value, recorded so a later sink lookup can ask "does this sanitizer's
/// call dominate the sink?"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitizer {
    pub call_site: InstrId,
    pub block: BlockId,
    /// The value the sanitizer call consumed (its receiver or sole tainted
    /// argument), so a sink check can confirm it's sanitizing the same
    /// taint chain rather than an unrelated one.
    pub sanitizes: ValueId,
}

impl Sanitizer {
    pub fn new(call_site: InstrId, block: BlockId, sanitizes: ValueId) -> Self {
        Sanitizer { call_site, block, sanitizes }
    }
}
