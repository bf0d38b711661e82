//! A reverse def-use index: for every [`ValueId`], the instructions that
//! read it as an operand. §4.C6's DFS walks this index to find a tainted
//! value's "referrers".

use rustc_hash::FxHashMap;

use crate::ssa::{FunctionId, InstrId, Program, ValueId};

#[derive(Default)]
pub struct ReferrerIndex {
    referrers: FxHashMap<ValueId, Vec<(FunctionId, InstrId)>>,
}

impl ReferrerIndex {
    pub fn build(program: &Program) -> Self {
        let mut referrers: FxHashMap<ValueId, Vec<(FunctionId, InstrId)>> = FxHashMap::default();
        for func in &program.functions {
            for block in &func.blocks {
                for site in &block.instructions {
                    for operand in site.kind.operands() {
                        referrers.entry(operand).or_default().push((func.id, site.id));
                    }
                }
            }
        }
        ReferrerIndex { referrers }
    }

    pub fn referrers_of(&self, v: ValueId) -> &[(FunctionId, InstrId)] {
        self.referrers.get(&v).map(Vec::as_slice).unwrap_or(&[])
    }
}
