//! Dominator computation over a function's CFG (§4.C6 "Dominates"; §6
//! glossary: "block `A` dominates block `B` iff every path from entry to
//! `B` passes through `A`").
//!
//! The iterative dataflow algorithm (Cooper, Harvey & Kennedy,
//! "A Simple, Fast Dominance Algorithm") is used rather than Lengauer-Tarjan:
//! functions here are small (single compilation units, not whole programs),
//! so the simpler fixed-point iteration is both easier to get right and
//! fast enough in practice.

use rustc_hash::FxHashMap;

use super::types::{BlockId, Function, InstrId};

/// Precomputed dominator tree for one function, plus the block-local
/// instruction order needed to answer intra-block dominance queries.
pub struct DominatorTree {
    /// Immediate dominator of each block; the entry block (first in
    /// `Function::blocks`) has no entry.
    idom: FxHashMap<BlockId, BlockId>,
    entry: BlockId,
    instr_index: FxHashMap<InstrId, (BlockId, usize)>,
}

impl DominatorTree {
    pub fn build(func: &Function) -> Self {
        let mut instr_index = FxHashMap::default();
        for block in &func.blocks {
            for (i, site) in block.instructions.iter().enumerate() {
                instr_index.insert(site.id, (block.id, i));
            }
        }
        if func.blocks.is_empty() {
            return DominatorTree {
                idom: FxHashMap::default(),
                entry: BlockId(0),
                instr_index,
            };
        }
        let entry = func.blocks[0].id;
        let order = reverse_postorder(func, entry);
        let rpo_index: FxHashMap<BlockId, usize> =
            order.iter().enumerate().map(|(i, b)| (*b, i)).collect();

        let mut idom: FxHashMap<BlockId, BlockId> = FxHashMap::default();
        idom.insert(entry, entry);

        let mut changed = true;
        while changed {
            changed = false;
            for &b in order.iter().skip(1) {
                let block = func.block(b).expect("block in order exists in function");
                let mut new_idom: Option<BlockId> = None;
                for &p in &block.preds {
                    if idom.contains_key(&p) {
                        new_idom = Some(match new_idom {
                            None => p,
                            Some(cur) => intersect(&idom, &rpo_index, cur, p),
                        });
                    }
                }
                if let Some(ni) = new_idom {
                    if idom.get(&b) != Some(&ni) {
                        idom.insert(b, ni);
                        changed = true;
                    }
                }
            }
        }
        // The entry's self-loop is an implementation convenience, not a
        // real dominance edge; drop it so `dominates` treats entry as the
        // unique root.
        idom.remove(&entry);

        DominatorTree { idom, entry, instr_index }
    }

    /// Does block `a` dominate block `b`?
    pub fn dominates_block(&self, a: BlockId, b: BlockId) -> bool {
        if a == b {
            return true;
        }
        let mut cur = b;
        loop {
            let Some(&next) = self.idom.get(&cur) else {
                return cur == a && cur == self.entry;
            };
            if next == a {
                return true;
            }
            if next == cur {
                return false;
            }
            cur = next;
        }
    }

    /// Instruction-level dominance: block dominance, plus intra-block
    /// program order when both instructions share a block.
    pub fn dominates_instr(&self, a: InstrId, b: InstrId) -> bool {
        let (Some(&(ba, ia)), Some(&(bb, ib))) =
            (self.instr_index.get(&a), self.instr_index.get(&b))
        else {
            return false;
        };
        if ba == bb {
            return ia <= ib;
        }
        self.dominates_block(ba, bb)
    }
}

fn intersect(
    idom: &FxHashMap<BlockId, BlockId>,
    rpo_index: &FxHashMap<BlockId, usize>,
    mut a: BlockId,
    mut b: BlockId,
) -> BlockId {
    while a != b {
        while rpo_index[&a] > rpo_index[&b] {
            a = idom[&a];
        }
        while rpo_index[&b] > rpo_index[&a] {
            b = idom[&b];
        }
    }
    a
}

fn reverse_postorder(func: &Function, entry: BlockId) -> Vec<BlockId> {
    let mut visited = rustc_hash::FxHashSet::default();
    let mut postorder = Vec::new();
    let mut stack: Vec<(BlockId, usize)> = vec![(entry, 0)];
    visited.insert(entry);

    while let Some((b, next_succ)) = stack.pop() {
        let block = match func.block(b) {
            Some(block) => block,
            None => continue,
        };
        if next_succ < block.succs.len() {
            let succ = block.succs[next_succ];
            stack.push((b, next_succ + 1));
            if visited.insert(succ) {
                stack.push((succ, 0));
            }
        } else {
            postorder.push(b);
        }
    }
    postorder.reverse();
    postorder
}

/// Block-to-block CFG reachability via successor edges, used by C6's
/// flow-sensitive pruning as the non-dominance fallback ("a DAG reachability
/// query over successor edges, with `Dominates` as a fast path").
pub fn block_reachable(func: &Function, from: BlockId, to: BlockId) -> bool {
    if from == to {
        return true;
    }
    let mut visited = rustc_hash::FxHashSet::default();
    let mut stack = vec![from];
    visited.insert(from);
    while let Some(b) = stack.pop() {
        let Some(block) = func.block(b) else { continue };
        for &succ in &block.succs {
            if succ == to {
                return true;
            }
            if visited.insert(succ) {
                stack.push(succ);
            }
        }
    }
    false
}
