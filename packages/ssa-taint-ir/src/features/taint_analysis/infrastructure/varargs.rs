//! §4.C9 varargs/call-argument reconstruction: the input IR lowers a
//! variadic call's trailing arguments into `Alloc(array) + one
//! IndexAddr/Store per element + slice construction`. This walks that
//! pattern back into the logical element list, grounded on the same
//! referrer-index-driven scan idiom `propagator.rs` uses to find a tainted
//! value's users.

use crate::ssa::{BasicBlock, BlockId, Function, Instruction, InstrId, InstrSite, Program, ValueId};

use super::referrer_index::ReferrerIndex;

/// Scans `alloc`'s referrers for `IndexAddr` instructions, each expected to
/// have exactly one subsequent `Store`, and returns the stored values
/// ordered by where their `IndexAddr` instruction appears in the program.
///
/// An `IndexAddr` with zero or more than one `Store` referrer is an
/// unsupported lowering shape and is skipped rather than treated as an
/// error (§7 "Unknown/malformed lowering pattern").
pub fn reconstruct_elements(program: &Program, referrers: &ReferrerIndex, alloc: ValueId) -> Vec<ValueId> {
    let Some(owner) = program.value(alloc).map(|v| v.function) else { return Vec::new() };
    let Some(func) = program.function(owner) else { return Vec::new() };

    let mut elements: Vec<((usize, usize), ValueId)> = Vec::new();
    for &(func_id, instr_id) in referrers.referrers_of(alloc) {
        if func_id != owner {
            continue;
        }
        let Some((block, site)) = locate(func, instr_id) else { continue };
        let Instruction::IndexAddr { result: addr, .. } = &site.kind else { continue };

        let store_values: Vec<ValueId> = referrers
            .referrers_of(*addr)
            .iter()
            .filter(|&&(f, _)| f == owner)
            .filter_map(|&(_, i)| {
                let (_, s) = locate(func, i)?;
                match &s.kind {
                    Instruction::Store { addr: a, value } if a == addr => Some(*value),
                    _ => None,
                }
            })
            .collect();
        if store_values.len() != 1 {
            continue;
        }
        elements.push((program_order(func, block.id, instr_id), store_values[0]));
    }

    elements.sort_by_key(|&(order, _)| order);
    elements.into_iter().map(|(_, v)| v).collect()
}

/// Traces a call's trailing slice argument back to the `Alloc` backing
/// it, hopping through the `Slice`/`Convert`/`ChangeType` wrappers the IR
/// inserts between the element stores and the call site. Bounded to guard
/// against a malformed or cyclic input.
pub fn find_backing_alloc(program: &Program, last_arg: ValueId) -> Option<ValueId> {
    let mut current = last_arg;
    for _ in 0..8 {
        let (_, site) = program.defining_instr(current)?;
        match &site.kind {
            Instruction::Alloc { result, is_array: true, .. } => return Some(*result),
            Instruction::Slice { x, .. } | Instruction::Convert { operand: x, .. } | Instruction::ChangeType { operand: x, .. } => {
                current = *x;
            }
            _ => return None,
        }
    }
    None
}

fn locate<'a>(func: &'a Function, instr: InstrId) -> Option<(&'a BasicBlock, &'a InstrSite)> {
    for block in &func.blocks {
        if let Some(site) = block.instructions.iter().find(|s| s.id == instr) {
            return Some((block, site));
        }
    }
    None
}

fn program_order(func: &Function, block: BlockId, instr: InstrId) -> (usize, usize) {
    let block_idx = func.blocks.iter().position(|b| b.id == block).unwrap_or(usize::MAX);
    let instr_idx = func.block(block).and_then(|b| b.instructions.iter().position(|s| s.id == instr)).unwrap_or(usize::MAX);
    (block_idx, instr_idx)
}
