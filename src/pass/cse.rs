// Copyright (c) 2017-2021 Fabian Schuiki

//! Common Subexpression Elimination
//!
//! This module implements dominator-based common subexpression elimination.
//! Within a block, a pure instruction replaces identical instructions that
//! follow it; across blocks, a pure instruction replaces identical
//! instructions in every block its own block dominates.

use crate::analysis::{DominatorTree, PredecessorTable};
use crate::ir::prelude::*;
use crate::stats::{Statistic, Statistics};

/// Eliminate common subexpressions in a module.
pub fn run_on_module(module: &mut Module, stats: &mut Statistics) -> bool {
    let mut modified = false;
    for func in module.functions().collect::<Vec<_>>() {
        modified |= run_on_function(&mut module[func], stats);
    }
    modified
}

/// Eliminate common subexpressions in a function.
///
/// Returns `true` if the function was modified. The dominator tree is
/// rebuilt on entry and dropped on exit; erasure of replaced instructions is
/// deferred until the whole function has been scanned.
pub fn run_on_function(func: &mut Function, stats: &mut Statistics) -> bool {
    if func.layout.first_block().is_none() {
        return false;
    }
    let pred = PredecessorTable::new(&func.dfg, &func.layout);
    let dt = DominatorTree::new(&func.cfg, &func.layout, &pred);

    let mut to_erase = vec![];
    let blocks: Vec<_> = func.layout.blocks().collect();
    let walk = dt.tree_preorder(&func.layout);

    for &bb in &blocks {
        for &node in &walk {
            if node == bb {
                // Pairs within the block: the earlier instruction wins.
                let insts: Vec<_> = func.layout.insts(bb).collect();
                for &i in &insts {
                    for &j in &insts {
                        if i != j
                            && dt.inst_dominates_inst(&func.layout, i, j)
                            && is_literal_match(func, i, j)
                        {
                            trace!("CSE match {} / {} in {}", i, j, bb);
                            redirect(func, i, j);
                            to_erase.push(j);
                        }
                    }
                }
            } else if dt.dominates(bb, node) {
                // Pairs across blocks: an instruction in `bb` replaces its
                // duplicates in every block dominated by `bb`.
                let insts: Vec<_> = func.layout.insts(bb).collect();
                let node_insts: Vec<_> = func.layout.insts(node).collect();
                for &i in &insts {
                    for &j in &node_insts {
                        if is_literal_match(func, i, j) {
                            trace!("CSE match {} / {} across {} -> {}", i, j, bb, node);
                            redirect(func, i, j);
                            to_erase.push(j);
                        }
                    }
                }
            }
        }
    }

    let mut modified = false;
    for inst in to_erase {
        if func.layout.inst_block(inst).is_some() {
            debug!("CSE erase {}", inst);
            func.erase_inst(inst);
            stats.bump(Statistic::CseElim);
            modified = true;
        }
    }
    modified
}

fn redirect(func: &mut Function, keep: Inst, gone: Inst) {
    if func.dfg.has_result(keep) && func.dfg.has_result(gone) {
        let from = func.dfg.inst_result(gone);
        let to = func.dfg.inst_result(keep);
        func.dfg.replace_use(from, to);
    }
}

/// Check if an instruction has an observable effect beyond its result value.
///
/// `ret` is not part of the set; a block that strictly dominates another
/// always ends in a branch, so two `ret`s can never pair up in this pass.
pub fn has_side_effects(data: &InstData) -> bool {
    matches!(
        data.opcode(),
        Opcode::Call
            | Opcode::Store
            | Opcode::Alloca
            | Opcode::Load
            | Opcode::Fence
            | Opcode::Br
            | Opcode::Unreachable
    )
}

/// Check if two instructions compute the same value.
///
/// True iff neither has side effects, their instruction data is structurally
/// identical (opcode, operands in order, predicates, immediates), and their
/// result types match. Operand order matters: commutativity is not
/// exploited.
pub fn is_literal_match(func: &Function, i: Inst, j: Inst) -> bool {
    let di = &func.dfg[i];
    let dj = &func.dfg[j];
    if has_side_effects(di) || has_side_effects(dj) {
        return false;
    }
    di == dj && func.dfg.inst_type(i) == func.dfg.inst_type(j)
}
