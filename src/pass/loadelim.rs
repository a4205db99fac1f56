// Copyright (c) 2017-2021 Fabian Schuiki

//! Redundant Load Elimination
//!
//! This module implements intra-block elimination of repeated loads. A later
//! load of the same address with the same type reuses the earlier load's
//! value, provided no store or call sits between the two.

use crate::ir::prelude::*;
use crate::stats::{Statistic, Statistics};

/// Eliminate redundant loads in a module.
pub fn run_on_module(module: &mut Module, stats: &mut Statistics) -> bool {
    let mut modified = false;
    for func in module.functions().collect::<Vec<_>>() {
        modified |= run_on_function(&mut module[func], stats);
    }
    modified
}

/// Eliminate redundant loads in a function.
///
/// Returns `true` if the function was modified. The earlier load of a pair
/// always survives.
pub fn run_on_function(func: &mut Function, stats: &mut Statistics) -> bool {
    let mut modified = false;
    for bb in func.layout.blocks().collect::<Vec<_>>() {
        let insts: Vec<_> = func.layout.insts(bb).collect();
        let mut to_erase = vec![];

        for (idx, &first) in insts.iter().enumerate() {
            let (first_ptr, first_ty) = match func.dfg[first] {
                InstData::Load { args, .. } => (args[0], func.dfg.inst_type(first)),
                _ => continue,
            };
            for &other in &insts[idx + 1..] {
                let data = func.dfg[other].clone();
                match data {
                    // A store ends the window for this load; the value in
                    // memory may differ from here on.
                    InstData::Store { .. } => break,
                    InstData::Load { args, volatile, .. } => {
                        if !volatile
                            && args[0] == first_ptr
                            && func.dfg.inst_type(other) == first_ty
                            && no_intervening_store_or_call(func, first, other)
                        {
                            trace!("redundant load {} of {}", other, first);
                            let from = func.dfg.inst_result(other);
                            let to = func.dfg.inst_result(first);
                            func.dfg.replace_use(from, to);
                            to_erase.push(other);
                        }
                    }
                    _ => (),
                }
            }
        }

        for inst in to_erase {
            if func.layout.inst_block(inst).is_some() {
                debug!("erase redundant load {}", inst);
                func.erase_inst(inst);
                stats.bump(Statistic::CseLdElim);
                modified = true;
            }
        }
    }
    modified
}

/// Check that no store or call sits strictly between two instructions of the
/// same block.
///
/// The barrier set is exactly {`store`, `call`}; other opcodes, fences
/// included, do not end the window.
pub fn no_intervening_store_or_call(func: &Function, first: Inst, second: Inst) -> bool {
    let mut cursor = func.layout.next_inst(first);
    while let Some(inst) = cursor {
        if inst == second {
            break;
        }
        match func.dfg[inst].opcode() {
            Opcode::Store | Opcode::Call => return false,
            _ => (),
        }
        cursor = func.layout.next_inst(inst);
    }
    true
}
