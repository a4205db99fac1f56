// Copyright (c) 2017-2021 Fabian Schuiki

//! Redundant Store Elimination
//!
//! This module implements intra-block store-to-load forwarding and dead
//! store elimination. A load that follows a store to the same address reads
//! the stored value directly; a store that is overwritten by a later store
//! to the same address before anyone could observe it is erased.

use crate::ir::prelude::*;
use crate::pass::cse::has_side_effects;
use crate::stats::{Statistic, Statistics};

/// Eliminate redundant stores in a module.
pub fn run_on_module(module: &mut Module, stats: &mut Statistics) -> bool {
    let mut modified = false;
    for func in module.functions().collect::<Vec<_>>() {
        modified |= run_on_function(&mut module[func], stats);
    }
    modified
}

/// Eliminate redundant stores in a function.
///
/// Returns `true` if the function was modified.
pub fn run_on_function(func: &mut Function, stats: &mut Statistics) -> bool {
    let mut modified = false;
    for bb in func.layout.blocks().collect::<Vec<_>>() {
        let insts: Vec<_> = func.layout.insts(bb).collect();
        let mut dead_loads = vec![];
        let mut dead_stores = vec![];

        for (idx, &store) in insts.iter().enumerate() {
            let (value, pointer, volatile) = match func.dfg[store] {
                InstData::Store { args, volatile, .. } => (args[0], args[1], volatile),
                _ => continue,
            };
            let stored_ty = func.dfg.value_type(value);
            let mut forwarded = false;

            for &other in &insts[idx + 1..] {
                let data = func.dfg[other].clone();
                match data {
                    InstData::Load {
                        args,
                        volatile: false,
                        ..
                    } if args[0] == pointer && func.dfg.inst_type(other) == stored_ty => {
                        // The load observes exactly the stored value.
                        trace!("forward store {} to load {}", store, other);
                        let from = func.dfg.inst_result(other);
                        func.dfg.replace_use(from, value);
                        dead_loads.push(other);
                        forwarded = true;
                    }
                    InstData::Store { args, .. }
                        if args[1] == pointer
                            && func.dfg.value_type(args[0]) == stored_ty
                            && !volatile =>
                    {
                        // Overwritten before any other observer: the earlier
                        // store dies.
                        trace!("store {} overwritten by {}", store, other);
                        dead_stores.push(store);
                        break;
                    }
                    ref data if !forwarded && has_side_effects(data) => break,
                    _ => (),
                }
            }
        }

        for inst in dead_loads {
            if func.layout.inst_block(inst).is_some() {
                debug!("erase forwarded load {}", inst);
                func.erase_inst(inst);
                stats.bump(Statistic::CseStore2Load);
                modified = true;
            }
        }
        for inst in dead_stores {
            if func.layout.inst_block(inst).is_some() {
                debug!("erase overwritten store {}", inst);
                func.erase_inst(inst);
                stats.bump(Statistic::CseStElim);
                modified = true;
            }
        }
    }
    modified
}
