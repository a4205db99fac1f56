// Copyright (c) 2017-2021 Fabian Schuiki

//! Memory to Register Promotion
//!
//! This module rewrites allocas whose address never escapes into SSA values:
//! phi nodes are placed on the iterated dominance frontier of the stores,
//! and a pre-order walk of the dominator tree replaces every load with the
//! definition that reaches it. This is the only pass that creates
//! instructions; it runs once, ahead of the optimization pipeline.

use crate::analysis::{DominatorTree, PredecessorTable};
use crate::ir::prelude::*;
use crate::konst::Konst;
use crate::ty::Type;
use std::collections::{HashMap, HashSet};

/// Promote allocas in a module.
pub fn run_on_module(module: &mut Module) -> bool {
    let mut modified = false;
    for func in module.functions().collect::<Vec<_>>() {
        modified |= run_on_function(&mut module[func]);
    }
    modified
}

/// Promote allocas in a function.
///
/// Returns `true` if the function was modified.
pub fn run_on_function(func: &mut Function) -> bool {
    if func.layout.first_block().is_none() {
        return false;
    }

    let allocas = promotable_allocas(func);
    if allocas.is_empty() {
        return false;
    }

    let pred = PredecessorTable::new(&func.dfg, &func.layout);
    let dt = DominatorTree::new(&func.cfg, &func.layout, &pred);
    let frontiers = dt.dominance_frontiers(&func.layout, &pred);

    for (alloca, ty) in allocas {
        debug!("promoting {} in @{}", alloca, func.name);
        promote(func, &pred, &dt, &frontiers, alloca, ty);
    }
    true
}

/// Find the allocas whose every use is a full-width, non-volatile load or
/// store through the alloca's address.
///
/// A store that uses the address as the *stored value* makes the address
/// escape and blocks promotion.
fn promotable_allocas(func: &Function) -> Vec<(Inst, Type)> {
    let mut out = vec![];
    'allocas: for bb in func.layout.blocks() {
        for inst in func.layout.insts(bb) {
            let ty = match func.dfg[inst] {
                InstData::Alloca { ref ty, .. } => ty.clone(),
                _ => continue,
            };
            let address = func.dfg.inst_result(inst);
            for (user, _) in func.dfg.uses(address) {
                match func.dfg[user] {
                    InstData::Load { volatile: false, .. } => {
                        if func.dfg.inst_type(user) != ty {
                            continue 'allocas;
                        }
                    }
                    InstData::Store {
                        args,
                        volatile: false,
                        ..
                    } => {
                        if args[0] == address || func.dfg.value_type(args[0]) != ty {
                            continue 'allocas;
                        }
                    }
                    _ => continue 'allocas,
                }
            }
            out.push((inst, ty));
        }
    }
    out
}

/// Promote a single alloca.
fn promote(
    func: &mut Function,
    pred: &PredecessorTable,
    dt: &DominatorTree,
    frontiers: &HashMap<Block, HashSet<Block>>,
    alloca: Inst,
    ty: Type,
) {
    let address = func.dfg.inst_result(alloca);

    // Blocks that define the value.
    let mut def_blocks = HashSet::new();
    for (user, _) in func.dfg.uses(address).collect::<Vec<_>>() {
        if let InstData::Store { args, .. } = func.dfg[user] {
            if args[1] == address {
                def_blocks.insert(func.layout.inst_block(user).unwrap());
            }
        }
    }

    // Place phis on the iterated dominance frontier of the definitions.
    let mut phi_blocks = HashSet::new();
    let mut worklist: Vec<Block> = def_blocks.iter().cloned().collect();
    while let Some(bb) = worklist.pop() {
        for &f in &frontiers[&bb] {
            if phi_blocks.insert(f) && !def_blocks.contains(&f) {
                worklist.push(f);
            }
        }
    }
    let mut phis: HashMap<Block, Inst> = HashMap::new();
    for &bb in &phi_blocks {
        let phi = func.dfg.add_inst(
            InstData::Phi {
                opcode: Opcode::Phi,
                args: vec![],
                bbs: vec![],
            },
            ty.clone(),
        );
        func.layout.prepend_inst(phi, bb);
        phis.insert(bb, phi);
    }

    // Walk the dominator tree and rewrite loads and stores. Each block
    // starts from the definition reaching its immediate dominator, or from
    // the block's own phi.
    let undef = func.dfg.const_value(ty.clone(), Konst::Undef);
    let mut to_erase = vec![];
    let mut stack = vec![(func.layout.entry(), undef)];
    let mut visited = HashSet::new();
    while let Some((bb, mut current)) = stack.pop() {
        if !visited.insert(bb) {
            continue;
        }
        if let Some(&phi) = phis.get(&bb) {
            current = func.dfg.inst_result(phi);
        }
        for inst in func.layout.insts(bb).collect::<Vec<_>>() {
            match func.dfg[inst].clone() {
                InstData::Load { args, .. } if args[0] == address => {
                    let result = func.dfg.inst_result(inst);
                    func.dfg.replace_use(result, current);
                    to_erase.push(inst);
                }
                InstData::Store { args, .. } if args[1] == address => {
                    current = args[0];
                    to_erase.push(inst);
                }
                _ => (),
            }
        }
        // Feed the reaching definition into successor phis.
        for succ in pred.succ(bb) {
            if let Some(&phi) = phis.get(&succ) {
                if let InstData::Phi { args, bbs, .. } = &mut func.dfg[phi] {
                    args.push(current);
                    bbs.push(bb);
                }
            }
        }
        for child in dt.children(&func.layout, bb) {
            stack.push((child, current));
        }
    }

    // Loads and stores in blocks unreachable from the entry still pin the
    // alloca; rewrite them to undef and drop them as well.
    for (user, _) in func.dfg.uses(address).collect::<Vec<_>>() {
        if to_erase.contains(&user) {
            continue;
        }
        if func.dfg.has_result(user) {
            let result = func.dfg.inst_result(user);
            func.dfg.replace_use(result, undef);
        }
        to_erase.push(user);
    }

    for inst in to_erase {
        if func.layout.inst_block(inst).is_some() {
            func.erase_inst(inst);
        }
    }
    func.erase_inst(alloca);
}
