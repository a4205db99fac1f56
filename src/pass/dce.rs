// Copyright (c) 2017-2021 Fabian Schuiki

//! Dead Code Elimination
//!
//! This module implements dead code elimination. It removes instructions
//! whose only observable effect is the value they produce, once that value
//! has no readers left. Each block sheds at most one instruction per
//! invocation; chains of dead instructions drain over the rounds of the
//! driver, whose statistics expect exactly this pace.

use crate::ir::prelude::*;
use crate::stats::{Statistic, Statistics};

/// Eliminate dead code in a module.
pub fn run_on_module(module: &mut Module, stats: &mut Statistics) -> bool {
    let mut modified = false;
    for func in module.functions().collect::<Vec<_>>() {
        modified |= run_on_function(&mut module[func], stats);
    }
    modified
}

/// Eliminate dead code in a function.
///
/// Returns `true` if the function was modified.
pub fn run_on_function(func: &mut Function, stats: &mut Statistics) -> bool {
    let mut modified = false;
    for bb in func.layout.blocks().collect::<Vec<_>>() {
        let mut dead = None;
        for inst in func.layout.insts(bb) {
            if is_dead(func, inst) {
                dead = Some(inst);
            }
        }
        if let Some(inst) = dead {
            debug!("DCE erase {} in {}", inst, bb);
            func.erase_inst(inst);
            stats.bump(Statistic::CseDead);
            modified = true;
        }
    }
    modified
}

/// Check if an instruction is dead.
///
/// True iff the instruction produces a value, its opcode has no observable
/// effect besides that value, and the value has no uses. Volatile loads are
/// never dead. `alloca` counts as dead-when-unused: an unused allocation has
/// no reachable address.
pub fn is_dead(func: &Function, inst: Inst) -> bool {
    let data = &func.dfg[inst];
    match data.opcode() {
        Opcode::Add
        | Opcode::Sub
        | Opcode::Mul
        | Opcode::Udiv
        | Opcode::Sdiv
        | Opcode::Urem
        | Opcode::Srem
        | Opcode::Fneg
        | Opcode::Fadd
        | Opcode::Fsub
        | Opcode::Fmul
        | Opcode::Fdiv
        | Opcode::Frem
        | Opcode::Shl
        | Opcode::Lshr
        | Opcode::Ashr
        | Opcode::And
        | Opcode::Or
        | Opcode::Xor
        | Opcode::Icmp
        | Opcode::Fcmp
        | Opcode::Trunc
        | Opcode::Zext
        | Opcode::Sext
        | Opcode::Fptoui
        | Opcode::Fptosi
        | Opcode::Uitofp
        | Opcode::Sitofp
        | Opcode::Fptrunc
        | Opcode::Fpext
        | Opcode::Ptrtoint
        | Opcode::Inttoptr
        | Opcode::Bitcast
        | Opcode::ExtractElement
        | Opcode::InsertElement
        | Opcode::ShuffleVector
        | Opcode::ExtractValue
        | Opcode::InsertValue
        | Opcode::Gep
        | Opcode::Alloca
        | Opcode::Phi
        | Opcode::Select => !func.dfg.has_uses(func.dfg.inst_result(inst)),
        Opcode::Load => {
            if data.is_volatile() {
                return false;
            }
            !func.dfg.has_uses(func.dfg.inst_result(inst))
        }
        // Any other opcode fails the test.
        _ => false,
    }
}
