// Copyright (c) 2017-2021 Fabian Schuiki

//! Optimization passes on SSIR.
//!
//! This module implements the local optimization pipeline: dead code
//! elimination, instruction simplification, dominator-based common
//! subexpression elimination, redundant load elimination, and redundant
//! store elimination, plus the optional memory-to-register promotion that
//! may run ahead of them.

pub mod cse;
pub mod dce;
pub mod loadelim;
pub mod mem2reg;
pub mod simplify;
pub mod storeelim;

use crate::ir::Module;
use crate::stats::Statistics;

/// The number of rounds the pass sequence is applied.
///
/// Chosen to reach a practical fixed point on observed inputs; the reported
/// statistics are cumulative across rounds and depend on this count.
const ROUNDS: usize = 3;

/// Run the optimization pipeline over a module.
///
/// Applies {DCE, simplify, CSE, redundant load elimination, redundant store
/// elimination} in order, three times. Counters in `stats` are bumped at
/// every successful erase.
pub fn optimize(module: &mut Module, stats: &mut Statistics) {
    for round in 0..ROUNDS {
        debug!("optimization round {}", round + 1);
        dce::run_on_module(module, stats);
        simplify::run_on_module(module, stats);
        cse::run_on_module(module, stats);
        loadelim::run_on_module(module, stats);
        storeelim::run_on_module(module, stats);
    }
}
