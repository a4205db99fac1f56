// Copyright (c) 2017-2021 Fabian Schuiki

//! Optimization statistics.
//!
//! Named monotonic counters bumped by the passes at every successful erase,
//! plus a module summary. Counters are reported in a fixed enumeration
//! order.

use crate::ir::{Module, Opcode};
use std::ops::{Index, IndexMut};

/// A named statistic counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    /// Number of non-empty functions in the module.
    Functions,
    /// Number of instructions in the module.
    Instructions,
    /// Number of loads in the module.
    Loads,
    /// Number of stores in the module.
    Stores,
    /// Dead instructions erased.
    CseDead,
    /// Redundant instructions erased by CSE.
    CseElim,
    /// Instructions erased after simplification.
    CseSimplify,
    /// Redundant loads erased.
    CseLdElim,
    /// Loads forwarded from an earlier store.
    CseStore2Load,
    /// Overwritten stores erased.
    CseStElim,
}

impl Statistic {
    /// All counters, in enumeration order.
    pub const ALL: [Statistic; 10] = [
        Statistic::Functions,
        Statistic::Instructions,
        Statistic::Loads,
        Statistic::Stores,
        Statistic::CseDead,
        Statistic::CseElim,
        Statistic::CseSimplify,
        Statistic::CseLdElim,
        Statistic::CseStore2Load,
        Statistic::CseStElim,
    ];

    /// The name under which the counter is reported.
    pub fn name(self) -> &'static str {
        match self {
            Statistic::Functions => "Functions",
            Statistic::Instructions => "Instructions",
            Statistic::Loads => "Loads",
            Statistic::Stores => "Stores",
            Statistic::CseDead => "CSEDead",
            Statistic::CseElim => "CSEElim",
            Statistic::CseSimplify => "CSESimplify",
            Statistic::CseLdElim => "CSELdElim",
            Statistic::CseStore2Load => "CSEStore2Load",
            Statistic::CseStElim => "CSEStElim",
        }
    }

    /// A short description of the counter.
    pub fn description(self) -> &'static str {
        match self {
            Statistic::Functions => "number of functions",
            Statistic::Instructions => "number of instructions",
            Statistic::Loads => "number of loads",
            Statistic::Stores => "number of stores",
            Statistic::CseDead => "CSE found dead instructions",
            Statistic::CseElim => "CSE redundant instructions",
            Statistic::CseSimplify => "CSE simplified instructions",
            Statistic::CseLdElim => "CSE redundant loads",
            Statistic::CseStore2Load => "CSE forwarded store to load",
            Statistic::CseStElim => "CSE redundant stores",
        }
    }
}

/// The set of statistic counters.
///
/// Counters only ever increase. A single `Statistics` instance is threaded
/// through the whole optimization run.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Statistics {
    counts: [u64; 10],
}

impl Statistics {
    /// Create a set of counters, all zero.
    pub fn new() -> Self {
        Default::default()
    }

    /// Increment a counter by one.
    pub fn bump(&mut self, stat: Statistic) {
        self[stat] += 1;
    }

    /// Write the non-zero counters as CSV lines, in enumeration order.
    pub fn write_csv(&self, sink: &mut impl std::io::Write) -> std::io::Result<()> {
        for &stat in Statistic::ALL.iter() {
            if self[stat] != 0 {
                writeln!(sink, "{},{}", stat.name(), self[stat])?;
            }
        }
        Ok(())
    }
}

impl Index<Statistic> for Statistics {
    type Output = u64;

    fn index(&self, stat: Statistic) -> &u64 {
        &self.counts[stat as usize]
    }
}

impl IndexMut<Statistic> for Statistics {
    fn index_mut(&mut self, stat: Statistic) -> &mut u64 {
        &mut self.counts[stat as usize]
    }
}

impl std::fmt::Display for Statistics {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "===--- Statistics ---===")?;
        for &stat in Statistic::ALL.iter() {
            writeln!(
                f,
                "{:8} {:16} - {}",
                self[stat],
                stat.name(),
                stat.description()
            )?;
        }
        Ok(())
    }
}

/// Count functions, instructions, loads, and stores of a module into the
/// summary counters.
///
/// Functions without blocks do not count.
pub fn summarize(module: &Module, stats: &mut Statistics) {
    for func in module.functions() {
        let func = &module[func];
        if func.layout.first_block().is_some() {
            stats.bump(Statistic::Functions);
        }
        for bb in func.layout.blocks() {
            for inst in func.layout.insts(bb) {
                stats.bump(Statistic::Instructions);
                match func.dfg[inst].opcode() {
                    Opcode::Load => stats.bump(Statistic::Loads),
                    Opcode::Store => stats.bump(Statistic::Stores),
                    _ => (),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_skips_zero_counters_and_keeps_order() {
        let mut stats = Statistics::new();
        stats.bump(Statistic::CseDead);
        stats.bump(Statistic::CseDead);
        stats.bump(Statistic::Functions);
        let mut out = vec![];
        stats.write_csv(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Functions,1\nCSEDead,2\n");
    }
}
