// Copyright (c) 2017-2021 Fabian Schuiki

//! A block dominator tree.

use crate::{
    analysis::PredecessorTable,
    ir::{Block, ControlFlowGraph, FunctionLayout, Inst},
    table::TableKey,
};
use hibitset::BitSet;
use std::collections::{HashMap, HashSet};

/// A block dominator tree.
///
/// Records for every block which other blocks in the CFG *have* to be
/// traversed to reach it. And vice versa, which blocks a block precedes in
/// all cases.
#[derive(Debug, Clone)]
pub struct DominatorTree {
    /// Map from a block to the blocks it dominates.
    dominates: HashMap<Block, HashSet<Block>>,
    /// Map from a block to the blocks that dominate it.
    dominated: HashMap<Block, HashSet<Block>>,
    /// Vector of immediate dominators.
    doms: Vec<Block>,
    /// Blocks in post-order.
    post_order: Vec<Block>,
    /// The entry block of the function.
    entry: Block,
}

impl DominatorTree {
    /// Compute the dominator tree of a function.
    ///
    /// This implementation is based on [1].
    ///
    /// [1]: https://www.cs.rice.edu/~keith/Embed/dom.pdf "Cooper, Keith D., Timothy J. Harvey, and Ken Kennedy. 'A simple, fast dominance algorithm.' Software Practice & Experience 4.1-10 (2001): 1-8."
    pub fn new(cfg: &ControlFlowGraph, layout: &FunctionLayout, pred: &PredecessorTable) -> Self {
        let post_order = Self::compute_blocks_post_order(layout, pred);
        let length = post_order.len();
        trace!("[DomTree] post-order {:?}", post_order);

        let undef = std::u32::MAX;
        let mut doms = vec![undef; length];
        let mut inv_post_order = vec![undef; cfg.block_id_bound()];
        for (i, &bb) in post_order.iter().enumerate() {
            inv_post_order[bb.index()] = i as u32;
        }

        for root in Some(layout.entry())
            .into_iter()
            .chain(layout.blocks().filter(|&id| pred.pred_set(id).is_empty()))
        {
            let poidx = inv_post_order[root.index()];
            doms[poidx as usize] = poidx; // root nodes
        }

        let mut changed = true;
        while changed {
            changed = false;

            for idx in (0..length).rev() {
                if doms[idx] == idx as u32 {
                    continue; // skip root nodes
                }
                let bb = post_order[idx];

                let mut preds = pred
                    .pred_set(bb)
                    .iter()
                    .map(|id| inv_post_order[id.index()])
                    .filter(|&p| doms[p as usize] != undef);
                let new_idom = preds.next().unwrap();
                let new_idom = preds.fold(new_idom, |mut i1, mut i2| {
                    let i1_init = i1;
                    while i1 != i2 {
                        if i1 < i2 {
                            if i1 == doms[i1 as usize] {
                                return i1;
                            }
                            i1 = doms[i1 as usize];
                        } else if i2 < i1 {
                            if i2 == doms[i2 as usize] {
                                return i1_init;
                            }
                            i2 = doms[i2 as usize];
                        }
                    }
                    i1
                });
                debug_assert!(new_idom < length as u32);
                if doms[idx] != new_idom {
                    doms[idx] = new_idom;
                    changed = true;
                }
            }
        }
        trace!("[DomTree] converged {:?}", doms);

        let mut doms_final = vec![Block::invalid(); cfg.block_id_bound()];
        for bb in &post_order {
            doms_final[bb.index()] = post_order[doms[inv_post_order[bb.index()] as usize] as usize];
        }

        let mut dominated = HashMap::new();
        for block in layout.blocks() {
            let mut s = HashSet::new();
            let mut bb = block;
            loop {
                s.insert(bb);
                let next = doms_final[bb.index()];
                if next == bb {
                    break;
                }
                bb = next;
            }
            dominated.insert(block, s);
        }

        // Invert the tree.
        let mut dominates: HashMap<Block, HashSet<Block>> =
            layout.blocks().map(|bb| (bb, HashSet::new())).collect();
        for (&bb, dom) in &dominated {
            for d in dom {
                dominates.get_mut(d).unwrap().insert(bb);
            }
        }

        Self {
            dominates,
            dominated,
            doms: doms_final,
            post_order,
            entry: layout.entry(),
        }
    }

    fn compute_blocks_post_order(layout: &FunctionLayout, pred: &PredecessorTable) -> Vec<Block> {
        let mut order = Vec::with_capacity(pred.len());

        let mut stack = Vec::with_capacity(8);
        let mut discovered = BitSet::with_capacity(pred.len() as u32);
        let mut finished = BitSet::with_capacity(pred.len() as u32);

        stack.push(layout.entry());
        stack.extend(layout.blocks().filter(|&id| pred.pred_set(id).is_empty()));

        while let Some(&next) = stack.last() {
            if !discovered.add(next.index() as u32) {
                for &succ in pred.succ_set(next) {
                    if !discovered.contains(succ.index() as u32) {
                        stack.push(succ);
                    }
                }
            } else {
                stack.pop();
                if !finished.add(next.index() as u32) {
                    order.push(next);
                }
            }
        }

        order
    }

    /// Get the blocks in the original CFG in post-order.
    pub fn blocks_post_order(&self) -> &[Block] {
        &self.post_order
    }

    /// Check if a block dominates another.
    ///
    /// A block dominates itself.
    pub fn dominates(&self, dominator: Block, follower: Block) -> bool {
        self.dominates
            .get(&dominator)
            .map(|d| d.contains(&follower))
            .unwrap_or(false)
    }

    /// Get the immediate dominator of a block.
    pub fn dominator(&self, block: Block) -> Block {
        self.doms[block.index()]
    }

    /// Get the dominators of a block.
    pub fn dominators(&self, follower: Block) -> &HashSet<Block> {
        &self.dominated[&follower]
    }

    /// Get the followers of a block, i.e. the blocks it dominates.
    pub fn dominated_by(&self, dominator: Block) -> &HashSet<Block> {
        &self.dominates[&dominator]
    }

    /// Get the children of a block in the dominator tree, in layout order.
    pub fn children(&self, layout: &FunctionLayout, parent: Block) -> Vec<Block> {
        layout
            .blocks()
            .filter(|&bb| bb != parent && self.dominator(bb) == parent)
            .collect()
    }

    /// Walk the dominator tree rooted at the entry block in depth-first
    /// pre-order.
    ///
    /// Children are visited in layout order, which makes the traversal
    /// deterministic. Blocks not reachable from the entry are not part of the
    /// walk.
    pub fn tree_preorder(&self, layout: &FunctionLayout) -> Vec<Block> {
        let mut order = Vec::with_capacity(self.post_order.len());
        let mut stack = vec![self.entry];
        while let Some(bb) = stack.pop() {
            order.push(bb);
            let children = self.children(layout, bb);
            for &child in children.iter().rev() {
                stack.push(child);
            }
        }
        order
    }

    /// Check if an instruction dominates another instruction.
    ///
    /// Within the same block this walks the layout backwards from both
    /// instructions in lockstep; across blocks it falls back to block
    /// dominance.
    pub fn inst_dominates_inst(&self, layout: &FunctionLayout, parent: Inst, child: Inst) -> bool {
        if parent == child {
            return true;
        }

        let parent_bb = layout.inst_block(parent);
        let child_bb = layout.inst_block(child);
        let (parent_bb, child_bb) = match (parent_bb, child_bb) {
            (Some(a), Some(b)) => (a, b),
            _ => return false,
        };

        if parent_bb == child_bb {
            // Check if parent dominates child by starting at both
            // instructions and stepping backwards towards the head of the
            // block. If parent finds child, the result is false. If child
            // finds parent, the result is true. If parent finds the start of
            // the block, the result is true. If child finds the start of the
            // block, the result is false.
            let mut pi = parent;
            let mut ci = child;
            loop {
                if let Some(pci) = layout.prev_inst(ci) {
                    if pci == parent {
                        return true;
                    }
                    ci = pci;
                } else {
                    return false;
                }
                if let Some(ppi) = layout.prev_inst(pi) {
                    if ppi == child {
                        return false;
                    }
                    pi = ppi;
                } else {
                    return true;
                }
            }
        }

        self.dominates(parent_bb, child_bb)
    }

    /// Compute the dominance frontiers of all blocks.
    ///
    /// The frontier of a block B is the set of blocks where B's dominance
    /// ends: blocks with a predecessor dominated by B that are not strictly
    /// dominated by B themselves.
    pub fn dominance_frontiers(
        &self,
        layout: &FunctionLayout,
        pred: &PredecessorTable,
    ) -> HashMap<Block, HashSet<Block>> {
        let mut df: HashMap<Block, HashSet<Block>> =
            layout.blocks().map(|bb| (bb, HashSet::new())).collect();
        for bb in layout.blocks() {
            let preds = pred.pred_set(bb);
            if preds.len() < 2 {
                continue;
            }
            let idom = self.dominator(bb);
            for &p in preds {
                let mut runner = p;
                while runner != idom {
                    df.get_mut(&runner).unwrap().insert(bb);
                    let next = self.dominator(runner);
                    if next == runner {
                        break;
                    }
                    runner = next;
                }
            }
        }
        df
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::prelude::*;
    use crate::ty::{int_ty, void_ty};

    fn diamond() -> Function {
        let mut sig = Signature::new();
        sig.add_arg(int_ty(1));
        sig.set_return_type(void_ty());
        let mut func = Function::new("diamond", sig);
        let arg0 = func.sig.args().next().unwrap();
        let cond = func.dfg.arg_value(arg0);
        let mut builder = FunctionBuilder::new(&mut func);
        let entry = builder.named_block("entry");
        let then = builder.named_block("then");
        let other = builder.named_block("else");
        let exit = builder.named_block("exit");
        builder.append_to(entry);
        builder.ins().br_cond(cond, then, other);
        builder.append_to(then);
        builder.ins().br(exit);
        builder.append_to(other);
        builder.ins().br(exit);
        builder.append_to(exit);
        builder.ins().ret();
        func
    }

    #[test]
    fn diamond_dominance() {
        let func = diamond();
        let pred = PredecessorTable::new(&func.dfg, &func.layout);
        let dt = DominatorTree::new(&func.cfg, &func.layout, &pred);
        let blocks: Vec<_> = func.layout.blocks().collect();
        let (entry, then, other, exit) = (blocks[0], blocks[1], blocks[2], blocks[3]);
        assert!(dt.dominates(entry, then));
        assert!(dt.dominates(entry, other));
        assert!(dt.dominates(entry, exit));
        assert!(!dt.dominates(then, exit));
        assert!(!dt.dominates(other, exit));
        assert_eq!(dt.dominator(exit), entry);
        assert_eq!(dt.tree_preorder(&func.layout)[0], entry);
    }

    #[test]
    fn diamond_frontiers() {
        let func = diamond();
        let pred = PredecessorTable::new(&func.dfg, &func.layout);
        let dt = DominatorTree::new(&func.cfg, &func.layout, &pred);
        let df = dt.dominance_frontiers(&func.layout, &pred);
        let blocks: Vec<_> = func.layout.blocks().collect();
        let (entry, then, other, exit) = (blocks[0], blocks[1], blocks[2], blocks[3]);
        assert!(df[&then].contains(&exit));
        assert!(df[&other].contains(&exit));
        assert!(df[&entry].is_empty());
        assert!(df[&exit].is_empty());
    }
}
