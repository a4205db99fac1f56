// Copyright (c) 2017-2021 Fabian Schuiki

//! Representation of the control flow in a `Function`.

use crate::{
    impl_table_indexing,
    ir::Block,
    table::PrimaryTable,
};

/// A control flow graph.
///
/// This is the main container for basic blocks and their names. Every
/// `Function` has an associated control flow graph.
#[derive(Default)]
pub struct ControlFlowGraph {
    /// The basic blocks in the graph.
    pub(crate) blocks: PrimaryTable<Block, BlockData>,
}

impl_table_indexing!(ControlFlowGraph, blocks, Block, BlockData);

impl ControlFlowGraph {
    /// Create a new control flow graph.
    pub fn new() -> Self {
        Default::default()
    }

    /// Add a new basic block.
    pub fn add_block(&mut self) -> Block {
        self.blocks.add(BlockData { name: None })
    }

    /// Remove a basic block.
    pub fn remove_block(&mut self, bb: Block) {
        self.blocks.remove(bb);
    }

    /// Return the name of a basic block.
    pub fn get_name(&self, bb: Block) -> Option<&str> {
        self.blocks[bb].name.as_deref()
    }

    /// Set the name of a basic block.
    pub fn set_name(&mut self, bb: Block, name: String) {
        self.blocks[bb].name = Some(name);
    }

    /// Get an upper bound on the block indices handed out so far.
    pub fn block_id_bound(&self) -> usize {
        self.blocks.id_bound()
    }
}

/// Internal table storage for basic blocks.
#[derive(Default)]
pub struct BlockData {
    /// The name of the basic block.
    pub name: Option<String>,
}
