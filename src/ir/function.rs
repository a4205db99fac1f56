// Copyright (c) 2017-2021 Fabian Schuiki

//! Representation of SSIR functions.

use crate::{
    ir::{
        Block, ControlFlowGraph, DataFlowGraph, ExtFunc, ExtFuncData, FunctionLayout, Inst,
        InstBuilder, InstData, Signature, Value, ValueData,
    },
    konst::{const_float, const_int, Konst},
    ty::{float_ty, int_ty, pointer_ty, Type},
    verifier::Verifier,
};
use num::BigInt;
use std::ops::{Index, IndexMut};

/// A function.
pub struct Function {
    pub name: String,
    pub sig: Signature,
    pub dfg: DataFlowGraph,
    pub cfg: ControlFlowGraph,
    pub layout: FunctionLayout,
}

impl Function {
    /// Create a new function.
    pub fn new(name: impl Into<String>, sig: Signature) -> Self {
        let mut func = Self {
            name: name.into(),
            sig,
            dfg: DataFlowGraph::new(),
            cfg: ControlFlowGraph::new(),
            layout: FunctionLayout::new(),
        };
        func.dfg.make_args_for_signature(&func.sig);
        func
    }

    /// Erase an instruction from the function.
    ///
    /// Removes the instruction from the layout and the data flow graph.
    /// Panics if the instruction's result still has uses.
    pub fn erase_inst(&mut self, inst: Inst) {
        self.layout.remove_inst(inst);
        self.dfg.remove_inst(inst);
    }

    /// Dump the function in human-readable form.
    pub fn dump(&self) -> String {
        crate::assembly::write_function_string(self)
    }

    /// Panic if the function is not well-formed.
    pub fn verify(&self) {
        let mut verifier = Verifier::new();
        verifier.verify_function(self);
        match verifier.finish() {
            Ok(()) => (),
            Err(errs) => {
                eprintln!();
                eprintln!("Verified function:");
                eprintln!("{}", self.dump());
                eprintln!();
                eprintln!("Verification errors:");
                eprintln!("{}", errs);
                panic!("verification failed");
            }
        }
    }
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.dump())
    }
}

impl Index<Value> for Function {
    type Output = ValueData;
    fn index(&self, idx: Value) -> &ValueData {
        self.dfg.index(idx)
    }
}

impl Index<Inst> for Function {
    type Output = InstData;
    fn index(&self, idx: Inst) -> &InstData {
        self.dfg.index(idx)
    }
}

impl Index<ExtFunc> for Function {
    type Output = ExtFuncData;
    fn index(&self, idx: ExtFunc) -> &ExtFuncData {
        self.dfg.index(idx)
    }
}

impl IndexMut<Value> for Function {
    fn index_mut(&mut self, idx: Value) -> &mut ValueData {
        self.dfg.index_mut(idx)
    }
}

impl IndexMut<Inst> for Function {
    fn index_mut(&mut self, idx: Inst) -> &mut InstData {
        self.dfg.index_mut(idx)
    }
}

/// The position where new instructions will be inserted into a `Function`.
#[derive(Clone, Copy)]
enum InsertPos {
    None,
    Append(Block),
    Prepend(Block),
    After(Inst),
    Before(Inst),
}

/// Temporary object used to build a single `Function`.
pub struct FunctionBuilder<'u> {
    /// The function currently being built.
    pub func: &'u mut Function,
    /// The position where we are currently inserting instructions.
    pos: InsertPos,
}

impl<'u> FunctionBuilder<'u> {
    /// Create a new function builder.
    pub fn new(func: &'u mut Function) -> Self {
        Self {
            func,
            pos: InsertPos::None,
        }
    }

    /// Add a new instruction using an `InstBuilder`.
    pub fn ins(&mut self) -> InstBuilder<'u, '_> {
        InstBuilder::new(self)
    }

    /// Add a new instruction at the current insertion position.
    pub fn build_inst(&mut self, data: InstData, ty: Type) -> Inst {
        let inst = self.func.dfg.add_inst(data, ty);
        match self.pos {
            InsertPos::None => panic!("no insertion position set"),
            InsertPos::Append(bb) => self.func.layout.append_inst(inst, bb),
            InsertPos::Prepend(bb) => {
                self.func.layout.prepend_inst(inst, bb);
                self.pos = InsertPos::After(inst);
            }
            InsertPos::After(other) => {
                self.func.layout.insert_inst_after(inst, other);
                self.pos = InsertPos::After(inst);
            }
            InsertPos::Before(other) => self.func.layout.insert_inst_before(inst, other),
        }
        inst
    }

    /// Remove an instruction.
    pub fn remove_inst(&mut self, inst: Inst) {
        match self.pos {
            InsertPos::After(i) if i == inst => {
                self.pos = match self.func.layout.prev_inst(inst) {
                    Some(prev) => InsertPos::After(prev),
                    None => InsertPos::Prepend(self.func.layout.inst_block(inst).unwrap()),
                };
            }
            InsertPos::Before(i) if i == inst => {
                self.pos = match self.func.layout.next_inst(inst) {
                    Some(next) => InsertPos::Before(next),
                    None => InsertPos::Append(self.func.layout.inst_block(inst).unwrap()),
                };
            }
            _ => (),
        }
        self.func.erase_inst(inst);
    }

    /// Create a new BB and append it to the function.
    pub fn block(&mut self) -> Block {
        let bb = self.func.cfg.add_block();
        self.func.layout.append_block(bb);
        bb
    }

    /// Create a new named BB and append it to the function.
    pub fn named_block(&mut self, name: impl Into<String>) -> Block {
        let bb = self.block();
        self.func.cfg.set_name(bb, name.into());
        bb
    }

    /// Append all following instructions to the end of `bb`.
    pub fn append_to(&mut self, bb: Block) {
        self.pos = InsertPos::Append(bb);
    }

    /// Prepend all following instructions to the beginning of `bb`.
    pub fn prepend_to(&mut self, bb: Block) {
        self.pos = InsertPos::Prepend(bb);
    }

    /// Insert all following instructions after `inst`.
    pub fn insert_after(&mut self, inst: Inst) {
        self.pos = InsertPos::After(inst);
    }

    /// Insert all following instructions before `inst`.
    pub fn insert_before(&mut self, inst: Inst) {
        self.pos = InsertPos::Before(inst);
    }

    /// Get the DFG of the function being built.
    pub fn dfg(&self) -> &DataFlowGraph {
        &self.func.dfg
    }

    /// Get the mutable DFG of the function being built.
    pub fn dfg_mut(&mut self) -> &mut DataFlowGraph {
        &mut self.func.dfg
    }

    /// Get the CFG of the function being built.
    pub fn cfg(&self) -> &ControlFlowGraph {
        &self.func.cfg
    }

    /// Get the layout of the function being built.
    pub fn layout(&self) -> &FunctionLayout {
        &self.func.layout
    }

    /// Get the type of a value.
    pub fn value_type(&self, value: Value) -> Type {
        self.func.dfg.value_type(value)
    }

    /// Import an external function for use within this function.
    pub fn add_extern(&mut self, name: impl Into<String>, sig: Signature) -> ExtFunc {
        self.func.dfg.add_ext_func(name, sig)
    }

    /// Intern an integer constant, wrapped to the given width.
    pub fn const_int(&mut self, width: usize, value: impl Into<BigInt>) -> Value {
        self.func
            .dfg
            .const_value(int_ty(width), const_int(width, value))
    }

    /// Intern a float constant of the given width.
    pub fn const_float(&mut self, width: usize, value: f64) -> Value {
        self.func
            .dfg
            .const_value(float_ty(width), const_float(value))
    }

    /// Intern the null pointer constant.
    pub fn const_null(&mut self) -> Value {
        self.func.dfg.const_value(pointer_ty(), Konst::Null)
    }

    /// Intern an undefined value of the given type.
    pub fn const_undef(&mut self, ty: Type) -> Value {
        self.func.dfg.const_value(ty, Konst::Undef)
    }

    /// Remove an instruction if its value is not being read.
    ///
    /// Returns true if the instruction was removed.
    pub fn prune_if_unused(&mut self, inst: Inst) -> bool {
        if self.dfg().has_result(inst) && !self.dfg().has_uses(self.dfg().inst_result(inst)) {
            self.remove_inst(inst);
            true
        } else {
            false
        }
    }
}

impl std::ops::Deref for FunctionBuilder<'_> {
    type Target = Function;
    fn deref(&self) -> &Function {
        self.func
    }
}

impl std::ops::DerefMut for FunctionBuilder<'_> {
    fn deref_mut(&mut self) -> &mut Function {
        self.func
    }
}
