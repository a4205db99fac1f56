// Copyright (c) 2017-2021 Fabian Schuiki

//! Re-exports of commonly used IR items.

pub use crate::ir::{
    Arg, Block, DeclData, DeclId, ExtFunc, FloatCond, FuncId, Function, FunctionBuilder, Inst,
    InstData, IntCond, Module, Opcode, Signature, Value,
};
