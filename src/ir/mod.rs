// Copyright (c) 2017-2021 Fabian Schuiki

//! Representation of SSIR functions and modules.
//!
//! This module implements the intermediate representation around which the
//! rest of the crate is built: a module of functions, each holding a data
//! flow graph of instructions and values, a control flow graph of basic
//! blocks, and a layout that orders blocks and instructions.

use crate::{impl_table_key, konst::Konst, ty::Type};

mod cfg;
mod dfg;
mod function;
mod inst;
mod layout;
mod module;
pub mod prelude;
mod sig;

pub use self::cfg::*;
pub use self::dfg::*;
pub use self::function::*;
pub use self::inst::*;
pub use self::layout::*;
pub use self::module::*;
pub use self::sig::*;

impl_table_key! {
    /// An instruction.
    struct Inst(u32) as "i";

    /// A value.
    struct Value(u32) as "v";

    /// A basic block.
    struct Block(u32) as "bb";

    /// An argument of a `Function`.
    struct Arg(u32) as "arg";

    /// A function referenced by `call` instructions within a `Function`.
    struct ExtFunc(u32) as "ext";
}

/// Internal table storage for values.
#[derive(Debug)]
pub enum ValueData {
    /// The value is the result of an instruction.
    Inst { ty: Type, inst: Inst },
    /// The value is an argument of the `Function`.
    Arg { ty: Type, arg: Arg },
    /// The value is an interned constant.
    Const { ty: Type, imm: Konst },
    /// The value is a forward reference that the reader has not resolved yet.
    Placeholder { ty: Type },
}

impl ValueData {
    /// Check if the value is a placeholder.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, ValueData::Placeholder { .. })
    }

    /// Check if the value is a constant.
    pub fn is_const(&self) -> bool {
        matches!(self, ValueData::Const { .. })
    }
}

/// A function referenced from within another function.
///
/// Calls name their callee through one of these; the declaration or
/// definition with the matching name provides the actual body.
#[derive(Debug)]
pub struct ExtFuncData {
    /// The name of the referenced function.
    pub name: String,
    /// The signature of the referenced function.
    pub sig: Signature,
}

/// Any one of the table keys in this module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AnyObject {
    Inst(Inst),
    Value(Value),
    Block(Block),
}

impl From<Inst> for AnyObject {
    fn from(x: Inst) -> Self {
        AnyObject::Inst(x)
    }
}

impl From<Value> for AnyObject {
    fn from(x: Value) -> Self {
        AnyObject::Value(x)
    }
}

impl From<Block> for AnyObject {
    fn from(x: Block) -> Self {
        AnyObject::Block(x)
    }
}

impl std::fmt::Display for AnyObject {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AnyObject::Inst(x) => write!(f, "{}", x),
            AnyObject::Value(x) => write!(f, "{}", x),
            AnyObject::Block(x) => write!(f, "{}", x),
        }
    }
}
