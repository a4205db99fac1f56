// Copyright (c) 2017-2021 Fabian Schuiki

//! Representation of function signatures.

use crate::{
    ir::Arg,
    table::TableKey,
    ty::{void_ty, Type},
    util::write_implode,
};

/// A function signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    args: Vec<Type>,
    ret: Type,
}

impl Signature {
    /// Create a new signature with no arguments and a `void` return type.
    pub fn new() -> Self {
        Self {
            args: vec![],
            ret: void_ty(),
        }
    }

    /// Add an argument of the given type.
    pub fn add_arg(&mut self, ty: Type) -> Arg {
        self.args.push(ty);
        Arg::new(self.args.len() - 1)
    }

    /// Set the return type.
    pub fn set_return_type(&mut self, ty: Type) {
        self.ret = ty;
    }

    /// Get the return type.
    pub fn return_type(&self) -> Type {
        self.ret.clone()
    }

    /// Check whether the function returns a value.
    pub fn has_return_value(&self) -> bool {
        !self.ret.is_void()
    }

    /// Return an iterator over the arguments.
    pub fn args(&self) -> impl Iterator<Item = Arg> {
        (0..self.args.len()).map(Arg::new)
    }

    /// Get the number of arguments.
    pub fn num_args(&self) -> usize {
        self.args.len()
    }

    /// Get the type of an argument.
    pub fn arg_type(&self, arg: Arg) -> Type {
        self.args[arg.index()].clone()
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "(")?;
        write_implode(f, ", ", self.args.iter())?;
        write!(f, ") {}", self.ret)?;
        Ok(())
    }
}
