// Copyright (c) 2017-2021 Fabian Schuiki

//! Representation of linked SSIR functions.
//!
//! This module implements the `Module`, a collection of function definitions
//! and external function declarations. A module acts as the root node of an
//! intermediate representation, and is the unit of information ingested by
//! the reader and emitted by the writer.

use crate::{
    impl_table_key,
    ir::{Function, Signature},
    table::PrimaryTable,
    verifier::Verifier,
};

impl_table_key! {
    /// A function definition in a module.
    struct FuncId(u32) as "f";

    /// An external function declaration in a module.
    struct DeclId(u32) as "d";
}

/// An external function declaration.
#[derive(Debug)]
pub struct DeclData {
    /// The name of the declared function.
    pub name: String,
    /// The signature of the declared function.
    pub sig: Signature,
}

/// A module.
///
/// This is the root node of an SSIR intermediate representation. Contains
/// function definitions and declarations.
pub struct Module {
    /// The function definitions in this module.
    pub(crate) funcs: PrimaryTable<FuncId, Function>,
    /// The order of function definitions in the module.
    func_order: Vec<FuncId>,
    /// The external declarations in this module.
    pub(crate) decls: PrimaryTable<DeclId, DeclData>,
    /// The order of declarations in the module.
    decl_order: Vec<DeclId>,
}

impl std::ops::Index<FuncId> for Module {
    type Output = Function;
    fn index(&self, idx: FuncId) -> &Function {
        &self.funcs[idx]
    }
}

impl std::ops::IndexMut<FuncId> for Module {
    fn index_mut(&mut self, idx: FuncId) -> &mut Function {
        &mut self.funcs[idx]
    }
}

impl Module {
    /// Create a new empty module.
    pub fn new() -> Self {
        Self {
            funcs: PrimaryTable::new(),
            func_order: vec![],
            decls: PrimaryTable::new(),
            decl_order: vec![],
        }
    }

    /// Add a function to the module.
    pub fn add_function(&mut self, func: Function) -> FuncId {
        let id = self.funcs.add(func);
        self.func_order.push(id);
        id
    }

    /// Declare an external function.
    pub fn declare(&mut self, name: impl Into<String>, sig: Signature) -> DeclId {
        let id = self.decls.add(DeclData {
            name: name.into(),
            sig,
        });
        self.decl_order.push(id);
        id
    }

    /// Return an iterator over the function definitions in this module.
    pub fn functions<'a>(&'a self) -> impl Iterator<Item = FuncId> + 'a {
        self.func_order.iter().cloned()
    }

    /// Return an iterator over the declarations in this module.
    pub fn declarations<'a>(&'a self) -> impl Iterator<Item = (&'a str, &'a Signature)> + 'a {
        self.decl_order
            .iter()
            .map(move |&id| (self.decls[id].name.as_str(), &self.decls[id].sig))
    }

    /// Return a function in the module.
    pub fn function(&self, id: FuncId) -> &Function {
        &self.funcs[id]
    }

    /// Return a mutable function in the module.
    pub fn function_mut(&mut self, id: FuncId) -> &mut Function {
        &mut self.funcs[id]
    }

    /// Look up the signature of a symbol, definition or declaration.
    pub fn get_signature(&self, name: &str) -> Option<&Signature> {
        for id in &self.func_order {
            if self.funcs[*id].name == name {
                return Some(&self.funcs[*id].sig);
            }
        }
        for id in &self.decl_order {
            if self.decls[*id].name == name {
                return Some(&self.decls[*id].sig);
            }
        }
        None
    }

    /// Dump the module in human-readable form.
    pub fn dump(&self) -> String {
        crate::assembly::write_string(self)
    }

    /// Panic if the module is not well-formed.
    pub fn verify(&self) {
        let mut verifier = Verifier::new();
        verifier.verify_module(self);
        match verifier.finish() {
            Ok(()) => (),
            Err(errs) => {
                eprintln!();
                eprintln!("Verified module:");
                eprintln!("{}", self.dump());
                eprintln!();
                eprintln!("Verification errors:");
                eprintln!("{}", errs);
                panic!("verification failed");
            }
        }
    }
}

impl Default for Module {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.dump())
    }
}
