// Copyright (c) 2017-2021 Fabian Schuiki

//! A strongly-typed, SSA-based low-level intermediate representation, and a
//! local optimizer over it. This library provides tools to create, modify,
//! store, and load SSIR modules, and the `ssir-opt` binary that drives the
//! optimization pipeline over serialized modules.

#[macro_use]
extern crate log;

pub mod analysis;
pub mod assembly;
pub mod ir;
mod konst;
pub mod pass;
pub mod stats;
pub mod table;
mod ty;
pub mod util;
pub mod verifier;

pub use crate::{konst::*, ty::*};
