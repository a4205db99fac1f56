// Copyright (c) 2017-2021 Fabian Schuiki

//! Facilities to emit a module as human-readable assembly, or to parse such
//! assembly back into a module.

mod lexer;
mod reader;
mod writer;

pub use self::lexer::{Loc, ParseError};
pub use self::reader::parse_module;
pub use self::writer::{write_function_string, write_module, write_string, Writer};
