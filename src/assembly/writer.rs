// Copyright (c) 2017-2021 Fabian Schuiki

//! Emission of a module as human-readable assembly.

use crate::{
    ir::{Block, Function, Inst, InstData, Module, Value, ValueData},
    ty::Type,
};
use std::collections::{HashMap, HashSet};
use std::io::{Result, Write};

/// Emits a module as human-readable assembly code that can be parsed again
/// later.
pub struct Writer<'a, W: Write> {
    sink: &'a mut W,
}

impl<'a, W: Write> Writer<'a, W> {
    /// Create a new assembly writer that will emit code into the provided
    /// sink.
    pub fn new(sink: &'a mut W) -> Self {
        Self { sink }
    }

    /// Emit assembly for a module.
    pub fn write_module(&mut self, module: &Module) -> Result<()> {
        let mut newline = false;
        for (name, sig) in module.declarations() {
            newline = true;
            write!(self.sink, "declare {} @{}(", sig.return_type(), name)?;
            let mut first = true;
            for arg in sig.args() {
                if !first {
                    write!(self.sink, ", ")?;
                }
                first = false;
                write!(self.sink, "{}", sig.arg_type(arg))?;
            }
            writeln!(self.sink, ")")?;
        }
        for func in module.functions() {
            if newline {
                writeln!(self.sink)?;
            }
            newline = true;
            self.write_function(&module[func])?;
        }
        Ok(())
    }

    /// Emit assembly for a function.
    pub fn write_function(&mut self, func: &Function) -> Result<()> {
        let names = Names::assign(func);

        write!(self.sink, "define {} @{}(", func.sig.return_type(), func.name)?;
        let mut first = true;
        for arg in func.sig.args() {
            if !first {
                write!(self.sink, ", ")?;
            }
            first = false;
            let value = func.dfg.arg_value(arg);
            write!(
                self.sink,
                "{} {}",
                func.sig.arg_type(arg),
                names.value(value)
            )?;
        }
        writeln!(self.sink, ") {{")?;

        for bb in func.layout.blocks() {
            writeln!(self.sink, "{}:", names.block_label(bb))?;
            for inst in func.layout.insts(bb) {
                write!(self.sink, "  ")?;
                self.write_inst(func, &names, inst)?;
                writeln!(self.sink)?;
            }
        }
        writeln!(self.sink, "}}")?;
        Ok(())
    }

    fn write_inst(&mut self, func: &Function, names: &Names, inst: Inst) -> Result<()> {
        let dfg = &func.dfg;
        if dfg.has_result(inst) {
            write!(self.sink, "{} = ", names.value(dfg.inst_result(inst)))?;
        }
        let data = &dfg[inst];
        let opcode = data.opcode();
        let ty_of = |value: Value| -> Type { dfg.value_type(value) };
        match data {
            InstData::Nullary { .. } => match opcode {
                crate::ir::Opcode::Ret => write!(self.sink, "ret void")?,
                _ => write!(self.sink, "{}", opcode)?,
            },
            InstData::Unary { args, .. } => write!(
                self.sink,
                "{} {} {}",
                opcode,
                ty_of(args[0]),
                names.value(args[0])
            )?,
            InstData::Binary { args, .. } => write!(
                self.sink,
                "{} {} {}, {}",
                opcode,
                ty_of(args[0]),
                names.value(args[0]),
                if opcode == crate::ir::Opcode::ExtractElement {
                    format!("{} {}", ty_of(args[1]), names.value(args[1]))
                } else {
                    names.value(args[1])
                }
            )?,
            InstData::Ternary { args, .. } => write!(
                self.sink,
                "{} {} {}, {} {}, {} {}",
                opcode,
                ty_of(args[0]),
                names.value(args[0]),
                ty_of(args[1]),
                names.value(args[1]),
                ty_of(args[2]),
                names.value(args[2])
            )?,
            InstData::Cast { args, .. } => write!(
                self.sink,
                "{} {} {} to {}",
                opcode,
                ty_of(args[0]),
                names.value(args[0]),
                dfg.inst_type(inst)
            )?,
            InstData::IntCompare { cond, args, .. } => write!(
                self.sink,
                "icmp {} {} {}, {}",
                cond,
                ty_of(args[0]),
                names.value(args[0]),
                names.value(args[1])
            )?,
            InstData::FloatCompare { cond, args, .. } => write!(
                self.sink,
                "fcmp {} {} {}, {}",
                cond,
                ty_of(args[0]),
                names.value(args[0]),
                names.value(args[1])
            )?,
            InstData::Aggregate { args, imms, .. } => {
                write!(
                    self.sink,
                    "{} {} {}",
                    opcode,
                    ty_of(args[0]),
                    names.value(args[0])
                )?;
                if args.len() > 1 {
                    write!(self.sink, ", {} {}", ty_of(args[1]), names.value(args[1]))?;
                }
                for imm in imms {
                    write!(self.sink, ", {}", imm)?;
                }
            }
            InstData::Gep { ty, args, .. } => {
                write!(
                    self.sink,
                    "getelementptr {}, {} {}",
                    ty,
                    ty_of(args[0]),
                    names.value(args[0])
                )?;
                for &arg in &args[1..] {
                    write!(self.sink, ", {} {}", ty_of(arg), names.value(arg))?;
                }
            }
            InstData::Alloca { ty, .. } => write!(self.sink, "alloca {}", ty)?,
            InstData::Load { args, volatile, .. } => write!(
                self.sink,
                "load {}{}, {} {}",
                if *volatile { "volatile " } else { "" },
                dfg.inst_type(inst),
                ty_of(args[0]),
                names.value(args[0])
            )?,
            InstData::Store { args, volatile, .. } => write!(
                self.sink,
                "store {}{} {}, {} {}",
                if *volatile { "volatile " } else { "" },
                ty_of(args[0]),
                names.value(args[0]),
                ty_of(args[1]),
                names.value(args[1])
            )?,
            InstData::Call { callee, args, .. } => {
                let data = &dfg[*callee];
                write!(
                    self.sink,
                    "call {} @{}(",
                    data.sig.return_type(),
                    data.name
                )?;
                let mut first = true;
                for &arg in args {
                    if !first {
                        write!(self.sink, ", ")?;
                    }
                    first = false;
                    write!(self.sink, "{} {}", ty_of(arg), names.value(arg))?;
                }
                write!(self.sink, ")")?;
            }
            InstData::Phi { args, bbs, .. } => {
                write!(self.sink, "phi {} ", dfg.inst_type(inst))?;
                let mut first = true;
                for (&arg, &bb) in args.iter().zip(bbs.iter()) {
                    if !first {
                        write!(self.sink, ", ")?;
                    }
                    first = false;
                    write!(
                        self.sink,
                        "[ {}, %{} ]",
                        names.value(arg),
                        names.block_label(bb)
                    )?;
                }
            }
            InstData::Jump { bbs, .. } => {
                write!(self.sink, "br label %{}", names.block_label(bbs[0]))?
            }
            InstData::Branch { args, bbs, .. } => write!(
                self.sink,
                "br {} {}, label %{}, label %{}",
                ty_of(args[0]),
                names.value(args[0]),
                names.block_label(bbs[0]),
                names.block_label(bbs[1])
            )?,
        }
        Ok(())
    }
}

/// Uniquified names assigned to the values and blocks of one function.
struct Names {
    values: HashMap<Value, String>,
    blocks: HashMap<Block, String>,
    consts: HashMap<Value, String>,
}

impl Names {
    fn assign(func: &Function) -> Self {
        let mut taken = HashSet::new();
        let mut values = HashMap::new();
        let mut blocks = HashMap::new();
        let mut consts = HashMap::new();
        let mut counter = 0usize;

        for (value, data) in func.dfg.values.iter() {
            if let ValueData::Const { imm, .. } = data {
                consts.insert(value, format!("{}", imm));
            }
            if let Some(name) = func.dfg.get_name(value) {
                taken.insert(name.to_string());
            }
        }
        for bb in func.layout.blocks() {
            if let Some(name) = func.cfg.get_name(bb) {
                taken.insert(name.to_string());
            }
        }

        let mut fresh = |taken: &mut HashSet<String>| loop {
            let candidate = counter.to_string();
            counter += 1;
            if taken.insert(candidate.clone()) {
                break candidate;
            }
        };

        for arg in func.sig.args() {
            let value = func.dfg.arg_value(arg);
            let name = match func.dfg.get_name(value) {
                Some(name) => name.to_string(),
                None => fresh(&mut taken),
            };
            values.insert(value, name);
        }
        for bb in func.layout.blocks() {
            let name = match func.cfg.get_name(bb) {
                Some(name) => name.to_string(),
                None => fresh(&mut taken),
            };
            blocks.insert(bb, name);
            for inst in func.layout.insts(bb) {
                if func.dfg.has_result(inst) {
                    let value = func.dfg.inst_result(inst);
                    let name = match func.dfg.get_name(value) {
                        Some(name) => name.to_string(),
                        None => fresh(&mut taken),
                    };
                    values.insert(value, name);
                }
            }
        }

        Self {
            values,
            blocks,
            consts,
        }
    }

    /// Render a value operand: `%name` for named values, the literal for
    /// constants.
    fn value(&self, value: Value) -> String {
        if let Some(text) = self.consts.get(&value) {
            return text.clone();
        }
        match self.values.get(&value) {
            Some(name) => format!("%{}", name),
            None => format!("%<{}>", value),
        }
    }

    /// Render a block label, without the leading `%`.
    fn block_label(&self, bb: Block) -> String {
        match self.blocks.get(&bb) {
            Some(name) => name.clone(),
            None => format!("<{}>", bb),
        }
    }
}

/// Emit assembly for a module.
pub fn write_module(sink: &mut impl Write, module: &Module) -> Result<()> {
    Writer::new(sink).write_module(module)
}

/// Emit assembly for a module as a string.
pub fn write_string(module: &Module) -> String {
    let mut asm = vec![];
    write_module(&mut asm, module).expect("writing to a vector cannot fail");
    String::from_utf8(asm).expect("writer should emit proper utf8")
}

/// Emit assembly for a single function as a string.
pub fn write_function_string(func: &Function) -> String {
    let mut asm = vec![];
    Writer::new(&mut asm)
        .write_function(func)
        .expect("writing to a vector cannot fail");
    String::from_utf8(asm).expect("writer should emit proper utf8")
}
