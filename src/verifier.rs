// Copyright (c) 2017-2021 Fabian Schuiki

//! Verification of IR integrity.
//!
//! This module implements verification of the intermediate representation.
//! It checks that functions are well-formed, basic blocks have terminators,
//! and types line up.

use crate::ir::*;
use std::{
    fmt::Display,
    ops::{Deref, DerefMut},
};

/// An IR verifier.
///
/// The `Verifier` acts as a context to call the various IR checking functions
/// on. It keeps track of errors.
#[derive(Default)]
pub struct Verifier {
    errors: VerifierErrors,
    unit: Option<String>,
}

impl Verifier {
    /// Create a new verifier.
    pub fn new() -> Self {
        Default::default()
    }

    /// Verify the integrity of a `Module`.
    pub fn verify_module(&mut self, module: &Module) {
        for func in module.functions() {
            self.verify_function(&module[func]);
        }
    }

    /// Verify the integrity of a `Function`.
    pub fn verify_function(&mut self, func: &Function) {
        self.unit = Some(format!("func @{}", func.name));
        self.verify_function_layout(func);
        self.unit = None;
    }

    /// Verify the integrity of the BB and instruction layout.
    fn verify_function_layout(&mut self, func: &Function) {
        if func.layout.first_block().is_none() {
            self.push(None, "layout has no entry block".to_string());
        }
        for bb in func.layout.blocks() {
            // Check that the block has at least one instruction.
            if func.layout.first_inst(bb).is_none() {
                self.push(Some(bb.into()), "block is empty".to_string());
            }

            let mut seen_non_phi = false;
            for inst in func.layout.insts(bb) {
                let opcode = func.dfg[inst].opcode();

                // Check that phi nodes are grouped at the beginning of the
                // block.
                if opcode.is_phi() && seen_non_phi {
                    self.push(
                        Some(inst.into()),
                        format!("phi node must precede all other instructions in {}", bb),
                    );
                }
                seen_non_phi |= !opcode.is_phi();

                // Check that there are no terminator instructions in the
                // middle of the block.
                if opcode.is_terminator() && Some(inst) != func.layout.last_inst(bb) {
                    self.push(
                        Some(inst.into()),
                        format!(
                            "terminator instruction `{}` must be at the end of block {}",
                            opcode, bb
                        ),
                    );
                }

                // Check that the last instruction in the block is a
                // terminator.
                if Some(inst) == func.layout.last_inst(bb) && !opcode.is_terminator() {
                    self.push(
                        Some(bb.into()),
                        format!("last instruction `{}` must be a terminator", opcode),
                    );
                }

                self.verify_inst(func, inst);
            }
        }
    }

    /// Verify the integrity of a single instruction.
    fn verify_inst(&mut self, func: &Function, inst: Inst) {
        let dfg = &func.dfg;
        let data = &dfg[inst];

        for &arg in data.args() {
            if dfg[arg].is_placeholder() {
                self.push(
                    Some(inst.into()),
                    format!("operand {} is an unresolved placeholder", arg),
                );
            }
        }

        match data {
            InstData::Binary { args, .. } => {
                let ty0 = dfg.value_type(args[0]);
                let ty1 = dfg.value_type(args[1]);
                if data.opcode() != Opcode::ExtractElement && ty0 != ty1 {
                    self.push(
                        Some(inst.into()),
                        format!("operand types `{}` and `{}` do not match", ty0, ty1),
                    );
                }
            }
            InstData::IntCompare { args, .. } | InstData::FloatCompare { args, .. } => {
                let ty0 = dfg.value_type(args[0]);
                let ty1 = dfg.value_type(args[1]);
                if ty0 != ty1 {
                    self.push(
                        Some(inst.into()),
                        format!("compared types `{}` and `{}` do not match", ty0, ty1),
                    );
                }
            }
            InstData::Load { args, .. } => {
                if !dfg.value_type(args[0]).is_pointer() {
                    self.push(
                        Some(inst.into()),
                        "load address must have pointer type".to_string(),
                    );
                }
            }
            InstData::Store { args, .. } => {
                if !dfg.value_type(args[1]).is_pointer() {
                    self.push(
                        Some(inst.into()),
                        "store address must have pointer type".to_string(),
                    );
                }
            }
            InstData::Phi { args, bbs, .. } => {
                if args.len() != bbs.len() || args.is_empty() {
                    self.push(
                        Some(inst.into()),
                        "phi node must have matching, non-empty value and block lists"
                            .to_string(),
                    );
                }
                let ty = dfg.inst_type(inst);
                for &arg in args {
                    if dfg.value_type(arg) != ty {
                        self.push(
                            Some(inst.into()),
                            format!("phi operand {} must have type `{}`", arg, ty),
                        );
                    }
                }
                for &bb in bbs {
                    if !func.layout.is_block_inserted(bb) {
                        self.push(
                            Some(inst.into()),
                            format!("phi references removed block {}", bb),
                        );
                    }
                }
            }
            InstData::Branch { args, .. } => {
                let ty = dfg.value_type(args[0]);
                if !ty.is_int() || ty.unwrap_int() != 1 {
                    self.push(
                        Some(inst.into()),
                        format!("branch condition must be i1, got `{}`", ty),
                    );
                }
            }
            InstData::Call { callee, args, .. } => {
                let sig = &dfg[*callee].sig;
                if args.len() != sig.num_args() {
                    self.push(
                        Some(inst.into()),
                        format!(
                            "call to @{} has {} arguments, expected {}",
                            dfg[*callee].name,
                            args.len(),
                            sig.num_args()
                        ),
                    );
                }
            }
            InstData::Nullary { .. } if data.opcode() == Opcode::Ret => {
                if func.sig.has_return_value() {
                    self.push(
                        Some(inst.into()),
                        format!("ret must return a value of type `{}`", func.sig.return_type()),
                    );
                }
            }
            InstData::Unary { args, .. } if data.opcode() == Opcode::Ret => {
                let ty = dfg.value_type(args[0]);
                if ty != func.sig.return_type() {
                    self.push(
                        Some(inst.into()),
                        format!(
                            "ret value type `{}` does not match signature return type `{}`",
                            ty,
                            func.sig.return_type()
                        ),
                    );
                }
            }
            _ => (),
        }

        // Check that block references point at blocks that are still laid
        // out.
        if !matches!(data, InstData::Phi { .. }) {
            for &bb in data.blocks() {
                if !func.layout.is_block_inserted(bb) {
                    self.push(
                        Some(inst.into()),
                        format!("branch references removed block {}", bb),
                    );
                }
            }
        }
    }

    fn push(&mut self, object: Option<AnyObject>, message: String) {
        self.errors.push(VerifierError {
            unit: self.unit.clone(),
            object,
            message,
        });
    }

    /// Finish verification and return the result.
    ///
    /// Consumes the verifier.
    pub fn finish(self) -> Result<(), VerifierErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// A verification error.
#[derive(Debug)]
pub struct VerifierError {
    /// The unit within which the error occurred.
    pub unit: Option<String>,
    /// The object which caused the error.
    pub object: Option<AnyObject>,
    /// The error message.
    pub message: String,
}

impl Display for VerifierError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if let Some(ref unit) = self.unit {
            write!(f, "{}: ", unit)?;
        }
        if let Some(object) = self.object {
            write!(f, "{}: ", object)?;
        }
        write!(f, "{}", self.message)?;
        Ok(())
    }
}

/// A list of verification errors.
#[derive(Debug, Default)]
pub struct VerifierErrors(pub Vec<VerifierError>);

impl Deref for VerifierErrors {
    type Target = Vec<VerifierError>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for VerifierErrors {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Display for VerifierErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for err in self.iter() {
            writeln!(f, "- {}", err)?;
        }
        Ok(())
    }
}
