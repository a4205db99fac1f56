// Copyright (c) 2017-2021 Fabian Schuiki

//! Instruction Simplification
//!
//! This module implements per-instruction algebraic simplification and
//! constant folding. A simplification never creates an instruction: the
//! replacement is an existing operand or an interned constant value.

use crate::ir::prelude::*;
use crate::konst::{const_float, const_int, to_signed, wrap_to_width, Konst};
use crate::stats::{Statistic, Statistics};
use crate::ty::Type;
use num::{BigInt, ToPrimitive, Zero};

/// Simplify instructions in a module.
pub fn run_on_module(module: &mut Module, stats: &mut Statistics) -> bool {
    let mut modified = false;
    for func in module.functions().collect::<Vec<_>>() {
        modified |= run_on_function(&mut module[func], stats);
    }
    modified
}

/// Simplify instructions in a function.
///
/// Returns `true` if the function was modified. Uses are rewritten as the
/// scan proceeds, so a simplification can cascade within a single sweep;
/// erasure of the originals is deferred to the end of each block.
pub fn run_on_function(func: &mut Function, stats: &mut Statistics) -> bool {
    let mut modified = false;
    for bb in func.layout.blocks().collect::<Vec<_>>() {
        let mut to_erase = vec![];
        for inst in func.layout.insts(bb).collect::<Vec<_>>() {
            if let Some(replacement) = simplify_inst(func, inst) {
                let result = func.dfg.inst_result(inst);
                debug!("simplify {} to {}", inst, replacement);
                func.dfg.replace_use(result, replacement);
                to_erase.push(inst);
            }
        }
        for inst in to_erase {
            if func.layout.inst_block(inst).is_some() {
                func.erase_inst(inst);
                stats.bump(Statistic::CseSimplify);
                modified = true;
            }
        }
    }
    modified
}

/// Compute a simplified replacement value for an instruction.
///
/// Returns `None` if the instruction does not simplify. The returned value
/// is an existing operand or an interned constant; it is never the
/// instruction's own result.
pub fn simplify_inst(func: &mut Function, inst: Inst) -> Option<Value> {
    if !func.dfg.has_result(inst) {
        return None;
    }
    let result = func.dfg.inst_result(inst);
    let ty = func.dfg.value_type(result);

    let replacement = match func.dfg[inst].clone() {
        InstData::Binary { opcode, args } => simplify_binary(func, opcode, &ty, args),
        InstData::Unary {
            opcode: Opcode::Fneg,
            args,
        } => {
            let v = func.dfg.get_const(args[0])?.get_float()?;
            Some(intern_float(func, &ty, -v))
        }
        InstData::IntCompare { cond, args, .. } => simplify_icmp(func, cond, args),
        InstData::FloatCompare { cond, args, .. } => {
            let x = func.dfg.get_const(args[0])?.get_float()?;
            let y = func.dfg.get_const(args[1])?.get_float()?;
            Some(intern_bool(func, eval_fcmp(cond, x, y)))
        }
        InstData::Cast { opcode, args } => simplify_cast(func, opcode, &ty, args[0]),
        InstData::Ternary {
            opcode: Opcode::Select,
            args,
        } => {
            let [cond, x, y] = args;
            if x == y {
                Some(x)
            } else if let Some(imm) = func.dfg.get_const(cond) {
                Some(if imm.is_zero() { y } else { x })
            } else {
                None
            }
        }
        InstData::Phi { args, .. } => {
            let first = *args.first()?;
            if first != result && args.iter().all(|&a| a == first) {
                Some(first)
            } else {
                None
            }
        }
        _ => None,
    }?;

    if replacement == result {
        return None;
    }
    Some(replacement)
}

fn intern_int(func: &mut Function, ty: &Type, value: BigInt) -> Value {
    let width = ty.unwrap_int();
    func.dfg.const_value(ty.clone(), const_int(width, value))
}

fn intern_float(func: &mut Function, ty: &Type, value: f64) -> Value {
    let value = if ty.unwrap_float() == 32 {
        value as f32 as f64
    } else {
        value
    };
    func.dfg.const_value(ty.clone(), const_float(value))
}

fn intern_bool(func: &mut Function, value: bool) -> Value {
    func.dfg
        .const_value(crate::ty::int_ty(1), const_int(1, value as usize))
}

fn simplify_binary(
    func: &mut Function,
    opcode: Opcode,
    ty: &Type,
    args: [Value; 2],
) -> Option<Value> {
    if ty.is_int() {
        simplify_binary_int(func, opcode, ty, args)
    } else if ty.is_float() {
        simplify_binary_float(func, opcode, ty, args)
    } else {
        None
    }
}

fn simplify_binary_int(
    func: &mut Function,
    opcode: Opcode,
    ty: &Type,
    args: [Value; 2],
) -> Option<Value> {
    let width = ty.unwrap_int();
    let [x, y] = args;
    let cx = func.dfg.get_const(x).and_then(Konst::get_int).cloned();
    let cy = func.dfg.get_const(y).and_then(Konst::get_int).cloned();

    // Fold when both operands are constant.
    if let (Some(a), Some(b)) = (&cx, &cy) {
        if let Some(value) = eval_binary_int(opcode, width, a, b) {
            return Some(intern_int(func, ty, value));
        }
    }

    let x_zero = cx.as_ref().map(Zero::is_zero).unwrap_or(false);
    let y_zero = cy.as_ref().map(Zero::is_zero).unwrap_or(false);
    let x_one = cx.as_ref().map(|v| *v == BigInt::from(1)).unwrap_or(false);
    let y_one = cy.as_ref().map(|v| *v == BigInt::from(1)).unwrap_or(false);

    match opcode {
        Opcode::Add if x_zero => Some(y),
        Opcode::Add if y_zero => Some(x),
        Opcode::Sub if y_zero => Some(x),
        Opcode::Sub if x == y => Some(intern_int(func, ty, BigInt::zero())),
        Opcode::Mul if x_one => Some(y),
        Opcode::Mul if y_one => Some(x),
        Opcode::Mul if x_zero || y_zero => Some(intern_int(func, ty, BigInt::zero())),
        Opcode::Udiv | Opcode::Sdiv if y_one => Some(x),
        Opcode::Urem | Opcode::Srem if y_one => {
            Some(intern_int(func, ty, BigInt::zero()))
        }
        Opcode::Urem | Opcode::Srem if x == y && !y_zero => {
            Some(intern_int(func, ty, BigInt::zero()))
        }
        Opcode::And if x == y => Some(x),
        Opcode::And if x_zero || y_zero => Some(intern_int(func, ty, BigInt::zero())),
        Opcode::Or if x == y => Some(x),
        Opcode::Or if x_zero => Some(y),
        Opcode::Or if y_zero => Some(x),
        Opcode::Xor if x == y => Some(intern_int(func, ty, BigInt::zero())),
        Opcode::Xor if x_zero => Some(y),
        Opcode::Xor if y_zero => Some(x),
        Opcode::Shl | Opcode::Lshr | Opcode::Ashr if y_zero => Some(x),
        _ => None,
    }
}

fn eval_binary_int(opcode: Opcode, width: usize, a: &BigInt, b: &BigInt) -> Option<BigInt> {
    let sa = to_signed(a, width);
    let sb = to_signed(b, width);
    let value = match opcode {
        Opcode::Add => a + b,
        Opcode::Sub => a - b,
        Opcode::Mul => a * b,
        Opcode::Udiv => {
            if b.is_zero() {
                return None;
            }
            a / b
        }
        Opcode::Sdiv => {
            if b.is_zero() {
                return None;
            }
            &sa / &sb
        }
        Opcode::Urem => {
            if b.is_zero() {
                return None;
            }
            a % b
        }
        Opcode::Srem => {
            if b.is_zero() {
                return None;
            }
            &sa % &sb
        }
        Opcode::And => a & b,
        Opcode::Or => a | b,
        Opcode::Xor => a ^ b,
        Opcode::Shl => {
            let shift = b.to_usize()?;
            if shift >= width {
                return None;
            }
            a << shift
        }
        Opcode::Lshr => {
            let shift = b.to_usize()?;
            if shift >= width {
                return None;
            }
            a >> shift
        }
        Opcode::Ashr => {
            let shift = b.to_usize()?;
            if shift >= width {
                return None;
            }
            &sa >> shift
        }
        _ => return None,
    };
    Some(wrap_to_width(value, width))
}

fn simplify_binary_float(
    func: &mut Function,
    opcode: Opcode,
    ty: &Type,
    args: [Value; 2],
) -> Option<Value> {
    // Only fold fully-constant float expressions. Identities like `x + 0.0`
    // change the result for NaN and signed zeros.
    let x = func.dfg.get_const(args[0])?.get_float()?;
    let y = func.dfg.get_const(args[1])?.get_float()?;
    let value = match opcode {
        Opcode::Fadd => x + y,
        Opcode::Fsub => x - y,
        Opcode::Fmul => x * y,
        Opcode::Fdiv => x / y,
        Opcode::Frem => x % y,
        _ => return None,
    };
    Some(intern_float(func, ty, value))
}

fn simplify_icmp(func: &mut Function, cond: IntCond, args: [Value; 2]) -> Option<Value> {
    let [x, y] = args;
    if x == y {
        let value = matches!(
            cond,
            IntCond::Eq | IntCond::Ule | IntCond::Uge | IntCond::Sle | IntCond::Sge
        );
        return Some(intern_bool(func, value));
    }
    let ty = func.dfg.value_type(x);
    if !ty.is_int() {
        return None;
    }
    let width = ty.unwrap_int();
    let a = func.dfg.get_const(x).and_then(Konst::get_int)?.clone();
    let b = func.dfg.get_const(y).and_then(Konst::get_int)?.clone();
    let sa = to_signed(&a, width);
    let sb = to_signed(&b, width);
    let value = match cond {
        IntCond::Eq => a == b,
        IntCond::Ne => a != b,
        IntCond::Ult => a < b,
        IntCond::Ugt => a > b,
        IntCond::Ule => a <= b,
        IntCond::Uge => a >= b,
        IntCond::Slt => sa < sb,
        IntCond::Sgt => sa > sb,
        IntCond::Sle => sa <= sb,
        IntCond::Sge => sa >= sb,
    };
    Some(intern_bool(func, value))
}

fn eval_fcmp(cond: FloatCond, x: f64, y: f64) -> bool {
    let unordered = x.is_nan() || y.is_nan();
    match cond {
        FloatCond::Oeq => !unordered && x == y,
        FloatCond::Ogt => !unordered && x > y,
        FloatCond::Oge => !unordered && x >= y,
        FloatCond::Olt => !unordered && x < y,
        FloatCond::Ole => !unordered && x <= y,
        FloatCond::One => !unordered && x != y,
        FloatCond::Ord => !unordered,
        FloatCond::Ueq => unordered || x == y,
        FloatCond::Ugt => unordered || x > y,
        FloatCond::Uge => unordered || x >= y,
        FloatCond::Ult => unordered || x < y,
        FloatCond::Ule => unordered || x <= y,
        FloatCond::Une => unordered || x != y,
        FloatCond::Uno => unordered,
    }
}

fn simplify_cast(func: &mut Function, opcode: Opcode, ty: &Type, arg: Value) -> Option<Value> {
    let from_ty = func.dfg.value_type(arg);
    let imm = func.dfg.get_const(arg)?.clone();
    match opcode {
        Opcode::Trunc | Opcode::Zext => {
            let value = imm.get_int()?.clone();
            Some(intern_int(func, ty, value))
        }
        Opcode::Sext => {
            let value = to_signed(imm.get_int()?, from_ty.unwrap_int());
            Some(intern_int(func, ty, value))
        }
        Opcode::Bitcast if *ty == from_ty => {
            Some(func.dfg.const_value(ty.clone(), imm))
        }
        Opcode::Fptrunc | Opcode::Fpext => {
            let value = imm.get_float()?;
            Some(intern_float(func, ty, value))
        }
        Opcode::Fptoui => {
            let value = imm.get_float()?;
            if !value.is_finite() || value.is_sign_negative() {
                return None;
            }
            let int = BigInt::from(value.trunc() as u64);
            Some(intern_int(func, ty, int))
        }
        Opcode::Fptosi => {
            let value = imm.get_float()?;
            if !value.is_finite() {
                return None;
            }
            let int = BigInt::from(value.trunc() as i64);
            Some(intern_int(func, ty, int))
        }
        Opcode::Uitofp => {
            let value = imm.get_int()?.to_f64()?;
            Some(intern_float(func, ty, value))
        }
        Opcode::Sitofp => {
            let value = to_signed(imm.get_int()?, from_ty.unwrap_int()).to_f64()?;
            Some(intern_float(func, ty, value))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::int_ty;

    fn test_func() -> (Function, Value) {
        let mut sig = Signature::new();
        sig.add_arg(int_ty(32));
        sig.set_return_type(int_ty(32));
        let func = Function::new("test", sig);
        let arg = func.sig.args().next().unwrap();
        let x = func.dfg.arg_value(arg);
        (func, x)
    }

    fn simplified(func: &mut Function, inst: Inst) -> Option<Value> {
        simplify_inst(func, inst)
    }

    #[test]
    fn add_zero_returns_operand() {
        let (mut func, x) = test_func();
        let mut builder = FunctionBuilder::new(&mut func);
        let bb = builder.block();
        builder.append_to(bb);
        let zero = builder.const_int(32, 0);
        let sum = builder.ins().add(x, zero);
        builder.ins().ret_value(sum);
        let inst = func.dfg.value_inst(sum);
        assert_eq!(simplified(&mut func, inst), Some(x));
    }

    #[test]
    fn constants_fold_with_wrapping() {
        let (mut func, _) = test_func();
        let mut builder = FunctionBuilder::new(&mut func);
        let bb = builder.block();
        builder.append_to(bb);
        let a = builder.const_int(8, 200);
        let b = builder.const_int(8, 100);
        let sum = builder.ins().add(a, b);
        builder.ins().ret_value(sum);
        let inst = func.dfg.value_inst(sum);
        let folded = simplified(&mut func, inst).unwrap();
        assert_eq!(
            func.dfg.get_const(folded),
            Some(&const_int(8, 44)) // 300 mod 256
        );
    }

    #[test]
    fn division_by_zero_does_not_fold() {
        let (mut func, _) = test_func();
        let mut builder = FunctionBuilder::new(&mut func);
        let bb = builder.block();
        builder.append_to(bb);
        let a = builder.const_int(32, 7);
        let b = builder.const_int(32, 0);
        let div = builder.ins().udiv(a, b);
        builder.ins().ret_value(div);
        let inst = func.dfg.value_inst(div);
        assert_eq!(simplified(&mut func, inst), None);
    }

    #[test]
    fn sub_self_folds_to_zero() {
        let (mut func, x) = test_func();
        let mut builder = FunctionBuilder::new(&mut func);
        let bb = builder.block();
        builder.append_to(bb);
        let diff = builder.ins().sub(x, x);
        builder.ins().ret_value(diff);
        let inst = func.dfg.value_inst(diff);
        let folded = simplified(&mut func, inst).unwrap();
        assert_eq!(func.dfg.get_const(folded), Some(&const_int(32, 0)));
    }

    #[test]
    fn icmp_on_equal_operands() {
        let (mut func, x) = test_func();
        let mut builder = FunctionBuilder::new(&mut func);
        let bb = builder.block();
        builder.append_to(bb);
        let eq = builder.ins().icmp(IntCond::Eq, x, x);
        let lt = builder.ins().icmp(IntCond::Ult, x, x);
        builder.ins().ret_value(x);
        let eq_inst = func.dfg.value_inst(eq);
        let lt_inst = func.dfg.value_inst(lt);
        let t = simplified(&mut func, eq_inst).unwrap();
        assert_eq!(func.dfg.get_const(t), Some(&const_int(1, 1)));
        let f = simplified(&mut func, lt_inst).unwrap();
        assert_eq!(func.dfg.get_const(f), Some(&const_int(1, 0)));
    }

    #[test]
    fn float_identities_are_left_alone() {
        let mut sig = Signature::new();
        sig.add_arg(crate::ty::float_ty(64));
        sig.set_return_type(crate::ty::float_ty(64));
        let mut func = Function::new("fid", sig);
        let arg = func.sig.args().next().unwrap();
        let x = func.dfg.arg_value(arg);
        let mut builder = FunctionBuilder::new(&mut func);
        let bb = builder.block();
        builder.append_to(bb);
        let zero = builder.const_float(64, 0.0);
        let sum = builder.ins().fadd(x, zero);
        builder.ins().ret_value(sum);
        let inst = func.dfg.value_inst(sum);
        assert_eq!(simplify_inst(&mut func, inst), None);
    }
}
