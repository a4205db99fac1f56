//! Construction of IR through the builder API.

use ssir::ir::prelude::*;
use ssir::{int_ty, pointer_ty, void_ty};

/// Create a `define <ty> @test(...)` function populated by a callback.
/// Useful to act as a simple container to collect instructions.
fn within_func(
    return_type: ssir::Type,
    args: Vec<ssir::Type>,
    f: impl FnOnce(&mut FunctionBuilder, Vec<Value>),
) -> Function {
    let mut sig = Signature::new();
    for arg in args {
        sig.add_arg(arg);
    }
    sig.set_return_type(return_type);
    let mut func = Function::new("test", sig);
    let arg_values: Vec<_> = func
        .sig
        .args()
        .map(|arg| func.dfg.arg_value(arg))
        .collect();
    let mut builder = FunctionBuilder::new(&mut func);
    let bb = builder.named_block("entry");
    builder.append_to(bb);
    f(&mut builder, arg_values);
    func
}

#[test]
fn build_and_dump_arithmetic() {
    let func = within_func(int_ty(32), vec![int_ty(32), int_ty(32)], |builder, args| {
        let sum = builder.ins().name("sum").add(args[0], args[1]);
        let two = builder.const_int(32, 2);
        let double = builder.ins().name("double").mul(sum, two);
        builder.ins().ret_value(double);
    });
    func.verify();
    let dump = func.dump();
    assert!(dump.contains("%sum = add i32"));
    assert!(dump.contains("%double = mul i32 %sum, 2"));
    assert!(dump.contains("ret i32 %double"));
}

#[test]
fn call_with_void() {
    let func = within_func(void_ty(), vec![], |builder, _| {
        let sig = Signature::new();
        let ext = builder.add_extern("foo", sig);
        builder.ins().call(ext, vec![]);
        builder.ins().ret();
    });
    func.verify();
    assert!(func.dump().contains("call void @foo()"));
}

#[test]
fn call_with_return_value() {
    let func = within_func(int_ty(32), vec![int_ty(32)], |builder, args| {
        let mut sig = Signature::new();
        sig.add_arg(int_ty(32));
        sig.set_return_type(int_ty(32));
        let ext = builder.add_extern("twice", sig);
        let call = builder.ins().name("r").call(ext, vec![args[0]]);
        let result = builder.dfg().inst_result(call);
        builder.ins().ret_value(result);
    });
    func.verify();
    assert!(func.dump().contains("%r = call i32 @twice(i32"));
}

#[test]
fn replace_use_rewrites_operands() {
    let mut func = within_func(int_ty(32), vec![int_ty(32), int_ty(32)], |builder, args| {
        let sum = builder.ins().name("sum").add(args[0], args[1]);
        builder.ins().ret_value(sum);
    });
    let args: Vec<_> = func.sig.args().map(|a| func.dfg.arg_value(a)).collect();
    let count = func.dfg.replace_use(args[1], args[0]);
    assert_eq!(count, 1);
    let dump = func.dump();
    assert!(dump.contains("%sum = add i32 %0, %0") || dump.contains("add i32"));
}

#[test]
fn prune_if_unused_erases_only_dead_results() {
    let mut func = within_func(int_ty(32), vec![int_ty(32)], |builder, args| {
        let dead = builder.ins().name("dead").add(args[0], args[0]);
        let live = builder.ins().name("live").add(args[0], args[0]);
        builder.ins().ret_value(live);
        let dead_inst = builder.dfg().value_inst(dead);
        assert!(builder.prune_if_unused(dead_inst));
    });
    func.verify();
    let dump = func.dump();
    assert!(!dump.contains("%dead"));
    assert!(dump.contains("%live"));
}

#[test]
fn interned_constants_are_shared() {
    let mut func = within_func(int_ty(32), vec![], |builder, _| {
        let a = builder.const_int(32, 7);
        let b = builder.const_int(32, 7);
        assert_eq!(a, b);
        let c = builder.const_int(32, 8);
        assert_ne!(a, c);
        builder.ins().ret_value(a);
    });
    let mut builder = FunctionBuilder::new(&mut func);
    let again = builder.const_int(32, 7);
    let first = builder.const_int(32, 7);
    assert_eq!(again, first);
}

#[test]
fn alloca_load_store_shapes() {
    let func = within_func(void_ty(), vec![int_ty(8)], |builder, args| {
        let slot = builder.ins().name("slot").alloca(int_ty(8));
        builder.ins().store(args[0], slot);
        let back = builder.ins().name("back").load(int_ty(8), slot);
        let sink = builder.ins().name("sink").alloca(int_ty(8));
        builder.ins().store_volatile(back, sink);
        builder.ins().ret();
    });
    func.verify();
    let dump = func.dump();
    assert!(dump.contains("%slot = alloca i8"));
    assert!(dump.contains("store i8 %0, ptr %slot"));
    assert!(dump.contains("%back = load i8, ptr %slot"));
    assert!(dump.contains("store volatile i8 %back, ptr %sink"));
}

#[test]
fn pointer_identity_is_value_identity() {
    let func = within_func(void_ty(), vec![pointer_ty()], |builder, args| {
        let a = builder.ins().name("a").load(int_ty(32), args[0]);
        let b = builder.ins().name("b").load(int_ty(32), args[0]);
        let sum = builder.ins().name("sum").add(a, b);
        let slot = builder.ins().name("slot").alloca(int_ty(32));
        builder.ins().store(sum, slot);
        builder.ins().ret();
    });
    let bb = func.layout.entry();
    let loads: Vec<_> = func
        .layout
        .insts(bb)
        .filter(|&inst| func.dfg[inst].opcode() == Opcode::Load)
        .collect();
    assert_eq!(func.dfg[loads[0]].args()[0], func.dfg[loads[1]].args()[0]);
}
