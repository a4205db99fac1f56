//! Promotion of allocas to SSA registers.

use ssir::assembly::parse_module;
use ssir::ir::{InstData, Module, Opcode};
use ssir::pass::mem2reg;

fn promoted(input: &str) -> Module {
    let mut module = parse_module(input).unwrap();
    mem2reg::run_on_module(&mut module);
    module.verify();
    module
}

fn count_opcode(module: &Module, opcode: Opcode) -> usize {
    let mut count = 0;
    for func in module.functions() {
        let func = &module[func];
        for bb in func.layout.blocks() {
            count += func
                .layout
                .insts(bb)
                .filter(|&inst| func.dfg[inst].opcode() == opcode)
                .count();
        }
    }
    count
}

#[test]
fn straight_line_promotion() {
    let module = promoted(
        r#"
        define i32 @f(i32 %x) {
        entry:
          %m = alloca i32
          store i32 %x, ptr %m
          %v = load i32, ptr %m
          ret i32 %v
        }
        "#,
    );
    assert_eq!(count_opcode(&module, Opcode::Alloca), 0);
    assert_eq!(count_opcode(&module, Opcode::Load), 0);
    assert_eq!(count_opcode(&module, Opcode::Store), 0);
    // The return reads the stored value directly.
    let func = &module[module.functions().next().unwrap()];
    let bb = func.layout.entry();
    let ret = func.layout.terminator(bb);
    let operand = func.dfg[ret].args()[0];
    assert_eq!(func.dfg.get_name(operand), Some("x"));
}

#[test]
fn diamond_inserts_a_phi() {
    let module = promoted(
        r#"
        define i32 @f(i1 %c, i32 %a, i32 %b) {
        entry:
          %m = alloca i32
          br i1 %c, label %then, label %else
        then:
          store i32 %a, ptr %m
          br label %exit
        else:
          store i32 %b, ptr %m
          br label %exit
        exit:
          %v = load i32, ptr %m
          ret i32 %v
        }
        "#,
    );
    assert_eq!(count_opcode(&module, Opcode::Alloca), 0);
    assert_eq!(count_opcode(&module, Opcode::Load), 0);
    assert_eq!(count_opcode(&module, Opcode::Store), 0);
    assert_eq!(count_opcode(&module, Opcode::Phi), 1);

    // The phi merges both stored values and feeds the return.
    let func = &module[module.functions().next().unwrap()];
    let exit = func.layout.blocks().last().unwrap();
    let phi = func.layout.first_inst(exit).unwrap();
    let (args, bbs) = match &func.dfg[phi] {
        InstData::Phi { args, bbs, .. } => (args.clone(), bbs.clone()),
        other => panic!("expected a phi at the head of exit, got {:?}", other),
    };
    assert_eq!(args.len(), 2);
    assert_eq!(bbs.len(), 2);
    let names: Vec<_> = args
        .iter()
        .map(|&v| func.dfg.get_name(v).unwrap().to_string())
        .collect();
    assert!(names.contains(&"a".to_string()));
    assert!(names.contains(&"b".to_string()));
    let ret = func.layout.terminator(exit);
    assert_eq!(func.dfg[ret].args()[0], func.dfg.inst_result(phi));
}

#[test]
fn loop_promotion_keeps_the_function_well_formed() {
    let module = promoted(
        r#"
        define i32 @sum(i32 %n) {
        entry:
          %acc = alloca i32
          %i = alloca i32
          store i32 0, ptr %acc
          store i32 0, ptr %i
          br label %head
        head:
          %iv = load i32, ptr %i
          %done = icmp uge i32 %iv, %n
          br i1 %done, label %exit, label %body
        body:
          %cur = load i32, ptr %acc
          %next = add i32 %cur, %iv
          store i32 %next, ptr %acc
          %inc = add i32 %iv, 1
          store i32 %inc, ptr %i
          br label %head
        exit:
          %out = load i32, ptr %acc
          ret i32 %out
        }
        "#,
    );
    assert_eq!(count_opcode(&module, Opcode::Alloca), 0);
    assert_eq!(count_opcode(&module, Opcode::Load), 0);
    assert_eq!(count_opcode(&module, Opcode::Store), 0);
    // Both variables need a merge point at the loop header.
    assert_eq!(count_opcode(&module, Opcode::Phi), 2);
}

#[test]
fn escaping_alloca_is_not_promoted() {
    let module = promoted(
        r#"
        declare void @sink(ptr)
        define i32 @f() {
        entry:
          %m = alloca i32
          call void @sink(ptr %m)
          %v = load i32, ptr %m
          ret i32 %v
        }
        "#,
    );
    assert_eq!(count_opcode(&module, Opcode::Alloca), 1);
    assert_eq!(count_opcode(&module, Opcode::Load), 1);
}

#[test]
fn volatile_access_blocks_promotion() {
    let module = promoted(
        r#"
        define i32 @f(i32 %x) {
        entry:
          %m = alloca i32
          store volatile i32 %x, ptr %m
          %v = load i32, ptr %m
          ret i32 %v
        }
        "#,
    );
    assert_eq!(count_opcode(&module, Opcode::Alloca), 1);
    assert_eq!(count_opcode(&module, Opcode::Store), 1);
    assert_eq!(count_opcode(&module, Opcode::Load), 1);
}

#[test]
fn mismatched_access_type_blocks_promotion() {
    let module = promoted(
        r#"
        define i16 @f(i32 %x) {
        entry:
          %m = alloca i32
          store i32 %x, ptr %m
          %v = load i16, ptr %m
          ret i16 %v
        }
        "#,
    );
    assert_eq!(count_opcode(&module, Opcode::Alloca), 1);
}
