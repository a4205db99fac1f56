//! End-to-end scenarios for the optimization pipeline.

use ssir::assembly::parse_module;
use ssir::ir::{InstData, Module, Opcode};
use ssir::pass;
use ssir::stats::{Statistic, Statistics};

fn optimized(input: &str) -> (Module, Statistics) {
    let mut module = parse_module(input).unwrap();
    let mut stats = Statistics::new();
    pass::optimize(&mut module, &mut stats);
    module.verify();
    (module, stats)
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

fn count_volatile(module: &Module) -> usize {
    let mut count = 0;
    for func in module.functions() {
        let func = &module[func];
        for bb in func.layout.blocks() {
            count += func
                .layout
                .insts(bb)
                .filter(|&inst| func.dfg[inst].is_volatile())
                .count();
        }
    }
    count
}

/// The name of the value returned by the first `ret` with an operand.
fn ret_operand_name(module: &Module) -> Option<String> {
    for func in module.functions() {
        let func = &module[func];
        for bb in func.layout.blocks() {
            for inst in func.layout.insts(bb) {
                if let InstData::Unary { args, .. } = &func.dfg[inst] {
                    if func.dfg[inst].opcode() == Opcode::Ret {
                        return func.dfg.get_name(args[0]).map(String::from);
                    }
                }
            }
        }
    }
    None
}

#[test]
fn dead_arithmetic_chain() {
    let (module, stats) = optimized(
        r#"
        define i32 @f(i32 %x, i32 %y) {
        entry:
          %a = add i32 %x, %y
          %b = mul i32 %a, 2
          ret i32 %x
        }
        "#,
    );
    assert_eq!(count_opcode(&module, Opcode::Add), 0);
    assert_eq!(count_opcode(&module, Opcode::Mul), 0);
    assert_eq!(stats[Statistic::CseDead], 2);
}

#[test]
fn algebraic_simplification() {
    let (module, stats) = optimized(
        r#"
        define i32 @f(i32 %x) {
        entry:
          %a = add i32 %x, 0
          ret i32 %a
        }
        "#,
    );
    assert_eq!(count_opcode(&module, Opcode::Add), 0);
    assert!(stats[Statistic::CseSimplify] >= 1);
    assert_eq!(ret_operand_name(&module).as_deref(), Some("x"));
}

#[test]
fn cross_block_cse() {
    let (module, stats) = optimized(
        r#"
        define i32 @f(i32 %x, i32 %y) {
        entry:
          %p = add i32 %x, %y
          %c = icmp slt i32 %p, %y
          br i1 %c, label %next, label %other
        next:
          %q = add i32 %x, %y
          ret i32 %q
        other:
          ret i32 %p
        }
        "#,
    );
    assert_eq!(count_opcode(&module, Opcode::Add), 1);
    assert!(stats[Statistic::CseElim] >= 1);
    // The return in `next` now reads the dominating copy.
    assert_eq!(ret_operand_name(&module).as_deref(), Some("p"));
}

#[test]
fn redundant_load() {
    let (module, stats) = optimized(
        r#"
        define i32 @f(ptr %p) {
        entry:
          %a = load i32, ptr %p
          %b = load i32, ptr %p
          %s = add i32 %a, %b
          ret i32 %s
        }
        "#,
    );
    assert_eq!(count_opcode(&module, Opcode::Load), 1);
    assert_eq!(stats[Statistic::CseLdElim], 1);
}

#[test]
fn store_to_load_forwarding() {
    let (module, stats) = optimized(
        r#"
        define i32 @f(i32 %v, ptr %p) {
        entry:
          store i32 %v, ptr %p
          %x = load i32, ptr %p
          ret i32 %x
        }
        "#,
    );
    assert_eq!(count_opcode(&module, Opcode::Load), 0);
    assert_eq!(count_opcode(&module, Opcode::Store), 1);
    assert!(stats[Statistic::CseStore2Load] >= 1);
    assert_eq!(ret_operand_name(&module).as_deref(), Some("v"));
}

#[test]
fn dead_store() {
    let (module, stats) = optimized(
        r#"
        define void @f(i32 %u, i32 %v, ptr %p) {
        entry:
          store i32 %u, ptr %p
          store i32 %v, ptr %p
          ret void
        }
        "#,
    );
    assert_eq!(count_opcode(&module, Opcode::Store), 1);
    assert!(stats[Statistic::CseStElim] >= 1);
    // The surviving store writes the later value.
    let func = &module[module.functions().next().unwrap()];
    let bb = func.layout.entry();
    let store = func
        .layout
        .insts(bb)
        .find(|&inst| func.dfg[inst].opcode() == Opcode::Store)
        .unwrap();
    let stored = func.dfg[store].args()[0];
    assert_eq!(func.dfg.get_name(stored), Some("v"));
}

#[test]
fn intervening_call_blocks_load_elimination() {
    let (module, stats) = optimized(
        r#"
        declare void @g()
        define i32 @f(ptr %p) {
        entry:
          %a = load i32, ptr %p
          call void @g()
          %b = load i32, ptr %p
          %s = add i32 %a, %b
          ret i32 %s
        }
        "#,
    );
    assert_eq!(count_opcode(&module, Opcode::Load), 2);
    assert_eq!(stats[Statistic::CseLdElim], 0);
    assert_eq!(stats[Statistic::CseStore2Load], 0);
}

#[test]
fn volatile_loads_are_untouched() {
    let (module, stats) = optimized(
        r#"
        define i32 @f(ptr %p) {
        entry:
          %a = load volatile i32, ptr %p
          %b = load volatile i32, ptr %p
          %s = add i32 %a, %b
          ret i32 %s
        }
        "#,
    );
    assert_eq!(count_opcode(&module, Opcode::Load), 2);
    assert_eq!(count_volatile(&module), 2);
    assert_eq!(stats[Statistic::CseLdElim], 0);
}

#[test]
fn volatile_counts_are_invariant() {
    let input = r#"
        define i32 @f(ptr %p, i32 %v) {
        entry:
          store volatile i32 %v, ptr %p
          store i32 %v, ptr %p
          %a = load i32, ptr %p
          %b = load volatile i32, ptr %p
          %s = add i32 %a, %b
          ret i32 %s
        }
        "#;
    let before = {
        let module = parse_module(input).unwrap();
        count_volatile(&module)
    };
    let (module, stats) = optimized(input);
    assert_eq!(count_volatile(&module), before);
    assert_eq!(stats[Statistic::CseStore2Load], 1);
}

#[test]
fn pipeline_reaches_a_fixed_point() {
    let input = r#"
        declare void @g()
        define i32 @chain(i32 %x, i32 %y, ptr %p) {
        entry:
          %a = add i32 %x, %y
          %b = mul i32 %a, 2
          %z = add i32 %x, 0
          store i32 %z, ptr %p
          %l = load i32, ptr %p
          %c = icmp slt i32 %l, %y
          br i1 %c, label %next, label %other
        next:
          %q = add i32 %x, 0
          ret i32 %q
        other:
          ret i32 %l
        }
        "#;
    let mut module = parse_module(input).unwrap();
    let mut stats = Statistics::new();
    pass::optimize(&mut module, &mut stats);
    module.verify();

    // A fourth application of the pass sequence must not advance any
    // counter.
    let snapshot = stats.clone();
    pass::dce::run_on_module(&mut module, &mut stats);
    pass::simplify::run_on_module(&mut module, &mut stats);
    pass::cse::run_on_module(&mut module, &mut stats);
    pass::loadelim::run_on_module(&mut module, &mut stats);
    pass::storeelim::run_on_module(&mut module, &mut stats);
    assert_eq!(stats, snapshot);
}

#[test]
fn no_cse_leaves_module_unchanged() {
    let input = r#"
        define i32 @f(i32 %x) {
        entry:
          %a = add i32 %x, 0
          ret i32 %a
        }
        "#;
    // Mirrors the driver's behavior under `--no-cse`: the pipeline simply
    // does not run, and the module round-trips unchanged.
    let module = parse_module(input).unwrap();
    let text = ssir::assembly::write_string(&module);
    let module2 = parse_module(&text).unwrap();
    assert_eq!(ssir::assembly::write_string(&module2), text);
    assert_eq!(count_opcode(&module, Opcode::Add), 1);
}

#[test]
fn output_instructions_are_a_subset_of_the_input() {
    let input = r#"
        define i32 @f(i32 %x, i32 %y, ptr %p) {
        entry:
          %a = add i32 %x, %y
          %b = add i32 %x, %y
          %s = add i32 %a, %b
          store i32 %s, ptr %p
          %l = load i32, ptr %p
          ret i32 %l
        }
        "#;
    let before = parse_module(input).unwrap();
    let (after, _) = optimized(input);
    for &opcode in &[Opcode::Add, Opcode::Load, Opcode::Store, Opcode::Ret] {
        assert!(
            count_opcode(&after, opcode) <= count_opcode(&before, opcode),
            "pipeline must never synthesize {} instructions",
            opcode
        );
    }
}
