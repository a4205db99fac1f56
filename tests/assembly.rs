//! Round-trip tests for the textual IR format.

use ssir::assembly::{parse_module, write_string};

/// Parse, print, re-parse, re-print: the two printed forms must coincide.
fn round_trip(input: &str) {
    let module = parse_module(input).unwrap();
    let first = write_string(&module);
    let module = parse_module(&first)
        .unwrap_or_else(|e| panic!("emitted assembly does not parse: {}\n{}", e, first));
    let second = write_string(&module);
    assert_eq!(first, second);
}

#[test]
fn arithmetic_and_comparisons() {
    round_trip(
        r#"
        define i32 @math(i32 %a, i32 %b) {
        entry:
          %sum = add i32 %a, %b
          %diff = sub i32 %sum, 5
          %prod = mul i32 %diff, %a
          %quot = sdiv i32 %prod, %b
          %bits = xor i32 %quot, -1
          %cmp = icmp slt i32 %bits, %a
          %sel = select i1 %cmp, i32 %bits, i32 %a
          ret i32 %sel
        }
        "#,
    );
}

#[test]
fn control_flow_and_phis() {
    round_trip(
        r#"
        define i32 @loop(i32 %n) {
        entry:
          br label %head
        head:
          %i = phi i32 [ 0, %entry ], [ %next, %body ]
          %done = icmp uge i32 %i, %n
          br i1 %done, label %exit, label %body
        body:
          %next = add i32 %i, 1
          br label %head
        exit:
          ret i32 %i
        }
        "#,
    );
}

#[test]
fn memory_operations() {
    round_trip(
        r#"
        declare void @observe(i32)
        define void @mem(ptr %p, i32 %v) {
        entry:
          %slot = alloca i32
          store i32 %v, ptr %slot
          %x = load i32, ptr %slot
          store volatile i32 %x, ptr %p
          %y = load volatile i32, ptr %p
          call void @observe(i32 %y)
          fence
          %q = getelementptr i32, ptr %p, i32 %v
          %z = load i32, ptr %q
          call void @observe(i32 %z)
          ret void
        }
        "#,
    );
}

#[test]
fn casts_and_floats() {
    round_trip(
        r#"
        define f64 @convert(i32 %x, f32 %f) {
        entry:
          %w = sext i32 %x to i64
          %n = trunc i64 %w to i16
          %ext = fpext f32 %f to f64
          %fl = sitofp i32 %x to f64
          %sum = fadd f64 %ext, %fl
          %scaled = fmul f64 %sum, 2.5
          %neg = fneg f64 %scaled
          %cmp = fcmp olt f64 %neg, 0x3FF0000000000000
          %out = select i1 %cmp, f64 %neg, f64 %scaled
          ret f64 %out
        }
        "#,
    );
}

#[test]
fn vectors_and_aggregates() {
    round_trip(
        r#"
        define i32 @lanes(<4 x i32> %v, {i32, i32} %s, i32 %i) {
        entry:
          %lane = extractelement <4 x i32> %v, i32 %i
          %v2 = insertelement <4 x i32> %v, i32 %lane, i32 0
          %shuf = shufflevector <4 x i32> %v, <4 x i32> %v2, <4 x i32> %v
          %field = extractvalue {i32, i32} %s, 1
          %s2 = insertvalue {i32, i32} %s, i32 %lane, 0
          %field2 = extractvalue {i32, i32} %s2, 0
          %lane2 = extractelement <4 x i32> %shuf, i32 %field
          %sum = add i32 %lane2, %field2
          ret i32 %sum
        }
        "#,
    );
}

#[test]
fn special_constants() {
    round_trip(
        r#"
        declare i1 @check(ptr)
        define i32 @consts(ptr %p) {
        entry:
          %isnull = call i1 @check(ptr null)
          br i1 %isnull, label %a, label %b
        a:
          ret i32 undef
        b:
          ret i32 -2147483648
        }
        "#,
    );
}

#[test]
fn unreachable_terminators() {
    round_trip(
        r#"
        define void @never(i1 %c) {
        entry:
          br i1 %c, label %fine, label %bad
        fine:
          ret void
        bad:
          unreachable
        }
        "#,
    );
}

#[test]
fn parse_error_reports_position() {
    let err = parse_module("define i32 @f() {\nentry:\n  %a = frobnicate i32 1\n}\n")
        .unwrap_err();
    assert_eq!(err.loc.line, 3);
    assert!(err.message.contains("frobnicate"));
}
