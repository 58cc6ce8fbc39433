mod common;

use common::{run, run_err};

#[test]
fn declare_define_assign() {
    assert_eq!(run("let x; println(x);"), "null\n");
    assert_eq!(run("let x = 5; println(x);"), "5\n");
    assert_eq!(run("let x = 5; x = x + 1; println(x);"), "6\n");
    assert_eq!(run("let s = \"a\"; s = s + \"b\"; println(s);"), "ab\n");
}

#[test]
fn inner_blocks_shadow_without_leaking() {
    // the inner let is a new binding; the outer one survives untouched
    assert_eq!(run("let x = 1; { let x = 2; println(x); } println(x);"), "2\n1\n");
}

#[test]
fn assignment_targets_the_outer_binding() {
    // appending inside a nested block mutates the outer variable
    assert_eq!(run("let s = \"\"; let i = 0; { s = s + \"x\"; } println(s);"), "x\n");
}

#[test]
fn block_locals_do_not_escape() {
    let (err, _) = run_err("{ let inner = 1; } println(inner);");
    assert!(err.message.contains("Undefined"));
}

#[test]
fn redeclaration_in_the_same_scope_is_an_error() {
    let (err, _) = run_err("let x = 1; let x = 2;");
    assert!(err.message.contains("already defined"));
    assert_eq!(err.line, 1);

    // shadowing in a nested scope is fine
    assert_eq!(run("let x = 1; { let x = 2; }"), "");
}

#[test]
fn assigning_an_undeclared_name_is_an_error() {
    let (err, _) = run_err("y = 3;");
    assert!(err.message.contains("Undefined \"y\""));
}

#[test]
fn using_an_undefined_identifier_is_an_error() {
    let (err, output) = run_err("println(1); println(missing + 1);");
    assert_eq!(output, "1\n");
    assert!(err.message.contains("Undefined \"missing\""));
    assert_eq!(err.line, 1);
}

#[test]
fn error_lines_point_at_the_failing_statement() {
    let (err, _) = run_err("let a = 1;\nlet b = 2;\nprintln(c);\n");
    assert_eq!(err.line, 3);
}
