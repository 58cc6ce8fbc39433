mod common;

use common::{run, run_err};

#[test]
fn integer_arithmetic() {
    assert_eq!(run("println(1 + 2 * 3);"), "7\n");
    assert_eq!(run("println((1 + 2) * 3);"), "9\n");
    assert_eq!(run("println(10 - 4 - 3);"), "3\n");
    assert_eq!(run("println(7 % 3);"), "1\n");
}

#[test]
fn division_is_always_float() {
    assert_eq!(run("println(7 / 2);"), "3.5\n");
    assert_eq!(run("println(4 / 2);"), "2.0\n");
}

#[test]
fn float_promotion() {
    assert_eq!(run("println(1 + 0.5);"), "1.5\n");
    assert_eq!(run("println(2 * 1.5);"), "3.0\n");
    assert_eq!(run("println(type_name(1 + 1));"), "int\n");
    assert_eq!(run("println(type_name(1 + 1.0));"), "float\n");
}

#[test]
fn string_operators() {
    assert_eq!(run("println(\"foo\" + \"bar\");"), "foobar\n");
    assert_eq!(run("println(\"ab\" * 3);"), "ababab\n");
    assert_eq!(run("println(3 * \"ab\");"), "ababab\n");
    // negative repeat counts clamp to zero
    assert_eq!(run("println(\"ab\" * (0 - 2));"), "\n");
}

#[test]
fn comparisons() {
    assert_eq!(run("println(1 < 2);"), "true\n");
    assert_eq!(run("println(2 <= 2);"), "true\n");
    assert_eq!(run("println(3 > 4);"), "false\n");
    assert_eq!(run("println(1.5 >= 2);"), "false\n");
}

#[test]
fn equality_matrix() {
    assert_eq!(run("println(null == null);"), "true\n");
    assert_eq!(run("println(null == 1);"), "false\n");
    assert_eq!(run("println(null != 1);"), "true\n");
    assert_eq!(run("println(\"a\" == \"a\");"), "true\n");
    assert_eq!(run("println(\"a\" != \"b\");"), "true\n");
    assert_eq!(run("println(1 == 1.0);"), "true\n");
    // mixed non-numeric types never compare equal
    assert_eq!(run("println(\"1\" == 1);"), "false\n");
    assert_eq!(run("println(\"1\" != 1);"), "true\n");
}

#[test]
fn literal_arithmetic_is_deterministic() {
    let first = run("println(3 * 7 + 1.25 / 0.5);");
    let second = run("println(3 * 7 + 1.25 / 0.5);");
    assert_eq!(first, second);
}

#[test]
fn zero_division_aborts_the_script() {
    let (err, output) = run_err("println(\"before\"); println(1 / 0); println(\"after\");");
    assert_eq!(output, "before\n");
    assert!(err.message.contains("Zero division"));

    let (err, _) = run_err("println(5 % 0);");
    assert!(err.message.contains("Modulo by zero"));
}

#[test]
fn type_mismatches_are_runtime_errors() {
    let (err, _) = run_err("println(\"a\" - 1);");
    assert!(err.message.contains("Unsupported operation"));
    let (err, _) = run_err("println(null < 1);");
    assert!(err.message.contains("Unsupported operation"));
}
