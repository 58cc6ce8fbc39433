mod common;

use common::{Recorder, run, run_err};
use mango_script::run_source;

#[test]
fn print_renders_every_type() {
    assert_eq!(run("print(1, \" \", 2.5);"), "1 2.5");
    assert_eq!(run("print(null);"), "null");
    assert_eq!(run("print(true, false);"), "truefalse");
    assert_eq!(run("println(\"line\");"), "line\n");
}

#[test]
fn as_str_coerces() {
    assert_eq!(run("println(as_str(42));"), "42\n");
    assert_eq!(run("println(as_str(1.5) + \"!\");"), "1.5!\n");
    assert_eq!(run("println(as_str(null) + as_str(true));"), "nulltrue\n");
    assert_eq!(run("println(type_name(as_str(42)));"), "str\n");
}

#[test]
fn as_int_coerces() {
    assert_eq!(run("println(as_int(\"42\"));"), "42\n");
    assert_eq!(run("println(as_int(\"3.9\"));"), "3\n");
    assert_eq!(run("println(as_int(2.9));"), "2\n");
    assert_eq!(run("println(as_int(true));"), "1\n");
    assert_eq!(run("println(as_int(null));"), "0\n");
}

#[test]
fn as_float_coerces() {
    assert_eq!(run("println(as_float(2));"), "2.0\n");
    assert_eq!(run("println(as_float(\"1.25\"));"), "1.25\n");
    assert_eq!(run("println(type_name(as_float(2)));"), "float\n");
}

#[test]
fn type_name_covers_every_variant() {
    assert_eq!(run("println(type_name(1.0));"), "float\n");
    assert_eq!(run("println(type_name(1));"), "int\n");
    assert_eq!(run("println(type_name(\"s\"));"), "str\n");
    assert_eq!(run("println(type_name(true));"), "bool\n");
    assert_eq!(run("println(type_name(null));"), "null\n");
}

#[test]
fn wrong_arity_is_an_error() {
    let (err, _) = run_err("as_int(1, 2);");
    assert!(err.message.contains("takes 1 argument, got 2"));
}

#[test]
fn exec_reaches_the_host_shell() {
    let mut host = Recorder::default();
    run_source("exec(\"list /\"); exec(\"whereami\");", &mut host).unwrap();
    assert_eq!(host.commands, vec!["list /", "whereami"]);
}

#[test]
fn exec_requires_a_string() {
    let (err, _) = run_err("exec(42);");
    assert!(err.message.contains("expects string argument"));
}

#[test]
fn builtins_shadow_user_functions() {
    // a user `print` never hooks the builtin dispatch
    let source = "func myprint(x) { return x; } println(myprint(3));";
    assert_eq!(run(source), "3\n");
}
