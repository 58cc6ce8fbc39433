mod common;

use common::{run, run_err};

#[test]
fn definition_and_call() {
    assert_eq!(
        run("func add(a, b) { return a + b; } println(add(2, 3));"),
        "5\n"
    );
}

#[test]
fn body_without_return_yields_null() {
    assert_eq!(
        run("func noop(x) { x + 1; } println(noop(1));"),
        "null\n"
    );
}

#[test]
fn recursion_factorial() {
    let source = "
        func f(n) {
            if (n == 0) { return 1; }
            return n * f(n - 1);
        }
        println(f(5));
    ";
    assert_eq!(run(source), "120\n");
}

#[test]
fn return_short_circuits_nested_blocks() {
    let source = "
        func pick(n) {
            {
                if (n > 0) {
                    return \"positive\";
                }
                return \"rest\";
            }
        }
        println(pick(1));
        println(pick(0));
    ";
    assert_eq!(run(source), "positive\nrest\n");
}

#[test]
fn free_variables_resolve_in_the_defining_scope() {
    // the call happens in a scope with its own `base`; the definition's
    // `base` must win
    let source = "
        let base = 10;
        func offset(n) { return base + n; }
        {
            let base = 99;
            println(offset(1));
        }
    ";
    assert_eq!(run(source), "11\n");
}

#[test]
fn functions_are_first_class_and_truthy() {
    assert_eq!(
        run("func f() { return 1; } println(type_name(f)); if (f) { println(\"yes\"); }"),
        "function\nyes\n"
    );
}

#[test]
fn missing_arguments_are_an_error_excess_ignored() {
    let (err, _) = run_err("func two(a, b) { return a; } two(1);");
    assert!(err.message.contains("takes 2 argument(s), got 1"));

    assert_eq!(
        run("func one(a) { return a; } println(one(7, 8, 9));"),
        "7\n"
    );
}

#[test]
fn calling_a_non_function_is_an_error() {
    let (err, _) = run_err("let x = 3; x();");
    assert!(err.message.contains("not callable"));

    let (err, _) = run_err("ghost();");
    assert!(err.message.contains("Undefined call \"ghost\""));
}

#[test]
fn assigning_to_a_function_is_an_error() {
    let (err, _) = run_err("func f() { return 1; } f = 2;");
    assert!(err.message.contains("Cannot assign values to a function"));
}

#[test]
fn top_level_return_stops_the_script() {
    assert_eq!(run("println(\"a\"); return 0; println(\"b\");"), "a\n");
}
