mod common;

use common::run;

#[test]
fn if_takes_the_truthy_branch() {
    assert_eq!(run("if (1 < 2) { println(\"yes\"); }"), "yes\n");
    assert_eq!(run("if (2 < 1) { println(\"yes\"); }"), "");
}

#[test]
fn else_and_else_if() {
    let source = "
        func grade(n) {
            if (n >= 90) { return \"A\"; }
            else if (n >= 80) { return \"B\"; }
            else { return \"C\"; }
        }
        print(grade(95));
        print(grade(85));
        print(grade(5));
    ";
    assert_eq!(run(source), "ABC");
}

#[test]
fn branches_can_be_single_statements() {
    assert_eq!(run("if (true) println(\"bare\");"), "bare\n");
    assert_eq!(
        run("if (false) println(\"a\"); else println(\"b\");"),
        "b\n"
    );
}

#[test]
fn truthiness_matrix() {
    assert_eq!(run("if (null) { println(\"t\"); } else { println(\"f\"); }"), "f\n");
    assert_eq!(run("if (true) { println(\"t\"); } else { println(\"f\"); }"), "t\n");
    assert_eq!(run("if (false) { println(\"t\"); } else { println(\"f\"); }"), "f\n");
    assert_eq!(run("if (1) { println(\"t\"); } else { println(\"f\"); }"), "t\n");
    assert_eq!(run("if (0) { println(\"t\"); } else { println(\"f\"); }"), "f\n");
    // negative numbers are falsy, like zero
    assert_eq!(run("if (0 - 1) { println(\"t\"); } else { println(\"f\"); }"), "f\n");
    assert_eq!(run("if (0.5) { println(\"t\"); } else { println(\"f\"); }"), "t\n");
    assert_eq!(run("if (\"\") { println(\"t\"); } else { println(\"f\"); }"), "f\n");
    assert_eq!(run("if (\"x\") { println(\"t\"); } else { println(\"f\"); }"), "t\n");
}

#[test]
fn if_condition_sees_enclosing_scope() {
    let source = "
        let n = 3;
        if (n % 2 == 1) {
            println(\"odd\");
        } else {
            println(\"even\");
        }
    ";
    assert_eq!(run(source), "odd\n");
}

#[test]
fn branch_blocks_scope_their_locals() {
    let source = "
        let result = \"\";
        if (true) {
            let tmp = \"inside\";
            result = tmp;
        }
        println(result);
    ";
    assert_eq!(run(source), "inside\n");
}
