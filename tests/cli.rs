//! End-to-end CLI scenarios driven through the built `lox` binary, grounded
//! in the same way `original_source/cli`'s `runFile` is exercised: write a
//! script to a temp file, run the binary against it, check stdout/exit code.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn script(source: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp script");
    write!(file, "{source}").expect("write temp script");
    file
}

fn run(source: &str) -> assert_cmd::assert::Assert {
    let file = script(source);
    Command::cargo_bin("lox")
        .expect("built lox binary")
        .arg(file.path())
        .assert()
}

#[test]
fn arithmetic_precedence() {
    run("print 1 + 2 * 3;").success().stdout("7\n");
}

#[test]
fn string_concatenation() {
    run(r#"var a = "hi"; var b = " there"; print a + b;"#)
        .success()
        .stdout("hi there\n");
}

#[test]
fn while_loop_prints_each_iteration() {
    run("var i = 0; while (i < 3) { print i; i = i + 1; }")
        .success()
        .stdout("0\n1\n2\n");
}

#[test]
fn function_call_returns_sum() {
    run("fun add(a, b) { return a + b; } print add(3, 4);")
        .success()
        .stdout("7\n");
}

#[test]
fn recursive_fibonacci() {
    run("fun fib(n) { if (n < 2) return n; return fib(n-1) + fib(n-2); } print fib(10);")
        .success()
        .stdout("55\n");
}

#[test]
fn clock_native_is_non_negative() {
    run("print clock() >= 0;").success().stdout("true\n");
}

#[test]
fn syntax_error_exits_65() {
    run("print 1 +;").code(65);
}

#[test]
fn division_by_zero_exits_70_with_message() {
    run("1 / 0;")
        .code(70)
        .stderr(predicate::str::contains("Division by zero."));
}

#[test]
fn undefined_variable_exits_70_with_message() {
    run("print x;")
        .code(70)
        .stderr(predicate::str::contains("Undefined variable 'x'"));
}

#[test]
fn missing_script_file_exits_1() {
    Command::cargo_bin("lox")
        .expect("built lox binary")
        .arg("/nonexistent/path/to/script.lox")
        .assert()
        .code(1);
}

#[test]
fn compile_only_flag_disassembles_without_executing() {
    let file = script("print 1 + 2;");
    Command::cargo_bin("lox")
        .expect("built lox binary")
        .arg("-c")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("OP_CONSTANT"))
        .stdout(predicate::str::contains("OP_RETURN"));
}

#[test]
fn bad_flag_combination_is_a_usage_error() {
    Command::cargo_bin("lox")
        .expect("built lox binary")
        .arg("--bogus")
        .assert()
        .code(64);
}
