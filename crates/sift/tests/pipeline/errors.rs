//! Failure paths: every error kind surfaces as one clear message.

use crate::{assert_error, eval_err};
use sift::Error;

#[test]
fn division_by_zero() {
    assert_error("10 / 0", "", "Division by zero");
    assert_error("10u / 0u", "", "Division by zero");
    assert!(matches!(eval_err("10 / 0", ""), Error::Arithmetic(_)));
}

#[test]
fn modulus_by_zero() {
    assert_error("10 % 0", "", "Modulus by zero");
}

#[test]
fn missing_cut_piece() {
    assert_error(r#"cut("a,b", ",", 5u)"#, "", "Substring not found");
    assert!(matches!(
        eval_err(r#"cut("a,b", ",", 5u)"#, ""),
        Error::Lookup(_)
    ));
}

#[test]
fn negative_cut_index() {
    assert_error(r#"cut("a,b", ",", -1)"#, "", "Negative piece index");
}

#[test]
fn empty_cut_delimiter() {
    assert_error(r#"cut("ab", "")"#, "", "Empty delimiter");
}

#[test]
fn invalid_regex() {
    assert_error(r#"grep("a", "(")"#, "", "Invalid regex");
    assert!(matches!(eval_err(r#"grep("a", "(")"#, ""), Error::Regex(_)));
}

#[test]
fn array_index_out_of_range() {
    assert_error(r#"cut("a,b", ",")[5u]"#, "", "Index out of range");
}

#[test]
fn map_key_not_found() {
    let program = r#"map([(cut(@, "=", 0u), cut(@, "=", 1u)) : @])["zz"]"#;
    let err = eval_err(program, "a=1\n");
    assert!(err.to_string().contains("not in map"));
    assert!(matches!(err, Error::Lookup(_)));
}

#[test]
fn unknown_name() {
    assert_error("nope + 1", "", "Unknown name: 'nope'");
}

#[test]
fn unknown_function() {
    assert_error("nosuch(1)", "", "Unknown function: 'nosuch'");
}

#[test]
fn no_matching_overload() {
    assert_error(r#"cut(1, 2)"#, "", "No matching overload: cut(Int, Int)");
    assert!(matches!(eval_err("cut(1, 2)", ""), Error::Type(_)));
}

#[test]
fn parse_errors() {
    assert!(matches!(eval_err("1 +", ""), Error::Parse(_)));
    assert!(matches!(eval_err("(1", ""), Error::Parse(_)));
    assert!(matches!(eval_err("1 2", ""), Error::Parse(_)));
    assert!(matches!(eval_err("$", ""), Error::Parse(_)));
}

#[test]
fn type_errors_name_the_types() {
    assert_error(r#""a" * 2"#, "", "Str");
    assert_error(r#"cut("a,b", ",")["x"]"#, "", "must be integral");
}
