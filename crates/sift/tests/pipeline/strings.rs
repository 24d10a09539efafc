//! The cut and grep families.

use crate::{assert_error, eval};

#[test]
fn cut_splits_on_a_literal_delimiter() {
    assert_eq!(eval(r#"cut("a,b,,c", ",")"#, ""), r#"["a", "b", "", "c"]"#);
    assert_eq!(eval(r#"cut("a,", ",")"#, ""), r#"["a", ""]"#);
    assert_eq!(eval(r#"cut("abc", ",")"#, ""), r#"["abc"]"#);
    assert_eq!(eval(r#"cut("a::b", "::")"#, ""), r#"["a", "b"]"#);
}

#[test]
fn cut_picks_the_nth_piece() {
    assert_eq!(eval(r#"cut("a,b,c", ",", 0u)"#, ""), "a");
    assert_eq!(eval(r#"cut("a,b,c", ",", 2u)"#, ""), "c");
    // The signed overload resolves separately but splits identically.
    assert_eq!(eval(r#"cut("a,b,c", ",", 1)"#, ""), "b");
}

#[test]
fn cut_nth_past_the_end_fails() {
    assert_error(r#"cut("a,b", ",", 5u)"#, "", "Substring not found");
    assert_error(r#"cut("a,b", ",", 2u)"#, "", "Substring not found");
}

#[test]
fn grep_without_groups_yields_full_matches() {
    assert_eq!(eval(r#"grep("a1 b2 c3", "[a-z][0-9]")"#, ""), r#"["a1", "b2", "c3"]"#);
    assert_eq!(eval(r#"grep("abc", "[0-9]")"#, ""), "[]");
}

#[test]
fn grep_with_groups_yields_each_capture() {
    assert_eq!(
        eval(r#"grep("x=1 y=2", "([a-z])=([0-9])")"#, ""),
        r#"["x", "1", "y", "2"]"#
    );
}

#[test]
fn grepif_agrees_with_grep_nonemptiness() {
    assert_eq!(eval(r#"grepif("hello", "l+")"#, ""), "1");
    assert_eq!(eval(r#"grep("hello", "l+")"#, ""), r#"["ll"]"#);

    assert_eq!(eval(r#"grepif("hello", "z")"#, ""), "0");
    assert_eq!(eval(r#"grep("hello", "z")"#, ""), "[]");
}

#[test]
fn count_measures_strings_and_containers() {
    assert_eq!(eval(r#"count("abc")"#, ""), "3");
    assert_eq!(eval(r#"count(cut("a,b,,c", ","))"#, ""), "4");
}

#[test]
fn string_escapes_reach_the_functions() {
    assert_eq!(eval(r#"cut("a\tb", "\t", 1u)"#, ""), "b");
}
