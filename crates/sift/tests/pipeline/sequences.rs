//! Generators, flattening, and the input sequence.

use crate::{assert_error, eval};

#[test]
fn input_materializes_to_an_array() {
    assert_eq!(eval("@", "a\nb\nc\n"), r#"["a", "b", "c"]"#);
}

#[test]
fn empty_input_is_an_empty_array() {
    assert_eq!(eval("@", ""), "[]");
}

#[test]
fn missing_final_newline_still_counts() {
    assert_eq!(eval("@", "a\nb"), r#"["a", "b"]"#);
}

#[test]
fn blank_lines_are_kept() {
    assert_eq!(eval("@", "a\n\nb\n"), r#"["a", "", "b"]"#);
}

#[test]
fn generator_maps_each_line() {
    assert_eq!(
        eval(r#"[cut(@, " ", 0u) : @]"#, "a b\nc d\n"),
        r#"["a", "c"]"#
    );
}

#[test]
fn generator_bodies_can_compute() {
    assert_eq!(
        eval(r#"[grepif(@, "[0-9]") : @]"#, "a1\nbc\nd2\n"),
        "[1, 0, 1]"
    );
}

#[test]
fn flatten_concatenates_in_order() {
    assert_eq!(
        eval(r#"flat([cut(@, " ") : @])"#, "a b\nc d\n"),
        r#"["a", "b", "c", "d"]"#
    );
}

#[test]
fn flatten_of_singletons_is_the_concatenation() {
    assert_eq!(
        eval(r#"flat([cut(@, ",") : @])"#, "a\nb\nc\n"),
        r#"["a", "b", "c"]"#
    );
}

#[test]
fn flatten_skips_empty_inners() {
    assert_eq!(
        eval(r#"flat([grep(@, "[0-9]+") : @])"#, "a1\nbc\n2 3\n"),
        r#"["1", "2", "3"]"#
    );
}

#[test]
fn explicit_seq_wrap_is_equivalent() {
    assert_eq!(
        eval(r#"flat([seq(cut(@, " ")) : @])"#, "a b\nc d\n"),
        r#"["a", "b", "c", "d"]"#
    );
}

#[test]
fn nested_generators_rebind_the_element() {
    assert_eq!(
        eval(r#"[ [ @ : cut(@, " ") ] : @ ]"#, "a b\nc\n"),
        r#"[["a", "b"], ["c"]]"#
    );
}

#[test]
fn bodies_only_run_when_an_element_exists() {
    // A body that would fail never runs over an empty source, and runs as
    // soon as the source yields.
    assert_eq!(eval("[1 / 0 : @]", ""), "[]");
    assert_error("[1 / 0 : @]", "x\n", "Division by zero");
}

#[test]
fn bodies_run_exactly_once_per_element() {
    // The body bumps a bound counter in place on every evaluation; the
    // counter's final value is the number of body runs.
    assert_eq!(
        eval("c = 0, (arr([c + 1 : @]), c)", "x\ny\nz\n"),
        "([1, 2, 3], 3)"
    );
}

#[test]
fn generators_run_over_bound_arrays() {
    assert_eq!(
        eval(r#"xs = cut("1,22,333", ","), [count(@) : xs]"#, ""),
        "[1, 2, 3]"
    );
}

#[test]
fn generator_chains_compose() {
    assert_eq!(
        eval(
            r#"[cut(@, "=", 1u) : flat([cut(@, " ") : @])]"#,
            "a=1 b=2\nc=3\n"
        ),
        r#"["1", "2", "3"]"#
    );
}
