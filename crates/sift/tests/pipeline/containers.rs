//! Arrays, maps, tuples, and indexing.

use crate::eval;

#[test]
fn array_indexing() {
    assert_eq!(eval(r#"cut("a,b,c", ",")[0u]"#, ""), "a");
    assert_eq!(eval(r#"cut("a,b,c", ",")[2u]"#, ""), "c");
    // Signed keys work as long as they are in range.
    assert_eq!(eval(r#"cut("a,b,c", ",")[1]"#, ""), "b");
}

#[test]
fn tuples_print_in_field_order() {
    assert_eq!(eval(r#"("x", 1, 2.5)"#, ""), r#"("x", 1, 2.5)"#);
}

#[test]
fn tuple_fields_keep_their_values() {
    assert_eq!(eval(r#"(1 + 2, 3 * 4)"#, ""), "(3, 12)");
}

#[test]
fn map_materializes_pairs_and_indexes() {
    let program = r#"m = map([(cut(@, "=", 0u), cut(@, "=", 1u)) : @]), m["b"]"#;
    assert_eq!(eval(program, "a=1\nb=2\nc=3\n"), "2");
}

#[test]
fn map_counts_distinct_keys() {
    let program = r#"count(map([(cut(@, "=", 0u), cut(@, "=", 1u)) : @]))"#;
    // A repeated key overwrites its earlier entry.
    assert_eq!(eval(program, "a=1\nb=2\na=3\n"), "2");
}

#[test]
fn arrays_nest() {
    assert_eq!(
        eval(r#"[cut(@, ",") : @]"#, "a,b\nc\n"),
        r#"[["a", "b"], ["c"]]"#
    );
}

#[test]
fn nested_array_indexing() {
    assert_eq!(eval(r#"arr([cut(@, ",") : @])[1u][0u]"#, "a,b\nc,d\n"), "c");
}

#[test]
fn empty_string_elements_survive_containers() {
    assert_eq!(eval(r#"cut(",", ",")"#, ""), r#"["", ""]"#);
}
