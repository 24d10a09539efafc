//! Numeric expressions: precedence, promotion, wrapping, bit operations.

use crate::{assert_error, eval};

#[test]
fn precedence() {
    assert_eq!(eval("2 + 3 * 4", ""), "14");
    assert_eq!(eval("(2 + 3) * 4", ""), "20");
    assert_eq!(eval("20 - 3 - 4", ""), "13");
}

#[test]
fn promotion_to_real() {
    assert_eq!(eval("1 + 2.5", ""), "3.5");
    assert_eq!(eval("2.5 + 1", ""), "3.5");
    assert_eq!(eval("1 - 0.5", ""), "0.5");
    assert_eq!(eval("3 * 0.5", ""), "1.5");
}

#[test]
fn pow_is_real() {
    assert_eq!(eval("2 ** 3", ""), "8");
    assert_eq!(eval("4 ** 0.5", ""), "2");
    assert_eq!(eval("2 ** 3 ** 2", ""), "512");
}

#[test]
fn signed_division_truncates() {
    assert_eq!(eval("7 / 2", ""), "3");
    assert_eq!(eval("-7 / 2", ""), "-3");
    assert_eq!(eval("7 % 3", ""), "1");
    assert_eq!(eval("-7 % 2", ""), "-1");
}

#[test]
fn unsigned_arithmetic() {
    assert_eq!(eval("10u / 3u", ""), "3");
    assert_eq!(eval("10u % 3u", ""), "1");
    assert_eq!(eval("2u + 3u", ""), "5");
}

#[test]
fn bit_operations() {
    assert_eq!(eval("7 & 3", ""), "3");
    assert_eq!(eval("1 | 6", ""), "7");
    assert_eq!(eval("5 ^ 1", ""), "4");
    assert_eq!(eval("~0", ""), "-1");
    assert_eq!(eval("~~12345", ""), "12345");
}

#[test]
fn negative_literals() {
    assert_eq!(eval("-3 + 5", ""), "2");
    assert_eq!(eval("-2.5", ""), "-2.5");
}

#[test]
fn casts_bridge_integral_kinds() {
    assert_eq!(eval("1 + int(2u)", ""), "3");
    assert_eq!(eval("uint(1) + 2u", ""), "3");
    assert_eq!(eval("real(3) / 2.0", ""), "1.5");
}

#[test]
fn math_functions() {
    assert_eq!(eval("sqrt(9.0)", ""), "3");
    assert_eq!(eval("abs(-2.5)", ""), "2.5");
    assert_eq!(eval("abs(-7)", ""), "7");
}

#[test]
fn bindings_evaluate_left_to_right() {
    assert_eq!(eval("x = 2, y = 3, x * y + 1", ""), "7");
    assert_eq!(eval("x = 2 + 3, x * 4", ""), "20");
}

#[test]
fn mixed_integrals_are_a_type_error() {
    assert_error("1 + 2u", "", "int() or uint()");
    assert_error("1u - 2", "", "int() or uint()");
}

#[test]
fn non_numeric_operands_are_a_type_error() {
    assert_error(r#""a" + 1"#, "", "numeric operands");
    assert_error("1.5 & 2.5", "", "integral operands");
}
