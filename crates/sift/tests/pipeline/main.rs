//! End-to-end tests: source text in, printed result out.
//!
//! Every test drives the full lex → parse → check → compile → execute path
//! through a fresh `Session`. Tests are organized into modules by area.

use sift::{Error, Session};

mod arithmetic;
mod containers;
mod errors;
mod sequences;
mod strings;

// ============================================================================
// Test Helpers
// ============================================================================

/// Run a program and return its printed result without the trailing newline.
pub fn eval(program: &str, input: &str) -> String {
    let session = Session::new();
    let out = session
        .run_to_string(program, input)
        .unwrap_or_else(|e| panic!("eval failed for '{}': {}", program, e));
    out.strip_suffix('\n')
        .unwrap_or_else(|| panic!("missing trailing newline for '{}'", program))
        .to_string()
}

/// Run a program and return the error it fails with.
pub fn eval_err(program: &str, input: &str) -> Error {
    let session = Session::new();
    match session.run_to_string(program, input) {
        Ok(out) => panic!("expected an error for '{}', got '{}'", program, out),
        Err(e) => e,
    }
}

/// Check that a program fails with a message containing `expected`.
pub fn assert_error(program: &str, input: &str, expected: &str) {
    let err = eval_err(program, input);
    let message = err.to_string();
    assert!(
        message.contains(expected),
        "error for '{}' was '{}', expected it to mention '{}'",
        program,
        message,
        expected
    );
}
