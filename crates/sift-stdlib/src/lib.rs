//! Built-in functions.
//!
//! Every built-in takes one argument value (a tuple when the call site
//! passes several arguments) and writes into its pre-allocated result cell.
//! Each module registers its own family; `register` wires them all into a
//! registry.

use sift_lang::Functions;

mod cut;
mod grep;
mod math;

/// Register the full standard set.
pub fn register(funcs: &mut Functions) {
    cut::register(funcs);
    grep::register(funcs);
    math::register(funcs);
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_core::Type;

    #[test]
    fn standard_set_is_registered() {
        let mut funcs = Functions::new();
        register(&mut funcs);

        assert!(
            funcs
                .resolve("cut", &Type::tup(vec![Type::str(), Type::str()]))
                .is_some()
        );
        assert!(
            funcs
                .resolve("grepif", &Type::tup(vec![Type::str(), Type::str()]))
                .is_some()
        );
        assert!(funcs.resolve("sqrt", &Type::real()).is_some());
        assert!(funcs.resolve("int", &Type::uint()).is_some());
    }
}
