//! Atom literals.

use crate::intern::Symbol;
use crate::types::Type;

/// A primitive literal as it appears in a compiled program.
///
/// String payloads are interned; the runtime materializes an owned string
/// from the session interner when it allocates the literal's object.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Atom {
    Int(i64),
    UInt(u64),
    Real(f64),
    Str(Symbol),
}

impl Atom {
    pub fn ty(&self) -> Type {
        match self {
            Atom::Int(_) => Type::int(),
            Atom::UInt(_) => Type::uint(),
            Atom::Real(_) => Type::real(),
            Atom::Str(_) => Type::str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::Interner;

    #[test]
    fn atom_types() {
        let mut interner = Interner::new();
        let sym = interner.intern("x");

        assert_eq!(Atom::Int(-3).ty(), Type::int());
        assert_eq!(Atom::UInt(3).ty(), Type::uint());
        assert_eq!(Atom::Real(0.5).ty(), Type::real());
        assert_eq!(Atom::Str(sym).ty(), Type::str());
    }
}
