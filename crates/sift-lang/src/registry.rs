//! The built-in function registry.
//!
//! Each name maps to an ordered list of overload records; resolution scans
//! the list and returns the first record whose argument type structurally
//! equals the call site's argument type. Registration order is therefore
//! the tie-breaker, and resolution is deterministic.

use std::collections::HashMap;

use sift_core::{Tag, Type};
use sift_vm::NativeFn;

/// One registered overload.
pub struct Overload {
    pub arg: Type,
    pub result: Type,
    pub func: NativeFn,
}

/// The function registry.
#[derive(Default)]
pub struct Functions {
    map: HashMap<String, Vec<Overload>>,
}

impl Functions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an overload. Later registrations of the same `(name, arg)`
    /// pair are shadowed by earlier ones.
    pub fn add(&mut self, name: &str, arg: Type, result: Type, func: NativeFn) {
        self.map
            .entry(name.to_string())
            .or_default()
            .push(Overload { arg, result, func });
    }

    /// Resolve a call site to the first structurally matching overload.
    pub fn resolve(&self, name: &str, arg: &Type) -> Option<&Overload> {
        self.map
            .get(name)?
            .iter()
            .find(|overload| overload.arg == *arg)
    }

    /// Whether any overload exists under this name.
    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }
}

/// Render a call site the way a user wrote it: tuple arguments are shown as
/// an argument list, anything else as a single argument.
pub fn call_signature(name: &str, arg: &Type) -> String {
    match arg.tag() {
        Tag::Tup => {
            let args: Vec<String> = arg.children().iter().map(|c| c.to_string()).collect();
            format!("{}({})", name, args.join(", "))
        }
        _ => format!("{}({})", name, arg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_core::Error;
    use sift_vm::Object;

    fn noop(_arg: &Object, _out: &mut Object) -> Result<(), Error> {
        Ok(())
    }

    fn other(_arg: &Object, out: &mut Object) -> Result<(), Error> {
        *out = Object::Int(1);
        Ok(())
    }

    #[test]
    fn resolution_is_structural() {
        let mut funcs = Functions::new();
        funcs.add("f", Type::str(), Type::uint(), noop);
        funcs.add("f", Type::tup(vec![Type::str(), Type::str()]), Type::str(), noop);

        assert!(funcs.resolve("f", &Type::str()).is_some());
        assert!(
            funcs
                .resolve("f", &Type::tup(vec![Type::str(), Type::str()]))
                .is_some()
        );
        assert!(funcs.resolve("f", &Type::uint()).is_none());
        assert!(funcs.resolve("g", &Type::str()).is_none());
    }

    #[test]
    fn first_registration_wins() {
        let mut funcs = Functions::new();
        funcs.add("f", Type::str(), Type::uint(), noop);
        funcs.add("f", Type::str(), Type::int(), other);

        let overload = funcs.resolve("f", &Type::str()).unwrap();
        assert_eq!(overload.result, Type::uint());
    }

    #[test]
    fn resolution_is_repeatable() {
        let mut funcs = Functions::new();
        funcs.add("f", Type::str(), Type::uint(), noop);
        funcs.add("f", Type::int(), Type::int(), other);

        let a = funcs.resolve("f", &Type::str()).unwrap() as *const Overload;
        let b = funcs.resolve("f", &Type::str()).unwrap() as *const Overload;
        assert_eq!(a, b);
    }

    #[test]
    fn signatures_render_like_calls() {
        assert_eq!(call_signature("grep", &Type::str()), "grep(Str)");
        assert_eq!(
            call_signature("cut", &Type::tup(vec![Type::str(), Type::str(), Type::int()])),
            "cut(Str, Str, Int)"
        );
    }
}
