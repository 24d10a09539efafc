//! Numeric built-ins: real transcendentals, absolute value, explicit casts,
//! and container cardinality.
//!
//! The casts are the language's only bridge between Int and UInt operands:
//! mixed integral arithmetic is a type error until one side goes through
//! `int()` or `uint()`.

use sift_core::{Error, Type};
use sift_lang::Functions;
use sift_vm::Object;

fn real_in(name: &str, arg: &Object) -> Result<f64, Error> {
    arg.as_real()
        .ok_or_else(|| Error::internal(format!("{}: argument is not a real", name)))
}

fn sqrt(arg: &Object, out: &mut Object) -> Result<(), Error> {
    *out = Object::Real(real_in("sqrt", arg)?.sqrt());
    Ok(())
}

fn exp(arg: &Object, out: &mut Object) -> Result<(), Error> {
    *out = Object::Real(real_in("exp", arg)?.exp());
    Ok(())
}

fn log(arg: &Object, out: &mut Object) -> Result<(), Error> {
    *out = Object::Real(real_in("log", arg)?.ln());
    Ok(())
}

fn sin(arg: &Object, out: &mut Object) -> Result<(), Error> {
    *out = Object::Real(real_in("sin", arg)?.sin());
    Ok(())
}

fn cos(arg: &Object, out: &mut Object) -> Result<(), Error> {
    *out = Object::Real(real_in("cos", arg)?.cos());
    Ok(())
}

fn abs_real(arg: &Object, out: &mut Object) -> Result<(), Error> {
    *out = Object::Real(real_in("abs", arg)?.abs());
    Ok(())
}

fn abs_int(arg: &Object, out: &mut Object) -> Result<(), Error> {
    let v = arg
        .as_int()
        .ok_or_else(|| Error::internal("abs: argument is not an integer"))?;
    *out = Object::Int(v.wrapping_abs());
    Ok(())
}

// Casts. Integral conversions reinterpret two's complement; conversions
// from real truncate toward zero.

fn int_of_uint(arg: &Object, out: &mut Object) -> Result<(), Error> {
    let v = arg
        .as_uint()
        .ok_or_else(|| Error::internal("int: argument is not an unsigned integer"))?;
    *out = Object::Int(v as i64);
    Ok(())
}

fn int_of_real(arg: &Object, out: &mut Object) -> Result<(), Error> {
    *out = Object::Int(real_in("int", arg)? as i64);
    Ok(())
}

fn uint_of_int(arg: &Object, out: &mut Object) -> Result<(), Error> {
    let v = arg
        .as_int()
        .ok_or_else(|| Error::internal("uint: argument is not an integer"))?;
    *out = Object::UInt(v as u64);
    Ok(())
}

fn uint_of_real(arg: &Object, out: &mut Object) -> Result<(), Error> {
    *out = Object::UInt(real_in("uint", arg)? as u64);
    Ok(())
}

fn real_of_int(arg: &Object, out: &mut Object) -> Result<(), Error> {
    let v = arg
        .as_int()
        .ok_or_else(|| Error::internal("real: argument is not an integer"))?;
    *out = Object::Real(v as f64);
    Ok(())
}

fn real_of_uint(arg: &Object, out: &mut Object) -> Result<(), Error> {
    let v = arg
        .as_uint()
        .ok_or_else(|| Error::internal("real: argument is not an unsigned integer"))?;
    *out = Object::Real(v as f64);
    Ok(())
}

fn count(arg: &Object, out: &mut Object) -> Result<(), Error> {
    let n = match arg {
        Object::Str(s) => s.len(),
        Object::Array(items) => items.len(),
        Object::Map(entries) => entries.len(),
        other => {
            return Err(Error::internal(format!(
                "count: argument is not countable, got {}",
                other.type_name()
            )));
        }
    };
    *out = Object::UInt(n as u64);
    Ok(())
}

pub(crate) fn register(funcs: &mut Functions) {
    funcs.add("sqrt", Type::real(), Type::real(), sqrt);
    funcs.add("exp", Type::real(), Type::real(), exp);
    funcs.add("log", Type::real(), Type::real(), log);
    funcs.add("sin", Type::real(), Type::real(), sin);
    funcs.add("cos", Type::real(), Type::real(), cos);

    funcs.add("abs", Type::real(), Type::real(), abs_real);
    funcs.add("abs", Type::int(), Type::int(), abs_int);

    funcs.add("int", Type::uint(), Type::int(), int_of_uint);
    funcs.add("int", Type::real(), Type::int(), int_of_real);
    funcs.add("uint", Type::int(), Type::uint(), uint_of_int);
    funcs.add("uint", Type::real(), Type::uint(), uint_of_real);
    funcs.add("real", Type::int(), Type::real(), real_of_int);
    funcs.add("real", Type::uint(), Type::real(), real_of_uint);

    // Cardinality over strings (bytes) and each atom-element container.
    funcs.add("count", Type::str(), Type::uint(), count);
    for elem in [Type::str(), Type::int(), Type::uint(), Type::real()] {
        funcs.add("count", Type::arr(elem.clone()), Type::uint(), count);
        funcs.add(
            "count",
            Type::map(Type::str(), elem),
            Type::uint(),
            count,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_vm::obj;

    #[test]
    fn transcendentals() {
        let mut out = Object::Real(0.0);
        sqrt(&Object::Real(9.0), &mut out).unwrap();
        assert_eq!(out, Object::Real(3.0));

        log(&Object::Real(1.0), &mut out).unwrap();
        assert_eq!(out, Object::Real(0.0));
    }

    #[test]
    fn abs_families() {
        let mut out = Object::Real(0.0);
        abs_real(&Object::Real(-2.5), &mut out).unwrap();
        assert_eq!(out, Object::Real(2.5));

        let mut out = Object::Int(0);
        abs_int(&Object::Int(-7), &mut out).unwrap();
        assert_eq!(out, Object::Int(7));
    }

    #[test]
    fn casts_truncate_and_reinterpret() {
        let mut out = Object::Int(0);
        int_of_real(&Object::Real(2.9), &mut out).unwrap();
        assert_eq!(out, Object::Int(2));
        int_of_real(&Object::Real(-2.9), &mut out).unwrap();
        assert_eq!(out, Object::Int(-2));

        let mut out = Object::UInt(0);
        uint_of_int(&Object::Int(-1), &mut out).unwrap();
        assert_eq!(out, Object::UInt(u64::MAX));

        let mut out = Object::Real(0.0);
        real_of_uint(&Object::UInt(3), &mut out).unwrap();
        assert_eq!(out, Object::Real(3.0));
    }

    #[test]
    fn count_containers() {
        let mut out = Object::UInt(0);
        count(&Object::Str("abc".into()), &mut out).unwrap();
        assert_eq!(out, Object::UInt(3));

        count(
            &Object::Array(vec![obj(Object::Int(1)), obj(Object::Int(2))]),
            &mut out,
        )
        .unwrap();
        assert_eq!(out, Object::UInt(2));
    }
}
