//! Result rendering.
//!
//! Scalars print in their plain decimal/text form. Inside containers,
//! strings are double-quoted so empty and delimiter-bearing pieces stay
//! readable: arrays as `[a, b]`, maps as `{k: v}`, tuples as `(a, b)`.

use std::io::Write;

use sift_core::Error;

use crate::object::Object;

/// Print a result value. The caller appends the trailing newline.
pub fn print_object(o: &Object, out: &mut dyn Write) -> Result<(), Error> {
    write_value(o, out, false)
}

fn write_value(o: &Object, out: &mut dyn Write, quoted: bool) -> Result<(), Error> {
    match o {
        Object::Int(v) => write!(out, "{}", v)?,
        Object::UInt(v) => write!(out, "{}", v)?,
        Object::Real(v) => write!(out, "{}", v)?,
        Object::Str(s) => {
            if quoted {
                write!(out, "{:?}", s)?;
            } else {
                write!(out, "{}", s)?;
            }
        }
        Object::Tuple(fields) => {
            write!(out, "(")?;
            for (i, f) in fields.iter().enumerate() {
                if i > 0 {
                    write!(out, ", ")?;
                }
                write_value(&f.borrow(), out, true)?;
            }
            write!(out, ")")?;
        }
        Object::Array(items) => {
            write!(out, "[")?;
            for (i, v) in items.iter().enumerate() {
                if i > 0 {
                    write!(out, ", ")?;
                }
                write_value(&v.borrow(), out, true)?;
            }
            write!(out, "]")?;
        }
        Object::Map(entries) => {
            write!(out, "{{")?;
            for (i, (k, v)) in entries.iter().enumerate() {
                if i > 0 {
                    write!(out, ", ")?;
                }
                write_value(k, out, true)?;
                write!(out, ": ")?;
                write_value(&v.borrow(), out, true)?;
            }
            write!(out, "}}")?;
        }
        Object::Seq(_) => {
            return Err(Error::internal("cannot print an unrealized sequence"));
        }
    }
    Ok(())
}
