//! Splitting on a literal delimiter.
//!
//! `cut(str, del)` produces every piece between non-overlapping occurrences
//! of `del`: empty pieces are preserved, and a trailing delimiter yields a
//! trailing empty piece, so joining the pieces with `del` reproduces the
//! input. `cut(str, del, n)` picks the n-th piece of the same split.

use sift_core::{Error, Type};
use sift_lang::Functions;
use sift_vm::{Object, obj};

fn cut(arg: &Object, out: &mut Object) -> Result<(), Error> {
    let fields = arg
        .as_tuple()
        .ok_or_else(|| Error::internal("cut: argument is not a tuple"))?;
    let text = fields[0].borrow();
    let text = text
        .as_str()
        .ok_or_else(|| Error::internal("cut: first argument is not a string"))?;
    let del = fields[1].borrow();
    let del = del
        .as_str()
        .ok_or_else(|| Error::internal("cut: second argument is not a string"))?;

    if del.is_empty() {
        return Err(Error::Lookup("Empty delimiter in 'cut'".into()));
    }

    *out = Object::Array(
        text.split(del)
            .map(|piece| obj(Object::Str(piece.to_string())))
            .collect(),
    );
    Ok(())
}

fn nth_piece(text: &str, del: &str, nth: usize) -> Result<String, Error> {
    if del.is_empty() {
        return Err(Error::Lookup("Empty delimiter in 'cut'".into()));
    }
    text.split(del)
        .nth(nth)
        .map(str::to_string)
        .ok_or_else(|| Error::Lookup("Substring not found in 'cut'".into()))
}

fn cut_nth_uint(arg: &Object, out: &mut Object) -> Result<(), Error> {
    let fields = arg
        .as_tuple()
        .ok_or_else(|| Error::internal("cut: argument is not a tuple"))?;
    let text = fields[0].borrow();
    let text = text
        .as_str()
        .ok_or_else(|| Error::internal("cut: first argument is not a string"))?;
    let del = fields[1].borrow();
    let del = del
        .as_str()
        .ok_or_else(|| Error::internal("cut: second argument is not a string"))?;
    let nth = fields[2]
        .borrow()
        .as_uint()
        .ok_or_else(|| Error::internal("cut: third argument is not an unsigned integer"))?;

    *out = Object::Str(nth_piece(text, del, nth as usize)?);
    Ok(())
}

fn cut_nth_int(arg: &Object, out: &mut Object) -> Result<(), Error> {
    let fields = arg
        .as_tuple()
        .ok_or_else(|| Error::internal("cut: argument is not a tuple"))?;
    let text = fields[0].borrow();
    let text = text
        .as_str()
        .ok_or_else(|| Error::internal("cut: first argument is not a string"))?;
    let del = fields[1].borrow();
    let del = del
        .as_str()
        .ok_or_else(|| Error::internal("cut: second argument is not a string"))?;
    let nth = fields[2]
        .borrow()
        .as_int()
        .ok_or_else(|| Error::internal("cut: third argument is not an integer"))?;

    // A negative index is rejected outright rather than reinterpreted.
    if nth < 0 {
        return Err(Error::Lookup("Negative piece index in 'cut'".into()));
    }

    *out = Object::Str(nth_piece(text, del, nth as usize)?);
    Ok(())
}

pub(crate) fn register(funcs: &mut Functions) {
    funcs.add(
        "cut",
        Type::tup(vec![Type::str(), Type::str()]),
        Type::arr(Type::str()),
        cut,
    );

    funcs.add(
        "cut",
        Type::tup(vec![Type::str(), Type::str(), Type::uint()]),
        Type::str(),
        cut_nth_uint,
    );

    funcs.add(
        "cut",
        Type::tup(vec![Type::str(), Type::str(), Type::int()]),
        Type::str(),
        cut_nth_int,
    );
}
