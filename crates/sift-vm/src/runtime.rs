//! The two-pass interpreter.
//!
//! `init` walks the command stream (recursing into closure blocks) and
//! pre-allocates one result cell per command, so the run pass never
//! allocates per step. `run` is a single linear scan dispatching on the
//! opcode. Sequencer advancement re-enters `run` on a closure block using
//! the same stack and variable frame: a mark is taken before descent and the
//! stack is truncated back to it afterwards, keeping the one produced value.
//!
//! Integer arithmetic wraps on two's-complement overflow. Division truncates
//! toward zero and `%` is the remainder with the dividend's sign; both raise
//! an arithmetic error when the divisor is zero. Real arithmetic follows
//! IEEE semantics.

use std::io::{BufRead, Write};
use std::rc::Rc;

use sift_core::{Atom, Error, Interner};

use crate::command::{Block, Command, Imm, Op};
use crate::object::{ObjRef, Object, obj};
use crate::print;
use crate::sequence::{self, SeqState};

/// The operand stack and the variable frame for a single run.
#[derive(Debug)]
pub struct Runtime {
    stack: Vec<ObjRef>,
    vars: Vec<Option<ObjRef>>,
}

impl Runtime {
    pub fn new(nvars: usize) -> Self {
        Self {
            stack: Vec::new(),
            vars: vec![None; nvars],
        }
    }

    pub fn set_var(&mut self, slot: u32, o: ObjRef) {
        self.vars[slot as usize] = Some(o);
    }

    pub fn get_var(&self, slot: u32) -> Result<ObjRef, Error> {
        self.vars
            .get(slot as usize)
            .and_then(|v| v.clone())
            .ok_or_else(|| Error::internal(format!("variable slot {} read before write", slot)))
    }

    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    fn push(&mut self, o: ObjRef) {
        self.stack.push(o);
    }

    fn pop(&mut self) -> Result<ObjRef, Error> {
        self.stack
            .pop()
            .ok_or_else(|| Error::internal("operand stack underflow".to_string()))
    }

    fn top(&self) -> Result<&ObjRef, Error> {
        self.stack
            .last()
            .ok_or_else(|| Error::internal("operand stack underflow".to_string()))
    }
}

fn cell(c: &Command) -> Result<&ObjRef, Error> {
    c.cell
        .get()
        .ok_or_else(|| Error::internal(format!("{} executed before init", c.op.name())))
}

fn set_cell(c: &Command, o: ObjRef) -> Result<(), Error> {
    c.cell
        .set(o)
        .map_err(|_| Error::internal(format!("{} initialized twice", c.op.name())))
}

/// The init pass: pre-allocate every command's result cell.
///
/// Must run exactly once, before `run`.
pub fn init(code: &[Command], interner: &Interner) -> Result<(), Error> {
    for c in code {
        for block in &c.closures {
            init(&block.code, interner)?;
        }

        match c.op {
            Op::Val => {
                let o = match c.arg {
                    Imm::Atom(Atom::Int(v)) => Object::Int(v),
                    Imm::Atom(Atom::UInt(v)) => Object::UInt(v),
                    Imm::Atom(Atom::Real(v)) => Object::Real(v),
                    Imm::Atom(Atom::Str(sym)) => {
                        let text = interner.resolve(sym).ok_or_else(|| {
                            Error::internal("string literal missing from the interner")
                        })?;
                        Object::Str(text.to_owned())
                    }
                    _ => {
                        return Err(Error::internal("VAL without a literal immediate"));
                    }
                };
                set_cell(c, obj(o))?;
            }
            Op::Vaw => {}
            Op::Flat => {
                set_cell(c, obj(Object::Seq(SeqState::Stopped)))?;
            }
            _ => {
                set_cell(c, obj(Object::default_for(&c.ty)?))?;
            }
        }
    }
    Ok(())
}

/// Evaluate a closure block and hand back the single value it produced.
fn exec_closure(rt: &mut Runtime, block: &Block) -> Result<ObjRef, Error> {
    let mark = rt.stack.len();
    run(&block.code, rt)?;

    let o = rt.top()?.clone();
    rt.stack.truncate(mark);
    Ok(o)
}

/// Advance a sequencer one step. `None` means the sequence is exhausted.
pub fn seq_next(rt: &mut Runtime, seq: &ObjRef) -> Result<Option<ObjRef>, Error> {
    enum Step {
        Done,
        Yield(ObjRef),
        Gen {
            source: ObjRef,
            slot: u32,
            body: Rc<Block>,
        },
        Flat {
            outer: ObjRef,
            inner: Option<ObjRef>,
        },
    }

    // Decide what to do under a short borrow; the re-entrant cases release
    // the borrow before touching the machine again.
    let step = {
        let mut o = seq.borrow_mut();
        let state = match &mut *o {
            Object::Seq(state) => state,
            other => {
                return Err(Error::internal(format!(
                    "expected a sequence, got {}",
                    other.type_name()
                )));
            }
        };
        match state {
            SeqState::Stopped => Step::Done,
            SeqState::Items { items, pos } => {
                if *pos < items.len() {
                    let v = items[*pos].borrow().deep_clone();
                    *pos += 1;
                    Step::Yield(obj(v))
                } else {
                    Step::Done
                }
            }
            SeqState::File { input } => match sequence::next_line(input.as_mut())? {
                Some(line) => Step::Yield(obj(Object::Str(line))),
                None => Step::Done,
            },
            SeqState::Generator { source, slot, body } => Step::Gen {
                source: source.clone(),
                slot: *slot,
                body: Rc::clone(body),
            },
            SeqState::Flatten { outer, inner } => Step::Flat {
                outer: outer.clone(),
                inner: inner.clone(),
            },
        }
    };

    match step {
        Step::Done => Ok(None),
        Step::Yield(v) => Ok(Some(v)),
        Step::Gen { source, slot, body } => match seq_next(rt, &source)? {
            None => Ok(None),
            Some(elem) => {
                rt.set_var(slot, elem);
                let v = exec_closure(rt, &body)?;
                Ok(Some(v))
            }
        },
        Step::Flat { outer, mut inner } => {
            loop {
                if let Some(cur) = &inner {
                    if let Some(v) = seq_next(rt, cur)? {
                        return Ok(Some(v));
                    }
                }
                match seq_next(rt, &outer)? {
                    None => return Ok(None),
                    Some(elem) => {
                        let next_inner = as_sequence(elem)?;
                        set_flatten_inner(seq, &next_inner)?;
                        inner = Some(next_inner);
                    }
                }
            }
        }
    }
}

/// View a value as a sequence: sequences pass through, arrays get an
/// element sequencer.
fn as_sequence(o: ObjRef) -> Result<ObjRef, Error> {
    let wrapped = {
        match &*o.borrow() {
            Object::Seq(_) => None,
            Object::Array(items) => Some(obj(Object::Seq(SeqState::Items {
                items: items.clone(),
                pos: 0,
            }))),
            other => {
                return Err(Error::internal(format!(
                    "cannot iterate a value of type {}",
                    other.type_name()
                )));
            }
        }
    };
    Ok(wrapped.unwrap_or(o))
}

fn set_flatten_inner(seq: &ObjRef, inner: &ObjRef) -> Result<(), Error> {
    match &mut *seq.borrow_mut() {
        Object::Seq(SeqState::Flatten { inner: slot, .. }) => {
            *slot = Some(inner.clone());
            Ok(())
        }
        _ => Err(Error::internal("flatten state lost during advance")),
    }
}

/// Build the sequencer state for a wrapped container: array elements in
/// order, or map entries as (key, value) tuples.
fn wrap_source(src: &ObjRef) -> Result<SeqState, Error> {
    match &*src.borrow() {
        Object::Array(items) => Ok(SeqState::Items {
            items: items.clone(),
            pos: 0,
        }),
        Object::Map(entries) => {
            let items = entries
                .iter()
                .map(|(k, v)| obj(Object::Tuple(vec![obj(k.deep_clone()), v.clone()])))
                .collect();
            Ok(SeqState::Items { items, pos: 0 })
        }
        other => Err(Error::internal(format!(
            "cannot sequence a value of type {}",
            other.type_name()
        ))),
    }
}

/// Drain a sequencer into an array cell.
fn fill_array(rt: &mut Runtime, seq: &ObjRef, dst: &ObjRef) -> Result<(), Error> {
    match &mut *dst.borrow_mut() {
        Object::Array(items) => items.clear(),
        other => {
            return Err(Error::internal(format!(
                "ARR into a value of type {}",
                other.type_name()
            )));
        }
    }
    while let Some(v) = seq_next(rt, seq)? {
        let snapshot = v.borrow().deep_clone();
        match &mut *dst.borrow_mut() {
            Object::Array(items) => items.push(obj(snapshot)),
            _ => return Err(Error::internal("array cell changed shape during fill")),
        }
    }
    Ok(())
}

/// Drain a sequencer of (key, value) tuples into a map cell.
fn fill_map(rt: &mut Runtime, seq: &ObjRef, dst: &ObjRef) -> Result<(), Error> {
    match &mut *dst.borrow_mut() {
        Object::Map(entries) => entries.clear(),
        other => {
            return Err(Error::internal(format!(
                "MAP into a value of type {}",
                other.type_name()
            )));
        }
    }
    while let Some(v) = seq_next(rt, seq)? {
        let (key, value) = {
            let pair = v.borrow();
            let fields = pair
                .as_tuple()
                .ok_or_else(|| Error::internal("MAP source did not yield pairs"))?;
            if fields.len() != 2 {
                return Err(Error::internal("MAP source did not yield pairs"));
            }
            (fields[0].borrow().deep_clone(), fields[1].borrow().deep_clone())
        };
        match &mut *dst.borrow_mut() {
            Object::Map(entries) => {
                entries.insert(key, obj(value));
            }
            _ => return Err(Error::internal("map cell changed shape during fill")),
        }
    }
    Ok(())
}

enum Integral {
    I(i64),
    U(u64),
}

fn integral_of(o: &ObjRef) -> Result<Integral, Error> {
    match &*o.borrow() {
        Object::Int(v) => Ok(Integral::I(*v)),
        Object::UInt(v) => Ok(Integral::U(*v)),
        other => Err(Error::internal(format!(
            "expected an integral operand, got {}",
            other.type_name()
        ))),
    }
}

fn real_of(o: &ObjRef) -> Result<f64, Error> {
    o.borrow().as_real().ok_or_else(|| {
        Error::internal(format!(
            "expected a real operand, got {}",
            o.borrow().type_name()
        ))
    })
}

fn int_binop(op: Op, b: i64, a: i64) -> Result<i64, Error> {
    Ok(match op {
        Op::MulInt => b.wrapping_mul(a),
        Op::DivInt => {
            if a == 0 {
                return Err(Error::Arithmetic("Division by zero".into()));
            }
            b.wrapping_div(a)
        }
        Op::ModInt => {
            if a == 0 {
                return Err(Error::Arithmetic("Modulus by zero".into()));
            }
            b.wrapping_rem(a)
        }
        Op::AddInt => b.wrapping_add(a),
        Op::SubInt => b.wrapping_sub(a),
        Op::BitAnd => b & a,
        Op::BitOr => b | a,
        Op::BitXor => b ^ a,
        _ => return Err(Error::internal(format!("{} is not an Int opcode", op.name()))),
    })
}

fn uint_binop(op: Op, b: u64, a: u64) -> Result<u64, Error> {
    Ok(match op {
        Op::MulInt => b.wrapping_mul(a),
        Op::DivInt => {
            if a == 0 {
                return Err(Error::Arithmetic("Division by zero".into()));
            }
            b / a
        }
        Op::ModInt => {
            if a == 0 {
                return Err(Error::Arithmetic("Modulus by zero".into()));
            }
            b % a
        }
        Op::AddInt => b.wrapping_add(a),
        Op::SubInt => b.wrapping_sub(a),
        Op::BitAnd => b & a,
        Op::BitOr => b | a,
        Op::BitXor => b ^ a,
        _ => return Err(Error::internal(format!("{} is not a UInt opcode", op.name()))),
    })
}

fn real_binop(op: Op, b: f64, a: f64) -> Result<f64, Error> {
    Ok(match op {
        Op::Exp => b.powf(a),
        Op::MulReal => b * a,
        Op::DivReal => b / a,
        Op::AddReal => b + a,
        Op::SubReal => b - a,
        _ => {
            return Err(Error::internal(format!("{} is not a Real opcode", op.name())));
        }
    })
}

/// The run pass: one linear scan over the commands.
pub fn run(code: &[Command], rt: &mut Runtime) -> Result<(), Error> {
    for c in code {
        match c.op {
            Op::Fun => {
                let arg = exec_closure(rt, c.closure(0)?)?;
                let out = cell(c)?.clone();
                let f = c
                    .func
                    .ok_or_else(|| Error::internal("FUN without a native callable"))?;
                {
                    let a = arg.borrow();
                    let mut o = out.borrow_mut();
                    f(&a, &mut o)?;
                }
                rt.push(out);
            }
            Op::Var => {
                let v = rt.get_var(c.slot()?)?;
                rt.push(v);
            }
            Op::Vaw => {
                let v = rt.pop()?;
                rt.set_var(c.slot()?, v);
            }
            Op::Val => {
                rt.push(cell(c)?.clone());
            }
            Op::Idx => {
                let key = exec_closure(rt, c.closure(0)?)?;
                let out = cell(c)?.clone();
                let cont = rt.pop()?;
                {
                    let k = key.borrow();
                    cont.borrow().index_into(&k, &out)?;
                }
                rt.push(out);
            }
            Op::Tup => {
                let out = cell(c)?.clone();
                let n = match &*out.borrow() {
                    Object::Tuple(fields) => fields.len(),
                    other => {
                        return Err(Error::internal(format!(
                            "TUP into a value of type {}",
                            other.type_name()
                        )));
                    }
                };
                if rt.stack.len() < n {
                    return Err(Error::internal("operand stack underflow".to_string()));
                }
                let start = rt.stack.len() - n;
                let values: Vec<ObjRef> = rt.stack.drain(start..).collect();
                if let Object::Tuple(fields) = &mut *out.borrow_mut() {
                    for (field, value) in fields.iter_mut().zip(values) {
                        *field = value;
                    }
                }
                rt.push(out);
            }
            Op::Seq => {
                let src = rt.pop()?;
                let already = matches!(&*src.borrow(), Object::Seq(_));
                if already {
                    rt.push(src);
                } else {
                    let out = cell(c)?.clone();
                    let state = wrap_source(&src)?;
                    *out.borrow_mut() = Object::Seq(state);
                    rt.push(out);
                }
            }
            Op::Gen => {
                // The source closure runs exactly once, here; the resulting
                // sequencer is then stepped by whatever consumes the
                // generator.
                let slot = c.slot()?;
                let source = exec_closure(rt, c.closure(1)?)?;
                let body = Rc::clone(c.closure(0)?);
                let out = cell(c)?.clone();
                *out.borrow_mut() = Object::Seq(SeqState::Generator { source, slot, body });
                rt.push(out);
            }
            Op::Arr => {
                let seq = rt.pop()?;
                let out = cell(c)?.clone();
                fill_array(rt, &seq, &out)?;
                rt.push(out);
            }
            Op::Map => {
                let seq = rt.pop()?;
                let out = cell(c)?.clone();
                fill_map(rt, &seq, &out)?;
                rt.push(out);
            }
            Op::Flat => {
                let seq = rt.pop()?;
                let out = cell(c)?.clone();
                *out.borrow_mut() = Object::Seq(SeqState::Flatten {
                    outer: seq,
                    inner: None,
                });
                rt.push(out);
            }
            Op::Exp | Op::MulReal | Op::DivReal | Op::AddReal | Op::SubReal => {
                let a = rt.pop()?;
                let av = real_of(&a)?;
                let b = rt.top()?.clone();
                let mut bo = b.borrow_mut();
                let bv = match &*bo {
                    Object::Real(v) => *v,
                    other => {
                        return Err(Error::internal(format!(
                            "expected a real operand, got {}",
                            other.type_name()
                        )));
                    }
                };
                *bo = Object::Real(real_binop(c.op, bv, av)?);
            }
            Op::MulInt
            | Op::DivInt
            | Op::ModInt
            | Op::AddInt
            | Op::SubInt
            | Op::BitAnd
            | Op::BitOr
            | Op::BitXor => {
                let a = rt.pop()?;
                let av = integral_of(&a)?;
                let b = rt.top()?.clone();
                let bv = integral_of(&b)?;
                let mut bo = b.borrow_mut();
                match (bv, av) {
                    (Integral::I(bv), Integral::I(av)) => {
                        *bo = Object::Int(int_binop(c.op, bv, av)?);
                    }
                    (Integral::U(bv), Integral::U(av)) => {
                        *bo = Object::UInt(uint_binop(c.op, bv, av)?);
                    }
                    _ => {
                        return Err(Error::internal("mixed integral operands".to_string()));
                    }
                }
            }
            Op::BitNot => {
                let t = rt.top()?.clone();
                let mut o = t.borrow_mut();
                match &mut *o {
                    Object::Int(v) => *v = !*v,
                    Object::UInt(v) => *v = !*v,
                    other => {
                        return Err(Error::internal(format!(
                            "NOT on a value of type {}",
                            other.type_name()
                        )));
                    }
                }
            }
            Op::IntToReal | Op::UintToReal => {
                let a = rt.pop()?;
                let v = match integral_of(&a)? {
                    Integral::I(v) => v as f64,
                    Integral::U(v) => v as f64,
                };
                let out = cell(c)?.clone();
                *out.borrow_mut() = Object::Real(v);
                rt.push(out);
            }
            Op::IntToRealUnder | Op::UintToRealUnder => {
                let saved = rt.pop()?;
                let a = rt.pop()?;
                let v = match integral_of(&a)? {
                    Integral::I(v) => v as f64,
                    Integral::U(v) => v as f64,
                };
                let out = cell(c)?.clone();
                *out.borrow_mut() = Object::Real(v);
                rt.push(out);
                rt.push(saved);
            }
        }
    }
    Ok(())
}

/// Run a complete program against an input stream and print the result.
///
/// Variable slot 0 holds the input line sequencer. On normal termination
/// the stack must hold exactly one value; anything else is a bug.
pub fn execute(
    code: &[Command],
    nvars: usize,
    input: Box<dyn BufRead>,
    interner: &Interner,
    out: &mut dyn Write,
) -> Result<(), Error> {
    let mut rt = Runtime::new(nvars.max(1));
    rt.set_var(0, obj(Object::Seq(SeqState::File { input })));

    init(code, interner)?;
    run(code, &mut rt)?;

    if rt.stack_len() != 1 {
        return Err(Error::internal("did not produce result"));
    }

    let res = rt.pop()?;
    print::print_object(&res.borrow(), out)?;
    out.write_all(b"\n").map_err(Error::from)?;
    Ok(())
}
