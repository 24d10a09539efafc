//! The compiled command stream.
//!
//! A program is a flat `Vec<Command>`; deferred sub-expressions (an index
//! key, a generator body, a generator source) are nested `Block`s reached
//! through a command's closure list. The init pass fills each command's
//! result cell exactly once; the run pass only reads it.

use std::cell::OnceCell;
use std::rc::Rc;

use smallvec::SmallVec;

use sift_core::{Atom, Error, Type};

use crate::object::{ObjRef, Object};

/// Opcodes, in the order the run pass dispatches them.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Op {
    /// Push the pre-allocated literal.
    Val,
    /// Push the reference held in a variable slot.
    Var,
    /// Pop the top of stack into a variable slot.
    Vaw,
    /// Evaluate the argument closure, invoke the native callable, push the
    /// result cell.
    Fun,
    /// Evaluate the key closure, fetch from the container on top of stack.
    Idx,
    /// Consume the top N stack entries into the tuple's fields, push it.
    Tup,
    /// Pop a container and push a sequencer over its contents.
    Seq,
    /// Install a per-element mapping over a source sequencer.
    Gen,
    /// Pop a sequencer, drain it into the array, push the array.
    Arr,
    /// Pop a sequencer of pairs, drain it into the map, push the map.
    Map,
    /// Pop a sequencer of sequences and push its one-level flattening.
    Flat,
    Exp,
    MulReal,
    DivReal,
    AddReal,
    SubReal,
    MulInt,
    DivInt,
    ModInt,
    AddInt,
    SubInt,
    BitAnd,
    BitOr,
    BitXor,
    BitNot,
    /// Lift the integral on top of stack to a real.
    IntToReal,
    /// Lift the integral one below the top, preserving stack order.
    IntToRealUnder,
    UintToReal,
    UintToRealUnder,
}

impl Op {
    /// Mnemonic used by the disassembler.
    pub fn name(self) -> &'static str {
        match self {
            Op::Val => "VAL",
            Op::Var => "VAR",
            Op::Vaw => "VAW",
            Op::Fun => "FUN",
            Op::Idx => "IDX",
            Op::Tup => "TUP",
            Op::Seq => "SEQ",
            Op::Gen => "GEN",
            Op::Arr => "ARR",
            Op::Map => "MAP",
            Op::Flat => "FLAT",
            Op::Exp => "EXP",
            Op::MulReal => "MUL_R",
            Op::DivReal => "DIV_R",
            Op::AddReal => "ADD_R",
            Op::SubReal => "SUB_R",
            Op::MulInt => "MUL_I",
            Op::DivInt => "DIV_I",
            Op::ModInt => "MOD",
            Op::AddInt => "ADD_I",
            Op::SubInt => "SUB_I",
            Op::BitAnd => "AND",
            Op::BitOr => "OR",
            Op::BitXor => "XOR",
            Op::BitNot => "NOT",
            Op::IntToReal => "I2R_1",
            Op::IntToRealUnder => "I2R_2",
            Op::UintToReal => "U2R_1",
            Op::UintToRealUnder => "U2R_2",
        }
    }
}

/// A command's small immediate.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Imm {
    None,
    /// A literal payload for VAL.
    Atom(Atom),
    /// A variable slot for VAR/VAW/GEN.
    Slot(u32),
}

/// A native built-in: reads the argument value, writes the result cell.
pub type NativeFn = fn(&Object, &mut Object) -> Result<(), Error>;

/// A nested command sequence and the type of the value it leaves behind.
#[derive(Debug)]
pub struct Block {
    pub code: Vec<Command>,
    pub ty: Type,
}

/// One opcode record in the flat program.
#[derive(Debug)]
pub struct Command {
    pub op: Op,
    pub arg: Imm,
    /// The result type this command produces; init uses it to size the cell.
    pub ty: Type,
    /// Zero, one, or two deferred blocks.
    pub closures: SmallVec<[Rc<Block>; 2]>,
    /// The result cell. Filled by the init pass, read by the run pass;
    /// execution is single-shot, so it is never refilled.
    pub cell: OnceCell<ObjRef>,
    /// The resolved native callable, for FUN only.
    pub func: Option<NativeFn>,
}

impl Command {
    pub fn new(op: Op, ty: Type) -> Self {
        Self {
            op,
            arg: Imm::None,
            ty,
            closures: SmallVec::new(),
            cell: OnceCell::new(),
            func: None,
        }
    }

    pub fn with_arg(op: Op, arg: Imm, ty: Type) -> Self {
        Self {
            op,
            arg,
            ty,
            closures: SmallVec::new(),
            cell: OnceCell::new(),
            func: None,
        }
    }

    /// The slot immediate, for opcodes that require one.
    pub fn slot(&self) -> Result<u32, Error> {
        match self.arg {
            Imm::Slot(ix) => Ok(ix),
            _ => Err(Error::internal(format!(
                "{} without a slot immediate",
                self.op.name()
            ))),
        }
    }

    /// The closure at `ix`, for opcodes that require one.
    pub fn closure(&self, ix: usize) -> Result<&Rc<Block>, Error> {
        self.closures.get(ix).ok_or_else(|| {
            Error::internal(format!("{} missing closure {}", self.op.name(), ix))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_immediate_is_checked() {
        let c = Command::with_arg(Op::Var, Imm::Slot(3), Type::str());
        assert_eq!(c.slot().unwrap(), 3);

        let c = Command::new(Op::Var, Type::str());
        assert!(c.slot().is_err());
    }

    #[test]
    fn missing_closure_is_an_error() {
        let c = Command::new(Op::Fun, Type::str());
        assert!(c.closure(0).is_err());
    }

    #[test]
    fn cell_fills_once() {
        let c = Command::new(Op::Val, Type::int());
        assert!(c.cell.set(crate::object::obj(Object::Int(1))).is_ok());
        assert!(c.cell.set(crate::object::obj(Object::Int(2))).is_err());
    }
}
