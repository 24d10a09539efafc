//! Lowering: typed tree → flat command stream.
//!
//! Lowering is bottom-up and preserves evaluation order: for every node the
//! emitted commands leave exactly that node's value on the operand stack.
//! Deferred sub-expressions — an index key, a generator body, a generator
//! source — become nested closure blocks instead of inline code.

use std::rc::Rc;

use smallvec::smallvec;

use sift_core::Type;
use sift_vm::{Block, Command, Imm, Op};

use crate::ast::BinOp;
use crate::typecheck::{Lift, Numeric, TypedExpr, TypedNode, TypedProgram};

/// A lowered program, ready for the VM.
#[derive(Debug)]
pub struct CompiledProgram {
    pub code: Vec<Command>,
    /// Variable frame size, including slot 0 for the input.
    pub nvars: usize,
    /// The type of the printed result.
    pub ty: Type,
}

/// Lower a checked program.
pub fn compile(program: &TypedProgram) -> CompiledProgram {
    let mut code = Vec::new();

    for (slot, value) in &program.bindings {
        emit(value, &mut code);
        code.push(Command::with_arg(Op::Vaw, Imm::Slot(*slot), Type::none()));
    }
    emit(&program.body, &mut code);

    CompiledProgram {
        code,
        nvars: program.nvars,
        ty: program.body.ty.clone(),
    }
}

/// Lower an expression into its own closure block.
fn block_of(e: &TypedExpr) -> Rc<Block> {
    let mut code = Vec::new();
    emit(e, &mut code);
    Rc::new(Block {
        code,
        ty: e.ty.clone(),
    })
}

fn emit(e: &TypedExpr, out: &mut Vec<Command>) {
    match &e.node {
        TypedNode::Val(atom) => {
            out.push(Command::with_arg(Op::Val, Imm::Atom(*atom), e.ty.clone()));
        }
        TypedNode::Var(slot) => {
            out.push(Command::with_arg(Op::Var, Imm::Slot(*slot), e.ty.clone()));
        }
        TypedNode::Fun { func, arg } => {
            let mut c = Command::new(Op::Fun, e.ty.clone());
            c.closures = smallvec![block_of(arg)];
            c.func = Some(*func);
            out.push(c);
        }
        TypedNode::Idx { base, key } => {
            emit(base, out);
            let mut c = Command::new(Op::Idx, e.ty.clone());
            c.closures = smallvec![block_of(key)];
            out.push(c);
        }
        TypedNode::Tup(fields) => {
            for field in fields {
                emit(field, out);
            }
            out.push(Command::new(Op::Tup, e.ty.clone()));
        }
        TypedNode::Wrap(inner) => {
            emit(inner, out);
            out.push(Command::new(Op::Seq, e.ty.clone()));
        }
        TypedNode::Gen { slot, body, source } => {
            // Closure 0 is the body, closure 1 produces the source; the VM
            // evaluates the source closure once when the generator runs.
            let mut c = Command::with_arg(Op::Gen, Imm::Slot(*slot), e.ty.clone());
            c.closures = smallvec![block_of(body), block_of(source)];
            out.push(c);
        }
        TypedNode::Collect(inner) => {
            emit(inner, out);
            out.push(Command::new(Op::Arr, e.ty.clone()));
        }
        TypedNode::CollectMap(inner) => {
            emit(inner, out);
            out.push(Command::new(Op::Map, e.ty.clone()));
        }
        TypedNode::Flatten(inner) => {
            emit(inner, out);
            out.push(Command::new(Op::Flat, e.ty.clone()));
        }
        TypedNode::Bin {
            op,
            numeric,
            lhs_lift,
            rhs_lift,
            lhs,
            rhs,
        } => {
            emit(lhs, out);
            emit(rhs, out);
            // The left operand sits one below the top, so its lift targets
            // the entry under the top of stack.
            if let Some(lift) = lhs_lift {
                let op = match lift {
                    Lift::Int => Op::IntToRealUnder,
                    Lift::UInt => Op::UintToRealUnder,
                };
                out.push(Command::new(op, Type::real()));
            }
            if let Some(lift) = rhs_lift {
                let op = match lift {
                    Lift::Int => Op::IntToReal,
                    Lift::UInt => Op::UintToReal,
                };
                out.push(Command::new(op, Type::real()));
            }
            out.push(Command::new(binop_opcode(*op, *numeric), e.ty.clone()));
        }
        TypedNode::Not(inner) => {
            emit(inner, out);
            out.push(Command::new(Op::BitNot, e.ty.clone()));
        }
    }
}

fn binop_opcode(op: BinOp, numeric: Numeric) -> Op {
    match (op, numeric) {
        (BinOp::Pow, _) => Op::Exp,
        (BinOp::Add, Numeric::Real) => Op::AddReal,
        (BinOp::Sub, Numeric::Real) => Op::SubReal,
        (BinOp::Mul, Numeric::Real) => Op::MulReal,
        (BinOp::Div, Numeric::Real) => Op::DivReal,
        (BinOp::Add, _) => Op::AddInt,
        (BinOp::Sub, _) => Op::SubInt,
        (BinOp::Mul, _) => Op::MulInt,
        (BinOp::Div, _) => Op::DivInt,
        (BinOp::Mod, _) => Op::ModInt,
        (BinOp::BitAnd, _) => Op::BitAnd,
        (BinOp::BitOr, _) => Op::BitOr,
        (BinOp::BitXor, _) => Op::BitXor,
    }
}
