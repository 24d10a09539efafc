//! Type inference and name resolution.
//!
//! Walks the untyped tree bottom-up, giving every node a structural type and
//! resolving names, overloads, and numeric promotions along the way. The
//! checker also owns variable slot allocation: slot 0 is the input sequence,
//! and every binding and generator loop variable gets its own slot.
//!
//! Promotion is explicit in the tree: when a binary arithmetic operator sees
//! one real and one integral operand, the integral side is marked for a lift
//! to real (position-aware, so the lowered conversion targets the right
//! stack entry). Mixing Int and UInt without an explicit cast is an error.

use std::collections::HashMap;

use sift_core::{Atom, Error, Interner, Tag, Type};
use sift_vm::NativeFn;

use crate::ast::{BinOp, Expr, Program, UnOp};
use crate::registry::{Functions, call_signature};

/// Which opcode family a binary operator resolved into.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Numeric {
    Int,
    UInt,
    Real,
}

/// A pending integral-to-real conversion on one operand.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Lift {
    Int,
    UInt,
}

/// A type-resolved expression node.
#[derive(Debug)]
pub enum TypedNode {
    Val(Atom),
    Var(u32),
    Fun {
        func: NativeFn,
        arg: Box<TypedExpr>,
    },
    Idx {
        base: Box<TypedExpr>,
        key: Box<TypedExpr>,
    },
    Tup(Vec<TypedExpr>),
    /// Wrap a container into a sequence over its contents.
    Wrap(Box<TypedExpr>),
    Gen {
        slot: u32,
        body: Box<TypedExpr>,
        source: Box<TypedExpr>,
    },
    /// Materialize a sequence into an array.
    Collect(Box<TypedExpr>),
    /// Materialize a sequence of pairs into a map.
    CollectMap(Box<TypedExpr>),
    /// Flatten a sequence of sequences by one level.
    Flatten(Box<TypedExpr>),
    Bin {
        op: BinOp,
        numeric: Numeric,
        lhs_lift: Option<Lift>,
        rhs_lift: Option<Lift>,
        lhs: Box<TypedExpr>,
        rhs: Box<TypedExpr>,
    },
    Not(Box<TypedExpr>),
}

#[derive(Debug)]
pub struct TypedExpr {
    pub node: TypedNode,
    pub ty: Type,
}

/// A fully checked program: bindings in evaluation order, the result
/// expression, and the variable frame size.
#[derive(Debug)]
pub struct TypedProgram {
    pub bindings: Vec<(u32, TypedExpr)>,
    pub body: TypedExpr,
    pub nvars: usize,
}

impl TypedProgram {
    /// The type of the printed result.
    pub fn ty(&self) -> &Type {
        &self.body.ty
    }
}

/// Check a parsed program against a function registry.
pub fn check(
    program: &Program,
    funcs: &Functions,
    interner: &mut Interner,
) -> Result<TypedProgram, Error> {
    let mut checker = Checker {
        funcs,
        interner,
        names: HashMap::new(),
        gens: Vec::new(),
        next_slot: 1,
    };

    let mut bindings = Vec::new();
    for (name, value) in &program.bindings {
        let typed = checker.expr(value)?;
        let slot = checker.alloc_slot();
        checker.names.insert(name.clone(), (slot, typed.ty.clone()));
        bindings.push((slot, typed));
    }

    let mut body = checker.expr(&program.body)?;

    // A sequence result would not be printable; materialize it.
    if body.ty.tag() == Tag::Seq {
        let elem = body.ty.children()[0].clone();
        body = TypedExpr {
            ty: Type::arr(elem),
            node: TypedNode::Collect(Box::new(body)),
        };
    }

    Ok(TypedProgram {
        bindings,
        body,
        nvars: checker.next_slot as usize,
    })
}

struct Checker<'a> {
    funcs: &'a Functions,
    interner: &'a mut Interner,
    names: HashMap<String, (u32, Type)>,
    /// Innermost-last stack of generator loop variables.
    gens: Vec<(u32, Type)>,
    next_slot: u32,
}

impl<'a> Checker<'a> {
    fn alloc_slot(&mut self) -> u32 {
        let slot = self.next_slot;
        self.next_slot += 1;
        slot
    }

    fn expr(&mut self, e: &Expr) -> Result<TypedExpr, Error> {
        match e {
            Expr::Int(v) => Ok(TypedExpr {
                node: TypedNode::Val(Atom::Int(*v)),
                ty: Type::int(),
            }),
            Expr::UInt(v) => Ok(TypedExpr {
                node: TypedNode::Val(Atom::UInt(*v)),
                ty: Type::uint(),
            }),
            Expr::Real(v) => Ok(TypedExpr {
                node: TypedNode::Val(Atom::Real(*v)),
                ty: Type::real(),
            }),
            Expr::Str(s) => {
                let sym = self.interner.intern(s);
                Ok(TypedExpr {
                    node: TypedNode::Val(Atom::Str(sym)),
                    ty: Type::str(),
                })
            }
            Expr::At => match self.gens.last() {
                Some((slot, ty)) => Ok(TypedExpr {
                    node: TypedNode::Var(*slot),
                    ty: ty.clone(),
                }),
                None => Ok(TypedExpr {
                    node: TypedNode::Var(0),
                    ty: Type::seq(Type::str()),
                }),
            },
            Expr::Ident(name) => match self.names.get(name) {
                Some((slot, ty)) => Ok(TypedExpr {
                    node: TypedNode::Var(*slot),
                    ty: ty.clone(),
                }),
                None => Err(Error::type_mismatch(format!("Unknown name: '{}'", name))),
            },
            Expr::Unary { op: UnOp::Not, expr } => {
                let operand = self.expr(expr)?;
                if !operand.ty.is_integral() {
                    return Err(Error::type_mismatch(format!(
                        "Operator '~' expects an integral operand, got {}",
                        operand.ty
                    )));
                }
                Ok(TypedExpr {
                    ty: operand.ty.clone(),
                    node: TypedNode::Not(Box::new(operand)),
                })
            }
            Expr::Binary { op, lhs, rhs } => self.binary(*op, lhs, rhs),
            Expr::Call { name, args } => self.call(name, args),
            Expr::Index { base, key } => self.index(base, key),
            Expr::Tuple(fields) => {
                let typed: Vec<TypedExpr> = fields
                    .iter()
                    .map(|f| self.expr(f))
                    .collect::<Result<_, _>>()?;
                let ty = Type::tup(typed.iter().map(|t| t.ty.clone()).collect());
                Ok(TypedExpr {
                    node: TypedNode::Tup(typed),
                    ty,
                })
            }
            Expr::Generator { body, source } => {
                let source = self.expr(source)?;
                let source = self.as_sequence(source)?;
                let elem = source.ty.children()[0].clone();

                let slot = self.alloc_slot();
                self.gens.push((slot, elem));
                let body = self.expr(body);
                self.gens.pop();
                let mut body = body?;

                // A sequence-valued body would put a sequence inside the
                // produced elements; materialize it, as at top level.
                if body.ty.tag() == Tag::Seq {
                    let elem = body.ty.children()[0].clone();
                    body = TypedExpr {
                        ty: Type::arr(elem),
                        node: TypedNode::Collect(Box::new(body)),
                    };
                }

                let ty = Type::seq(body.ty.clone());
                Ok(TypedExpr {
                    node: TypedNode::Gen {
                        slot,
                        body: Box::new(body),
                        source: Box::new(source),
                    },
                    ty,
                })
            }
        }
    }

    /// Coerce a value into sequence position: sequences pass through,
    /// arrays become element sequences, maps become pair sequences.
    fn as_sequence(&mut self, e: TypedExpr) -> Result<TypedExpr, Error> {
        match e.ty.tag() {
            Tag::Seq => Ok(e),
            Tag::Arr => {
                let elem = e.ty.children()[0].clone();
                Ok(TypedExpr {
                    ty: Type::seq(elem),
                    node: TypedNode::Wrap(Box::new(e)),
                })
            }
            Tag::Map => {
                let pair = Type::tup(vec![e.ty.children()[0].clone(), e.ty.children()[1].clone()]);
                Ok(TypedExpr {
                    ty: Type::seq(pair),
                    node: TypedNode::Wrap(Box::new(e)),
                })
            }
            _ => Err(Error::type_mismatch(format!(
                "Expected a sequence, array or map, got {}",
                e.ty
            ))),
        }
    }

    fn call(&mut self, name: &str, args: &[Expr]) -> Result<TypedExpr, Error> {
        // Sequence plumbing is resolved here, not in the registry: these
        // forms lower to their own opcodes rather than native calls.
        if args.len() == 1 {
            match name {
                "seq" => {
                    let arg = self.expr(&args[0])?;
                    return self.as_sequence(arg);
                }
                "arr" => {
                    let arg = self.expr(&args[0])?;
                    if arg.ty.tag() == Tag::Arr {
                        return Ok(arg);
                    }
                    let seq = self.as_sequence(arg)?;
                    let elem = seq.ty.children()[0].clone();
                    return Ok(TypedExpr {
                        ty: Type::arr(elem),
                        node: TypedNode::Collect(Box::new(seq)),
                    });
                }
                "map" => {
                    let arg = self.expr(&args[0])?;
                    if arg.ty.tag() == Tag::Map {
                        return Ok(arg);
                    }
                    let seq = self.as_sequence(arg)?;
                    let elem = &seq.ty.children()[0];
                    if elem.tag() != Tag::Tup || elem.children().len() != 2 {
                        return Err(Error::type_mismatch(format!(
                            "map() expects a sequence of pairs, got {}",
                            seq.ty
                        )));
                    }
                    let ty = Type::map(elem.children()[0].clone(), elem.children()[1].clone());
                    return Ok(TypedExpr {
                        ty,
                        node: TypedNode::CollectMap(Box::new(seq)),
                    });
                }
                "flat" => {
                    let arg = self.expr(&args[0])?;
                    let seq = self.as_sequence(arg)?;
                    let elem = &seq.ty.children()[0];
                    let inner = match elem.tag() {
                        Tag::Seq | Tag::Arr => elem.children()[0].clone(),
                        _ => {
                            return Err(Error::type_mismatch(format!(
                                "flat() expects a sequence of sequences, got {}",
                                seq.ty
                            )));
                        }
                    };
                    return Ok(TypedExpr {
                        ty: Type::seq(inner),
                        node: TypedNode::Flatten(Box::new(seq)),
                    });
                }
                _ => {}
            }
        }

        let mut typed: Vec<TypedExpr> = args
            .iter()
            .map(|a| self.expr(a))
            .collect::<Result<_, _>>()?;

        let arg = if typed.len() == 1 {
            typed.remove(0)
        } else {
            let ty = Type::tup(typed.iter().map(|t| t.ty.clone()).collect());
            TypedExpr {
                node: TypedNode::Tup(typed),
                ty,
            }
        };

        let Some(overload) = self.funcs.resolve(name, &arg.ty) else {
            if self.funcs.contains(name) {
                return Err(Error::type_mismatch(format!(
                    "No matching overload: {}",
                    call_signature(name, &arg.ty)
                )));
            }
            return Err(Error::type_mismatch(format!("Unknown function: '{}'", name)));
        };

        Ok(TypedExpr {
            node: TypedNode::Fun {
                func: overload.func,
                arg: Box::new(arg),
            },
            ty: overload.result.clone(),
        })
    }

    fn index(&mut self, base: &Expr, key: &Expr) -> Result<TypedExpr, Error> {
        let base = self.expr(base)?;
        let key = self.expr(key)?;

        let result = match base.ty.tag() {
            Tag::Arr => {
                if !key.ty.is_integral() {
                    return Err(Error::type_mismatch(format!(
                        "Array index must be integral, got {}",
                        key.ty
                    )));
                }
                base.ty.children()[0].clone()
            }
            Tag::Map => {
                let key_ty = &base.ty.children()[0];
                if key.ty != *key_ty {
                    return Err(Error::type_mismatch(format!(
                        "Key type {} does not match map key type {}",
                        key.ty, key_ty
                    )));
                }
                base.ty.children()[1].clone()
            }
            _ => {
                return Err(Error::type_mismatch(format!(
                    "Cannot index a value of type {}",
                    base.ty
                )));
            }
        };

        Ok(TypedExpr {
            ty: result,
            node: TypedNode::Idx {
                base: Box::new(base),
                key: Box::new(key),
            },
        })
    }

    fn binary(&mut self, op: BinOp, lhs: &Expr, rhs: &Expr) -> Result<TypedExpr, Error> {
        let lhs = self.expr(lhs)?;
        let rhs = self.expr(rhs)?;
        let symbol = op_symbol(op);

        let as_real = matches!(op, BinOp::Pow)
            || lhs.ty.tag() == Tag::Real
            || rhs.ty.tag() == Tag::Real;

        if as_real {
            if matches!(op, BinOp::Mod | BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor) {
                return Err(Error::type_mismatch(format!(
                    "Operator '{}' expects integral operands, got {} and {}",
                    symbol, lhs.ty, rhs.ty
                )));
            }
            if !lhs.ty.is_numeric() || !rhs.ty.is_numeric() {
                return Err(Error::type_mismatch(format!(
                    "Operator '{}' expects numeric operands, got {} and {}",
                    symbol, lhs.ty, rhs.ty
                )));
            }
            let lift_of = |ty: &Type| match ty.tag() {
                Tag::Int => Some(Lift::Int),
                Tag::UInt => Some(Lift::UInt),
                _ => None,
            };
            let (lhs_lift, rhs_lift) = (lift_of(&lhs.ty), lift_of(&rhs.ty));
            return Ok(TypedExpr {
                node: TypedNode::Bin {
                    op,
                    numeric: Numeric::Real,
                    lhs_lift,
                    rhs_lift,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                ty: Type::real(),
            });
        }

        if !lhs.ty.is_integral() || !rhs.ty.is_integral() {
            return Err(Error::type_mismatch(format!(
                "Operator '{}' expects numeric operands, got {} and {}",
                symbol, lhs.ty, rhs.ty
            )));
        }
        if lhs.ty != rhs.ty {
            return Err(Error::type_mismatch(format!(
                "Cannot mix {} and {} under '{}'; cast with int() or uint()",
                lhs.ty, rhs.ty, symbol
            )));
        }

        let numeric = if lhs.ty.tag() == Tag::Int {
            Numeric::Int
        } else {
            Numeric::UInt
        };
        let ty = lhs.ty.clone();
        Ok(TypedExpr {
            node: TypedNode::Bin {
                op,
                numeric,
                lhs_lift: None,
                rhs_lift: None,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            ty,
        })
    }
}

fn op_symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Mod => "%",
        BinOp::Pow => "**",
        BinOp::BitAnd => "&",
        BinOp::BitOr => "|",
        BinOp::BitXor => "^",
    }
}
