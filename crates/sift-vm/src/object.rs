//! Runtime values.
//!
//! `Object` is a tagged sum dispatched by variant: each opcode statically
//! knows which variant it expects, so there are no runtime casts beyond the
//! match. Objects live in shared cells (`ObjRef`); command cells own their
//! result object for the whole run, and the operand stack and variable frame
//! hold additional handles to those same cells.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use sift_core::{Error, Tag, Type};

use crate::sequence::SeqState;

/// A shared handle to a runtime value.
pub type ObjRef = Rc<RefCell<Object>>;

/// Wrap a value in a fresh cell.
pub fn obj(o: Object) -> ObjRef {
    Rc::new(RefCell::new(o))
}

/// A runtime value.
pub enum Object {
    Int(i64),
    UInt(u64),
    Real(f64),
    Str(String),
    /// Ordered fields, one cell per field.
    Tuple(Vec<ObjRef>),
    /// Homogeneous elements; cells are private deep copies of the values
    /// drained into the array.
    Array(Vec<ObjRef>),
    /// Keys are deep value snapshots, so equality and hashing see stable
    /// data; values are private deep copies like array elements.
    Map(HashMap<Object, ObjRef>),
    /// A lazy producer of values.
    Seq(SeqState),
}

impl Object {
    /// Allocate the default value for a declared type. Used by the init pass
    /// for every opcode that does not carry its own literal.
    pub fn default_for(ty: &Type) -> Result<Object, Error> {
        Ok(match ty.tag() {
            Tag::Int => Object::Int(0),
            Tag::UInt => Object::UInt(0),
            Tag::Real => Object::Real(0.0),
            Tag::Str => Object::Str(String::new()),
            Tag::Tup => {
                let fields = ty
                    .children()
                    .iter()
                    .map(|c| Object::default_for(c).map(obj))
                    .collect::<Result<Vec<_>, _>>()?;
                Object::Tuple(fields)
            }
            Tag::Arr => Object::Array(Vec::new()),
            Tag::Map => Object::Map(HashMap::new()),
            Tag::Seq => Object::Seq(SeqState::Stopped),
            Tag::None => {
                return Err(Error::internal("cannot allocate a value of type None"));
            }
        })
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Int(_) => "Int",
            Object::UInt(_) => "UInt",
            Object::Real(_) => "Real",
            Object::Str(_) => "Str",
            Object::Tuple(_) => "Tup",
            Object::Array(_) => "Arr",
            Object::Map(_) => "Map",
            Object::Seq(_) => "Seq",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Object::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Object::UInt(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Object::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Object::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[ObjRef]> {
        match self {
            Object::Tuple(fields) => Some(fields),
            _ => None,
        }
    }

    /// A full value copy with no cells shared with `self`.
    ///
    /// Containers drain sequencers into deep copies because generator bodies
    /// reuse their command cells across iterations; a shallow handle would
    /// alias a cell that the next iteration overwrites. Sequence values never
    /// appear inside containers, so that arm only covers default-allocated
    /// cells that were never wrapped.
    pub fn deep_clone(&self) -> Object {
        match self {
            Object::Int(v) => Object::Int(*v),
            Object::UInt(v) => Object::UInt(*v),
            Object::Real(v) => Object::Real(*v),
            Object::Str(s) => Object::Str(s.clone()),
            Object::Tuple(fields) => {
                Object::Tuple(fields.iter().map(|f| obj(f.borrow().deep_clone())).collect())
            }
            Object::Array(items) => {
                Object::Array(items.iter().map(|v| obj(v.borrow().deep_clone())).collect())
            }
            Object::Map(entries) => Object::Map(
                entries
                    .iter()
                    .map(|(k, v)| (k.deep_clone(), obj(v.borrow().deep_clone())))
                    .collect(),
            ),
            Object::Seq(_) => Object::Seq(SeqState::Stopped),
        }
    }

    /// Fetch an element by key and write it into `out`.
    ///
    /// Arrays take an integral key; maps take a key of their declared key
    /// type, compared structurally. A missing element is a lookup error.
    pub fn index_into(&self, key: &Object, out: &ObjRef) -> Result<(), Error> {
        match self {
            Object::Array(items) => {
                let ix = match key {
                    Object::Int(v) if *v >= 0 => *v as usize,
                    Object::Int(_) => {
                        return Err(Error::Lookup("Index out of range".into()));
                    }
                    Object::UInt(v) => *v as usize,
                    other => {
                        return Err(Error::internal(format!(
                            "array index must be integral, got {}",
                            other.type_name()
                        )));
                    }
                };
                let item = items
                    .get(ix)
                    .ok_or_else(|| Error::Lookup("Index out of range".into()))?;
                *out.borrow_mut() = item.borrow().deep_clone();
                Ok(())
            }
            Object::Map(entries) => {
                let value = entries
                    .get(key)
                    .ok_or_else(|| Error::Lookup("Key is not in map".into()))?;
                *out.borrow_mut() = value.borrow().deep_clone();
                Ok(())
            }
            other => Err(Error::internal(format!(
                "cannot index a value of type {}",
                other.type_name()
            ))),
        }
    }
}

// Structural value equality, used for map keys. Reals compare by bit
// pattern so the relation stays a proper equivalence for hashing.
// Sequences have no value identity and never reach key position.
impl PartialEq for Object {
    fn eq(&self, other: &Object) -> bool {
        match (self, other) {
            (Object::Int(a), Object::Int(b)) => a == b,
            (Object::UInt(a), Object::UInt(b)) => a == b,
            (Object::Real(a), Object::Real(b)) => a.to_bits() == b.to_bits(),
            (Object::Str(a), Object::Str(b)) => a == b,
            (Object::Tuple(a), Object::Tuple(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|(x, y)| *x.borrow() == *y.borrow())
            }
            (Object::Array(a), Object::Array(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|(x, y)| *x.borrow() == *y.borrow())
            }
            (Object::Map(a), Object::Map(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(k, v)| {
                        b.get(k).is_some_and(|bv| *v.borrow() == *bv.borrow())
                    })
            }
            (Object::Seq(_), Object::Seq(_)) => false,
            _ => false,
        }
    }
}

impl Eq for Object {}

impl Hash for Object {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Object::Int(v) => {
                state.write_u8(0);
                v.hash(state);
            }
            Object::UInt(v) => {
                state.write_u8(1);
                v.hash(state);
            }
            Object::Real(v) => {
                state.write_u8(2);
                v.to_bits().hash(state);
            }
            Object::Str(s) => {
                state.write_u8(3);
                s.hash(state);
            }
            Object::Tuple(fields) => {
                state.write_u8(4);
                state.write_usize(fields.len());
                for f in fields {
                    f.borrow().hash(state);
                }
            }
            Object::Array(items) => {
                state.write_u8(5);
                state.write_usize(items.len());
                for v in items {
                    v.borrow().hash(state);
                }
            }
            Object::Map(entries) => {
                // Order-independent: only the cardinality feeds the hash.
                state.write_u8(6);
                state.write_usize(entries.len());
            }
            Object::Seq(_) => {
                state.write_u8(7);
            }
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Int(v) => write!(f, "Int({})", v),
            Object::UInt(v) => write!(f, "UInt({})", v),
            Object::Real(v) => write!(f, "Real({})", v),
            Object::Str(s) => write!(f, "Str({:?})", s),
            Object::Tuple(fields) => {
                f.debug_tuple("Tuple").field(&fields.len()).finish()
            }
            Object::Array(items) => f.debug_tuple("Array").field(&items.len()).finish(),
            Object::Map(entries) => f.debug_tuple("Map").field(&entries.len()).finish(),
            Object::Seq(state) => write!(f, "Seq({})", state.name()),
        }
    }
}
