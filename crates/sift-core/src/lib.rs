//! Core types for the sift language.
//!
//! This crate provides the foundational types shared by the compiler and the
//! runtime:
//! - Symbols and interning
//! - The structural type model
//! - Atom literals
//! - The error enum used by every stage

pub mod atom;
pub mod error;
pub mod intern;
pub mod types;

// Re-export commonly used types at crate root
pub use atom::Atom;
pub use error::Error;
pub use intern::{Interner, Symbol};
pub use types::{Tag, Type};
