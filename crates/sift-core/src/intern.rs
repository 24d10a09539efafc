//! String interning.
//!
//! String literals in a source program are deduplicated into small stable
//! ids during type checking. The compiler embeds the id in the command
//! stream as a literal immediate, and the VM's init pass resolves it back
//! to text when it materializes the literal's object. Ids are only
//! meaningful against the interner that produced them, which lives for one
//! compilation session; resolution is therefore fallible, and a miss is a
//! bug in the caller, not in the program being run.

use std::collections::HashMap;

/// The id of one piece of interned literal text.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Symbol(u32);

impl Symbol {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Deduplicating store for the string literals of a single program.
///
/// Bounded by program size: only literal text from the source ever enters,
/// so there is no eviction and no sharing across sessions.
#[derive(Clone, Debug, Default)]
pub struct Interner {
    ids: HashMap<String, Symbol>,
    texts: Vec<String>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `text`, handing back the id of its canonical copy. The same
    /// text always maps to the same id within one interner.
    pub fn intern(&mut self, text: &str) -> Symbol {
        if let Some(&sym) = self.ids.get(text) {
            return sym;
        }

        let sym = Symbol(self.texts.len() as u32);
        self.texts.push(text.to_owned());
        self.ids.insert(text.to_owned(), sym);
        sym
    }

    /// The text behind an id, or `None` for an id this interner never
    /// handed out.
    pub fn resolve(&self, sym: Symbol) -> Option<&str> {
        self.texts.get(sym.0 as usize).map(String::as_str)
    }
}
