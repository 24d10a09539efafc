//! Sequencer state.
//!
//! A sequencer is a pull-based producer of values. Rather than a closure
//! capturing the running machine, each sequencer is a small state value: the
//! run pass hands the machine back in when the sequencer is advanced, which
//! is what lets a generator re-enter the VM on its body block.

use std::fmt;
use std::io::BufRead;
use std::rc::Rc;

use sift_core::Error;

use crate::command::Block;
use crate::object::ObjRef;

/// The producer behind a `Object::Seq`.
pub enum SeqState {
    /// Produces nothing. The init-pass placeholder, and the state of a
    /// drained input.
    Stopped,
    /// Drains a materialized container, one deep-copied element per step.
    Items { items: Vec<ObjRef>, pos: usize },
    /// Emits one string per input line until end of input. The terminating
    /// newline is stripped.
    File { input: Box<dyn BufRead> },
    /// Per-element mapping: advance `source`, bind the element to the loop
    /// slot, evaluate `body`.
    Generator {
        source: ObjRef,
        slot: u32,
        body: Rc<Block>,
    },
    /// One-level flattening of a sequence of sequences (or arrays).
    /// `inner` is the sequence currently being drained.
    Flatten { outer: ObjRef, inner: Option<ObjRef> },
}

impl SeqState {
    pub fn name(&self) -> &'static str {
        match self {
            SeqState::Stopped => "stopped",
            SeqState::Items { .. } => "items",
            SeqState::File { .. } => "file",
            SeqState::Generator { .. } => "generator",
            SeqState::Flatten { .. } => "flatten",
        }
    }
}

impl fmt::Debug for SeqState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SeqState::{}", self.name())
    }
}

/// Read one line, stripping the trailing newline (and a carriage return
/// before it). Returns `None` at end of input.
pub(crate) fn next_line(input: &mut dyn BufRead) -> Result<Option<String>, Error> {
    let mut line = String::new();
    let n = input.read_line(&mut line)?;
    if n == 0 {
        return Ok(None);
    }
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(Some(line))
}
