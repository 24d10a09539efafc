//! The sift pipeline, wired end to end.
//!
//! A [`Session`] owns the function registry and drives one source program
//! through lex → parse → check → compile → execute. Sessions are cheap; the
//! interpreter itself is one-shot, so a fresh session per program is the
//! normal shape.

use std::io::{BufRead, Cursor, Write};

use sift_lang::{Functions, compile, parse, tokenize, typecheck};
use sift_vm::{disasm, runtime};

pub use sift_core::{Error, Interner, Type};

/// A configured interpreter: the registry plus a debug level.
pub struct Session {
    funcs: Functions,
    debug: u8,
}

impl Session {
    /// A session with the standard built-ins registered.
    pub fn new() -> Self {
        let mut funcs = Functions::new();
        sift_stdlib::register(&mut funcs);
        Self { funcs, debug: 0 }
    }

    /// Set the verbosity level (0-3). Dumps go to standard error.
    pub fn set_debug(&mut self, level: u8) {
        self.debug = level;
    }

    /// The registry, for callers that add their own functions.
    pub fn registry_mut(&mut self) -> &mut Functions {
        &mut self.funcs
    }

    /// Compile `source` and run it against `input`, writing the printed
    /// result (and its trailing newline) to `out`.
    pub fn run(
        &self,
        source: &str,
        input: Box<dyn BufRead>,
        out: &mut dyn Write,
    ) -> Result<(), Error> {
        let tokens = tokenize(source)?;
        let program = parse(&tokens)?;

        let mut interner = Interner::new();
        let typed = typecheck::check(&program, &self.funcs, &mut interner)?;

        if self.debug >= 1 {
            eprintln!("result type: {}", typed.ty());
            eprintln!("variable slots: {}", typed.nvars);
        }
        if self.debug >= 2 {
            eprintln!("{:#?}", typed);
        }

        let compiled = compile(&typed);

        if self.debug >= 3 {
            eprint!("{}", disasm::disasm(&compiled.code));
        }

        runtime::execute(&compiled.code, compiled.nvars, input, &interner, out)
    }

    /// Convenience wrapper: run with string input and capture the output.
    pub fn run_to_string(&self, source: &str, input: &str) -> Result<String, Error> {
        let mut out = Vec::new();
        self.run(source, Box::new(Cursor::new(input.to_owned())), &mut out)?;
        String::from_utf8(out).map_err(|_| Error::internal("result was not valid UTF-8"))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
