//! Command stream disassembly, for debug output.

use std::fmt::Write;

use crate::command::{Command, Imm};

/// Render a command sequence, one line per command, closure blocks indented
/// under their owner.
pub fn disasm(code: &[Command]) -> String {
    let mut out = String::new();
    walk(code, 0, &mut out);
    out
}

fn walk(code: &[Command], depth: usize, out: &mut String) {
    for c in code {
        for _ in 0..depth {
            out.push_str("  ");
        }
        let _ = write!(out, "{}", c.op.name());
        match c.arg {
            Imm::None => {}
            Imm::Atom(atom) => {
                let _ = write!(out, " {:?}", atom);
            }
            Imm::Slot(ix) => {
                let _ = write!(out, " #{}", ix);
            }
        }
        let _ = writeln!(out, " : {}", c.ty);

        for block in &c.closures {
            for _ in 0..depth {
                out.push_str("  ");
            }
            let _ = writeln!(out, "  closure : {}", block.ty);
            walk(&block.code, depth + 2, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Imm, Op};
    use sift_core::{Atom, Type};

    #[test]
    fn renders_opcodes_and_immediates() {
        let code = vec![
            Command::with_arg(Op::Val, Imm::Atom(Atom::Int(2)), Type::int()),
            Command::with_arg(Op::Var, Imm::Slot(0), Type::seq(Type::str())),
            Command::new(Op::AddInt, Type::int()),
        ];
        let text = disasm(&code);
        assert!(text.contains("VAL Int(2) : Int"));
        assert!(text.contains("VAR #0 : Seq[Str]"));
        assert!(text.contains("ADD_I : Int"));
    }
}
