//! The parser.
//!
//! Plain recursive descent over the token list. One additive level holds
//! `+ - & | ^`, one multiplicative level holds `* / %`, and `**` binds
//! tighter still (right-associative); `~` and unary `-` sit above that, and
//! indexing binds tightest.

use sift_core::Error;

use crate::ast::{BinOp, Expr, Program, UnOp};
use crate::lexer::{Lexed, Token};

/// Parse a token list into a program.
pub fn parse(tokens: &[Lexed]) -> Result<Program, Error> {
    let mut parser = Parser { tokens, pos: 0 };
    let program = parser.program()?;
    if let Some(extra) = parser.peek() {
        return Err(Error::parse(format!(
            "Unexpected {} after the end of the expression",
            extra.describe()
        )));
    }
    Ok(program)
}

struct Parser<'a> {
    tokens: &'a [Lexed],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|l| &l.token)
    }

    fn peek_at(&self, ahead: usize) -> Option<&Token> {
        self.tokens.get(self.pos + ahead).map(|l| &l.token)
    }

    fn next(&mut self) -> Result<&Token, Error> {
        let lexed = self
            .tokens
            .get(self.pos)
            .ok_or_else(|| Error::parse("Unexpected end of expression"))?;
        self.pos += 1;
        Ok(&lexed.token)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token) -> Result<(), Error> {
        match self.peek() {
            Some(t) if *t == token => {
                self.pos += 1;
                Ok(())
            }
            Some(t) => Err(Error::parse(format!(
                "Expected {} but found {}",
                token.describe(),
                t.describe()
            ))),
            None => Err(Error::parse(format!(
                "Expected {} but the expression ended",
                token.describe()
            ))),
        }
    }

    fn program(&mut self) -> Result<Program, Error> {
        let mut bindings = Vec::new();

        // `name = expr ,` prefixes; a bare name followed by anything else is
        // the start of the result expression.
        while let (Some(Token::Ident(_)), Some(Token::Assign)) = (self.peek(), self.peek_at(1)) {
            let name = match self.next()? {
                Token::Ident(name) => name.clone(),
                _ => unreachable!(),
            };
            self.expect(Token::Assign)?;
            let value = self.expr()?;
            self.expect(Token::Comma)?;
            bindings.push((name, value));
        }

        let body = self.expr()?;
        Ok(Program { bindings, body })
    }

    fn expr(&mut self) -> Result<Expr, Error> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                Some(Token::Amp) => BinOp::BitAnd,
                Some(Token::Pipe) => BinOp::BitOr,
                Some(Token::Caret) => BinOp::BitXor,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, Error> {
        let mut lhs = self.factor()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::Percent) => BinOp::Mod,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.factor()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn factor(&mut self) -> Result<Expr, Error> {
        let base = self.prefix()?;
        if self.eat(&Token::StarStar) {
            let exp = self.factor()?;
            return Ok(Expr::Binary {
                op: BinOp::Pow,
                lhs: Box::new(base),
                rhs: Box::new(exp),
            });
        }
        Ok(base)
    }

    fn prefix(&mut self) -> Result<Expr, Error> {
        if self.eat(&Token::Tilde) {
            let operand = self.prefix()?;
            return Ok(Expr::Unary {
                op: UnOp::Not,
                expr: Box::new(operand),
            });
        }
        if self.eat(&Token::Minus) {
            let operand = self.prefix()?;
            // Fold a negated literal; anything else subtracts from zero.
            return Ok(match operand {
                Expr::Int(v) => Expr::Int(v.wrapping_neg()),
                Expr::Real(v) => Expr::Real(-v),
                other => Expr::Binary {
                    op: BinOp::Sub,
                    lhs: Box::new(Expr::Int(0)),
                    rhs: Box::new(other),
                },
            });
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Expr, Error> {
        let mut base = self.primary()?;
        while self.eat(&Token::LBracket) {
            let key = self.expr()?;
            self.expect(Token::RBracket)?;
            base = Expr::Index {
                base: Box::new(base),
                key: Box::new(key),
            };
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, Error> {
        let token = self.next()?.clone();
        match token {
            Token::Int(v) => Ok(Expr::Int(v)),
            Token::UInt(v) => Ok(Expr::UInt(v)),
            Token::Real(v) => Ok(Expr::Real(v)),
            Token::Str(s) => Ok(Expr::Str(s)),
            Token::At => Ok(Expr::At),
            Token::Ident(name) => {
                if self.eat(&Token::LParen) {
                    let mut args = vec![self.expr()?];
                    while self.eat(&Token::Comma) {
                        args.push(self.expr()?);
                    }
                    self.expect(Token::RParen)?;
                    Ok(Expr::Call { name, args })
                } else {
                    Ok(Expr::Ident(name))
                }
            }
            Token::LParen => {
                let first = self.expr()?;
                if self.eat(&Token::Comma) {
                    let mut fields = vec![first, self.expr()?];
                    while self.eat(&Token::Comma) {
                        fields.push(self.expr()?);
                    }
                    self.expect(Token::RParen)?;
                    Ok(Expr::Tuple(fields))
                } else {
                    self.expect(Token::RParen)?;
                    Ok(first)
                }
            }
            Token::LBracket => {
                let body = self.expr()?;
                self.expect(Token::Colon)?;
                let source = self.expr()?;
                self.expect(Token::RBracket)?;
                Ok(Expr::Generator {
                    body: Box::new(body),
                    source: Box::new(source),
                })
            }
            other => Err(Error::parse(format!(
                "Expected an expression but found {}",
                other.describe()
            ))),
        }
    }
}
