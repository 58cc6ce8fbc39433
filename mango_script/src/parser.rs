//! Recursive descent parser for the script language.
//!
//! Precedence, low to high: comparison, additive, multiplicative, call
//! postfix, factor. Every statement other than a block, `if`, or function
//! definition must end with `;`.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

use crate::ScriptError;
use crate::ast::{BinOp, Expr, ExprKind, Function, Stmt, StmtKind};
use crate::token::{Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    /// Parses a complete program. The first syntax error abandons the
    /// partial tree.
    pub fn parse_program(&mut self) -> Result<Vec<Stmt>, ScriptError> {
        let mut body = Vec::new();
        while !self.at_end() {
            body.push(self.parse_statement()?);
        }
        Ok(body)
    }

    // ── Helpers ──

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].kind
    }

    fn peek2(&self) -> &TokenKind {
        &self.tokens[(self.pos + 1).min(self.tokens.len() - 1)].kind
    }

    fn line(&self) -> u32 {
        self.tokens[self.pos.min(self.tokens.len() - 1)].line
    }

    fn at_end(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if core::mem::discriminant(self.peek()) == core::mem::discriminant(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<(), ScriptError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.err(alloc::format!("expected '{}'", kind.describe())))
        }
    }

    fn err(&self, message: String) -> ScriptError {
        ScriptError {
            line: self.line(),
            message,
        }
    }

    fn ident(&mut self) -> Result<String, ScriptError> {
        match self.peek().clone() {
            TokenKind::Ident(name) => {
                self.pos += 1;
                Ok(name)
            }
            other => Err(self.err(alloc::format!(
                "expected identifier, got \"{}\"",
                other.describe()
            ))),
        }
    }

    // ── Statements ──

    fn parse_statement(&mut self) -> Result<Stmt, ScriptError> {
        let line = self.line();

        let stmt = match self.peek() {
            TokenKind::Let => {
                self.pos += 1;
                self.parse_declare(line)?
            }
            TokenKind::Ident(_) if matches!(self.peek2(), TokenKind::Eq) => {
                self.parse_assign(line)?
            }
            TokenKind::LBrace => {
                self.pos += 1;
                self.parse_block(line)?
            }
            TokenKind::Func => {
                self.pos += 1;
                self.parse_function(line)?
            }
            TokenKind::If => {
                self.pos += 1;
                self.parse_if(line)?
            }
            TokenKind::Return => {
                self.pos += 1;
                Stmt {
                    kind: StmtKind::Return(self.parse_expr()?),
                    line,
                }
            }
            _ => Stmt {
                kind: StmtKind::Expr(self.parse_expr()?),
                line,
            },
        };

        if !matches!(
            stmt.kind,
            StmtKind::Block(_) | StmtKind::Function(_) | StmtKind::If { .. }
        ) {
            self.expect(&TokenKind::Semicolon)?;
        }

        Ok(stmt)
    }

    fn parse_declare(&mut self, line: u32) -> Result<Stmt, ScriptError> {
        let name = self.ident()?;

        let kind = if self.eat(&TokenKind::Eq) {
            StmtKind::Define {
                name,
                value: self.parse_expr()?,
            }
        } else {
            StmtKind::Declare { name }
        };

        Ok(Stmt { kind, line })
    }

    fn parse_assign(&mut self, line: u32) -> Result<Stmt, ScriptError> {
        let name = self.ident()?;
        self.expect(&TokenKind::Eq)?;

        Ok(Stmt {
            kind: StmtKind::Assign {
                name,
                value: self.parse_expr()?,
            },
            line,
        })
    }

    fn parse_block(&mut self, line: u32) -> Result<Stmt, ScriptError> {
        let mut body = Vec::new();
        while !matches!(self.peek(), TokenKind::RBrace | TokenKind::Eof) {
            body.push(self.parse_statement()?);
        }
        self.expect(&TokenKind::RBrace)?;

        Ok(Stmt {
            kind: StmtKind::Block(body),
            line,
        })
    }

    fn parse_function(&mut self, line: u32) -> Result<Stmt, ScriptError> {
        let name = self.ident()?;
        self.expect(&TokenKind::LParen)?;

        let mut params = Vec::new();
        if !matches!(self.peek(), TokenKind::RParen) {
            loop {
                params.push(self.ident()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::LBrace)?;

        let body = match self.parse_block(line)?.kind {
            StmtKind::Block(body) => body,
            _ => unreachable!(),
        };

        Ok(Stmt {
            kind: StmtKind::Function(Rc::new(Function { name, params, body })),
            line,
        })
    }

    fn parse_if(&mut self, line: u32) -> Result<Stmt, ScriptError> {
        self.expect(&TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;

        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.eat(&TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Stmt {
            kind: StmtKind::If {
                cond,
                then_branch,
                else_branch,
            },
            line,
        })
    }

    // ── Expressions ──

    fn parse_expr(&mut self) -> Result<Expr, ScriptError> {
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ScriptError> {
        let mut node = self.parse_addsub()?;

        loop {
            let op = match self.peek() {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::BangEq => BinOp::Ne,
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::LtEq => BinOp::Le,
                TokenKind::GtEq => BinOp::Ge,
                _ => break,
            };
            self.pos += 1;

            let right = self.parse_addsub()?;
            node = binary(op, node, right);
        }

        Ok(node)
    }

    fn parse_addsub(&mut self) -> Result<Expr, ScriptError> {
        let mut node = self.parse_term()?;

        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;

            let right = self.parse_term()?;
            node = binary(op, node, right);
        }

        Ok(node)
    }

    fn parse_term(&mut self) -> Result<Expr, ScriptError> {
        let mut node = self.parse_call()?;

        loop {
            let op = match self.peek() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            self.pos += 1;

            let right = self.parse_call()?;
            node = binary(op, node, right);
        }

        Ok(node)
    }

    fn parse_call(&mut self) -> Result<Expr, ScriptError> {
        let node = self.parse_factor()?;

        if !matches!(self.peek(), TokenKind::LParen) {
            return Ok(node);
        }
        self.pos += 1;

        let mut args = Vec::new();
        if !matches!(self.peek(), TokenKind::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;

        let line = node.line;
        Ok(Expr {
            kind: ExprKind::Call {
                callee: Box::new(node),
                args,
            },
            line,
        })
    }

    fn parse_factor(&mut self) -> Result<Expr, ScriptError> {
        let line = self.line();

        let kind = match self.peek().clone() {
            TokenKind::Int(value) => {
                self.pos += 1;
                ExprKind::Int(value)
            }
            TokenKind::Float(value) => {
                self.pos += 1;
                ExprKind::Float(value)
            }
            TokenKind::Str(value) => {
                self.pos += 1;
                ExprKind::Str(value)
            }
            TokenKind::Ident(name) => {
                self.pos += 1;
                ExprKind::Ident(name)
            }
            TokenKind::True => {
                self.pos += 1;
                ExprKind::Bool(true)
            }
            TokenKind::False => {
                self.pos += 1;
                ExprKind::Bool(false)
            }
            TokenKind::Null => {
                self.pos += 1;
                ExprKind::Null
            }
            TokenKind::LParen => {
                self.pos += 1;
                let node = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                return Ok(node);
            }
            other => {
                return Err(self.err(alloc::format!(
                    "expected value, got \"{}\"",
                    other.describe()
                )));
            }
        };

        Ok(Expr { kind, line })
    }
}

fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
    let line = left.line;
    Expr {
        kind: ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(source: &str) -> Result<Vec<Stmt>, ScriptError> {
        Parser::new(Lexer::tokenize(source).unwrap()).parse_program()
    }

    #[test]
    fn precedence_nests_comparison_lowest() {
        // 1 + 2 * 3 == 7  →  ((1 + (2 * 3)) == 7)
        let program = parse("1 + 2 * 3 == 7;").unwrap();
        let StmtKind::Expr(expr) = &program[0].kind else {
            panic!("expected expression statement");
        };
        let ExprKind::Binary { op, left, .. } = &expr.kind else {
            panic!("expected comparison at the root");
        };
        assert_eq!(*op, BinOp::Eq);
        let ExprKind::Binary { op: add, right, .. } = &left.kind else {
            panic!("expected additive under the comparison");
        };
        assert_eq!(*add, BinOp::Add);
        assert!(matches!(
            right.kind,
            ExprKind::Binary { op: BinOp::Mul, .. }
        ));
    }

    #[test]
    fn let_forms_split_into_declare_and_define() {
        let program = parse("let a; let b = 2;").unwrap();
        assert!(matches!(&program[0].kind, StmtKind::Declare { name } if name == "a"));
        assert!(matches!(&program[1].kind, StmtKind::Define { name, .. } if name == "b"));
    }

    #[test]
    fn function_definitions_take_no_semicolon() {
        let program = parse("func add(a, b) { return a + b; } let x = 1;").unwrap();
        let StmtKind::Function(func) = &program[0].kind else {
            panic!("expected function statement");
        };
        assert_eq!(func.name, "add");
        assert_eq!(func.params, vec!["a", "b"]);
        assert_eq!(func.body.len(), 1);
    }

    #[test]
    fn if_else_chains() {
        let program = parse("if (1) { 2; } else if (3) { 4; }").unwrap();
        let StmtKind::If { else_branch, .. } = &program[0].kind else {
            panic!("expected if statement");
        };
        assert!(matches!(
            else_branch.as_deref().map(|s| &s.kind),
            Some(StmtKind::If { .. })
        ));
    }

    #[test]
    fn missing_semicolon_is_an_error() {
        let err = parse("let x = 1").unwrap_err();
        assert!(err.message.contains(';'));
        assert_eq!(err.line, 1);
    }

    #[test]
    fn there_is_no_unary_minus() {
        assert!(parse("let y = -x;").is_err());
        assert!(parse("-(1 + 2);").is_err());
    }

    #[test]
    fn call_arguments_parse_as_full_expressions() {
        let program = parse("f(1 + 2, g(3), \"s\");").unwrap();
        let StmtKind::Expr(expr) = &program[0].kind else {
            panic!("expected expression statement");
        };
        let ExprKind::Call { callee, args } = &expr.kind else {
            panic!("expected call");
        };
        assert!(matches!(&callee.kind, ExprKind::Ident(name) if name == "f"));
        assert_eq!(args.len(), 3);
        assert!(matches!(args[1].kind, ExprKind::Call { .. }));
    }
}
