//! Token types for the script lexer.

use alloc::string::String;

/// A token tagged with the 1-based source line it started on.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Int(i32),
    Float(f64),
    Str(String),
    Ident(String),

    // Keywords
    Let,
    Func,
    Null,
    Return,
    If,
    Else,
    True,
    False,

    // Punctuation
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    Semicolon, // ;
    Comma,     // ,
    Dot,       // .

    // Operators
    Eq,      // =
    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Percent, // %
    Lt,      // <
    Gt,      // >
    EqEq,    // ==
    BangEq,  // !=
    LtEq,    // <=
    GtEq,    // >=

    Eof,
}

impl TokenKind {
    /// How the token reads in a diagnostic.
    pub fn describe(&self) -> &str {
        match self {
            TokenKind::Int(_) => "number",
            TokenKind::Float(_) => "float",
            TokenKind::Str(_) => "string",
            TokenKind::Ident(name) => name,
            TokenKind::Let => "let",
            TokenKind::Func => "func",
            TokenKind::Null => "null",
            TokenKind::Return => "return",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Eq => "=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::EqEq => "==",
            TokenKind::BangEq => "!=",
            TokenKind::LtEq => "<=",
            TokenKind::GtEq => ">=",
            TokenKind::Eof => "end of file",
        }
    }

    /// True for tokens that can end a value, which makes a following `-`
    /// the infix operator rather than a sign.
    pub fn ends_value(&self) -> bool {
        matches!(
            self,
            TokenKind::Int(_)
                | TokenKind::Float(_)
                | TokenKind::Str(_)
                | TokenKind::Ident(_)
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
                | TokenKind::RParen
        )
    }
}
