//! Script lexer / tokenizer.
//!
//! Converts source text into a token sequence. Whitespace separates tokens;
//! newlines additionally advance the line counter attached to every token.

use alloc::string::String;
use alloc::vec::Vec;

use crate::ScriptError;
use crate::token::{Token, TokenKind};

pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    line: u32,
    /// Whether the previous token can end a value; decides if `-` is a sign.
    after_value: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            src: source.as_bytes(),
            pos: 0,
            line: 1,
            after_value: false,
        }
    }

    /// Tokenizes the entire source. Any lex error abandons the token list.
    pub fn tokenize(source: &str) -> Result<Vec<Token>, ScriptError> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.next_token()?;
            let is_eof = tok.kind == TokenKind::Eof;
            lexer.after_value = tok.kind.ends_value();
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn peek(&self) -> u8 {
        if self.pos < self.src.len() {
            self.src[self.pos]
        } else {
            0
        }
    }

    fn peek2(&self) -> u8 {
        if self.pos + 1 < self.src.len() {
            self.src[self.pos + 1]
        } else {
            0
        }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.src.len() {
            match self.src[self.pos] {
                b'\n' => {
                    self.line += 1;
                    self.pos += 1;
                }
                b' ' | b'\t' | b'\r' => self.pos += 1,
                _ => break,
            }
        }
    }

    fn err(&self, message: String) -> ScriptError {
        ScriptError {
            line: self.line,
            message,
        }
    }

    pub fn next_token(&mut self) -> Result<Token, ScriptError> {
        self.skip_whitespace();

        let line = self.line;
        if self.pos >= self.src.len() {
            return Ok(Token {
                kind: TokenKind::Eof,
                line,
            });
        }

        let ch = self.src[self.pos];

        // a `-` starts a number only as a sign, never right after a value
        if ch.is_ascii_digit() || (ch == b'-' && self.peek2().is_ascii_digit() && !self.after_value)
        {
            return self.read_number();
        }

        if ch.is_ascii_alphabetic() || ch == b'_' {
            return Ok(self.read_ident());
        }

        if ch == b'"' {
            return self.read_string();
        }

        self.read_operator()
    }

    fn read_number(&mut self) -> Result<Token, ScriptError> {
        let line = self.line;
        let start = self.pos;

        if self.peek() == b'-' {
            self.pos += 1;
        }

        let mut dots = 0;
        while self.peek().is_ascii_digit() || (self.peek() == b'.' && dots < 2) {
            if self.peek() == b'.' {
                dots += 1;
            }
            self.pos += 1;
        }

        let next = self.peek();
        if next.is_ascii_alphabetic() || dots == 2 {
            return Err(self.err(alloc::format!("Unexpected char \"{}\"", next as char)));
        }

        let text = core::str::from_utf8(&self.src[start..self.pos]).unwrap_or("");
        let kind = if dots == 1 {
            let value = text
                .parse::<f64>()
                .map_err(|_| self.err(alloc::format!("Malformed number \"{text}\"")))?;
            TokenKind::Float(value)
        } else {
            let value = text
                .parse::<i32>()
                .map_err(|_| self.err(alloc::format!("Malformed number \"{text}\"")))?;
            TokenKind::Int(value)
        };

        Ok(Token { kind, line })
    }

    fn read_ident(&mut self) -> Token {
        let line = self.line;
        let start = self.pos;
        while self.peek().is_ascii_alphanumeric() || self.peek() == b'_' {
            self.pos += 1;
        }

        let text = core::str::from_utf8(&self.src[start..self.pos]).unwrap_or("");
        let kind = match text {
            "let" => TokenKind::Let,
            "func" => TokenKind::Func,
            "null" => TokenKind::Null,
            "return" => TokenKind::Return,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            _ => TokenKind::Ident(String::from(text)),
        };

        Token { kind, line }
    }

    fn read_string(&mut self) -> Result<Token, ScriptError> {
        let line = self.line;
        self.pos += 1; // opening quote

        let start = self.pos;
        while self.pos < self.src.len() && self.src[self.pos] != b'"' {
            if self.src[self.pos] == b'\n' {
                self.line += 1;
            }
            self.pos += 1;
        }

        if self.pos >= self.src.len() {
            return Err(ScriptError {
                line,
                message: String::from("Unclosed string"),
            });
        }

        let text = core::str::from_utf8(&self.src[start..self.pos]).unwrap_or("");
        self.pos += 1; // closing quote

        Ok(Token {
            kind: TokenKind::Str(String::from(text)),
            line,
        })
    }

    fn read_operator(&mut self) -> Result<Token, ScriptError> {
        let line = self.line;
        let ch = self.src[self.pos];

        if self.peek2() == b'=' {
            let two = match ch {
                b'=' => Some(TokenKind::EqEq),
                b'!' => Some(TokenKind::BangEq),
                b'<' => Some(TokenKind::LtEq),
                b'>' => Some(TokenKind::GtEq),
                _ => None,
            };
            if let Some(kind) = two {
                self.pos += 2;
                return Ok(Token { kind, line });
            }
        }

        let kind = match ch {
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'=' => TokenKind::Eq,
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'%' => TokenKind::Percent,
            b';' => TokenKind::Semicolon,
            b',' => TokenKind::Comma,
            b'.' => TokenKind::Dot,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'<' => TokenKind::Lt,
            b'>' => TokenKind::Gt,
            _ => {
                return Err(self.err(alloc::format!("Illegal token \"{}\"", ch as char)));
            }
        };

        self.pos += 1;
        Ok(Token { kind, line })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_literals_and_keywords() {
        assert_eq!(
            kinds("let x = 42;"),
            vec![
                TokenKind::Let,
                TokenKind::Ident("x".into()),
                TokenKind::Eq,
                TokenKind::Int(42),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("1.5 \"hi\" true false null"),
            vec![
                TokenKind::Float(1.5),
                TokenKind::Str("hi".into()),
                TokenKind::True,
                TokenKind::False,
                TokenKind::Null,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn minus_is_a_sign_only_outside_value_context() {
        assert_eq!(
            kinds("-5"),
            vec![TokenKind::Int(-5), TokenKind::Eof]
        );
        assert_eq!(
            kinds("1-2"),
            vec![
                TokenKind::Int(1),
                TokenKind::Minus,
                TokenKind::Int(2),
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("x-2"),
            vec![
                TokenKind::Ident("x".into()),
                TokenKind::Minus,
                TokenKind::Int(2),
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("(1) - 2"),
            vec![
                TokenKind::LParen,
                TokenKind::Int(1),
                TokenKind::RParen,
                TokenKind::Minus,
                TokenKind::Int(2),
                TokenKind::Eof,
            ]
        );
        // after an operator, the sign form is back
        assert_eq!(
            kinds("1 + -2"),
            vec![
                TokenKind::Int(1),
                TokenKind::Plus,
                TokenKind::Int(-2),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn two_char_operators_win_over_singles() {
        assert_eq!(
            kinds("== != <= >= < > ="),
            vec![
                TokenKind::EqEq,
                TokenKind::BangEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Eq,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lines_are_tracked() {
        let tokens = Lexer::tokenize("1\n2\n\n3").unwrap();
        let lines: Vec<u32> = tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 2, 4, 4]);
    }

    #[test]
    fn bad_input_is_a_lex_error() {
        assert!(Lexer::tokenize("\"unterminated").is_err());
        assert!(Lexer::tokenize("12abc").is_err());
        assert!(Lexer::tokenize("1.2.3").is_err());
        assert!(Lexer::tokenize("@").is_err());
    }
}
