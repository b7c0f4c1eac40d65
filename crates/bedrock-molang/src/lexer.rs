//! Tokenizer for Molang-like expressions.

use crate::ParseError;

/// Token kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    /// Quoted string literal. Only ever read as the number 0.
    Str,
    Ident(String),

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    EqEq,
    BangEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    AndAnd,
    OrOr,
    Question,
    Colon,

    LParen,
    RParen,
    Comma,

    Eof,
}

/// A token with its byte offset in the source.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

/// Tokenizer over a single expression string.
pub struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
        }
    }

    /// Tokenize the whole input. The last token is always `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_whitespace();
        let offset = self.pos;

        let Some(c) = self.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                offset,
            });
        };

        let kind = match c {
            b'0'..=b'9' => self.number()?,
            b'.' if self.peek_at(1).is_some_and(|n| n.is_ascii_digit()) => self.number()?,
            b'\'' | b'"' => self.string(c)?,
            c if c.is_ascii_alphabetic() || c == b'_' => self.identifier(),
            _ => {
                self.pos += 1;
                match c {
                    b'+' => TokenKind::Plus,
                    b'-' => TokenKind::Minus,
                    b'*' => TokenKind::Star,
                    b'/' => TokenKind::Slash,
                    b'%' => TokenKind::Percent,
                    b'?' => TokenKind::Question,
                    b':' => TokenKind::Colon,
                    b'(' => TokenKind::LParen,
                    b')' => TokenKind::RParen,
                    b',' => TokenKind::Comma,
                    b'!' => {
                        if self.eat(b'=') {
                            TokenKind::BangEq
                        } else {
                            TokenKind::Bang
                        }
                    }
                    b'=' if self.eat(b'=') => TokenKind::EqEq,
                    b'<' => {
                        if self.eat(b'=') {
                            TokenKind::LtEq
                        } else {
                            TokenKind::Lt
                        }
                    }
                    b'>' => {
                        if self.eat(b'=') {
                            TokenKind::GtEq
                        } else {
                            TokenKind::Gt
                        }
                    }
                    b'&' if self.eat(b'&') => TokenKind::AndAnd,
                    b'|' if self.eat(b'|') => TokenKind::OrOr,
                    _ => {
                        let ch = self.source[offset..].chars().next().unwrap_or('?');
                        return Err(ParseError::UnexpectedChar { ch, offset });
                    }
                }
            }
        };

        Ok(Token { kind, offset })
    }

    fn number(&mut self) -> Result<TokenKind, ParseError> {
        let start = self.pos;
        self.skip_digits();
        if self.peek() == Some(b'.') {
            self.pos += 1;
            self.skip_digits();
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            self.skip_digits();
        }
        self.source[start..self.pos]
            .parse::<f64>()
            .map(TokenKind::Number)
            .map_err(|_| ParseError::InvalidNumber { offset: start })
    }

    fn string(&mut self, quote: u8) -> Result<TokenKind, ParseError> {
        let start = self.pos;
        self.pos += 1;
        while let Some(c) = self.peek() {
            self.pos += 1;
            if c == b'\\' {
                self.pos += 1;
            } else if c == quote {
                return Ok(TokenKind::Str);
            }
        }
        Err(ParseError::UnterminatedString { offset: start })
    }

    fn identifier(&mut self) -> TokenKind {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == b'_' || c == b'.' || c == b':' {
                self.pos += 1;
            } else {
                break;
            }
        }
        TokenKind::Ident(self.source[start..self.pos].to_ascii_lowercase())
    }

    fn skip_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }
}
