//! Recursive-descent parser, lowest precedence first:
//! ternary, `||`, `&&`, equality, relational, additive, multiplicative, unary, primary.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::lexer::{Token, TokenKind};
use crate::ParseError;

/// Deepest expression tree the parser will build. Nested parentheses, unary
/// operators, ternaries and chained binary operators each add a level.
pub const MAX_DEPTH: usize = 256;

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            depth: 0,
        }
    }

    /// Parse a complete expression. Trailing tokens are an error.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::Eof) {
            return Ok(Expr::Number(0.0));
        }
        let expr = self.ternary()?;
        if !self.check(&TokenKind::Eof) {
            return Err(self.unexpected());
        }
        Ok(expr)
    }

    fn ternary(&mut self) -> Result<Expr, ParseError> {
        self.descend()?;
        let condition = self.or()?;
        if !self.match_token(&TokenKind::Question) {
            self.depth -= 1;
            return Ok(condition);
        }
        let then_branch = self.ternary()?;
        self.consume(&TokenKind::Colon, "':'")?;
        let else_branch = self.ternary()?;
        self.depth -= 1;
        Ok(Expr::Ternary {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    fn or(&mut self) -> Result<Expr, ParseError> {
        self.left_assoc(Self::and, |kind| match kind {
            TokenKind::OrOr => Some(BinaryOp::Or),
            _ => None,
        })
    }

    fn and(&mut self) -> Result<Expr, ParseError> {
        self.left_assoc(Self::equality, |kind| match kind {
            TokenKind::AndAnd => Some(BinaryOp::And),
            _ => None,
        })
    }

    fn equality(&mut self) -> Result<Expr, ParseError> {
        self.left_assoc(Self::relational, |kind| match kind {
            TokenKind::EqEq => Some(BinaryOp::Eq),
            TokenKind::BangEq => Some(BinaryOp::Ne),
            _ => None,
        })
    }

    fn relational(&mut self) -> Result<Expr, ParseError> {
        self.left_assoc(Self::additive, |kind| match kind {
            TokenKind::Lt => Some(BinaryOp::Lt),
            TokenKind::LtEq => Some(BinaryOp::Le),
            TokenKind::Gt => Some(BinaryOp::Gt),
            TokenKind::GtEq => Some(BinaryOp::Ge),
            _ => None,
        })
    }

    fn additive(&mut self) -> Result<Expr, ParseError> {
        self.left_assoc(Self::multiplicative, |kind| match kind {
            TokenKind::Plus => Some(BinaryOp::Add),
            TokenKind::Minus => Some(BinaryOp::Sub),
            _ => None,
        })
    }

    fn multiplicative(&mut self) -> Result<Expr, ParseError> {
        self.left_assoc(Self::unary, |kind| match kind {
            TokenKind::Star => Some(BinaryOp::Mul),
            TokenKind::Slash => Some(BinaryOp::Div),
            TokenKind::Percent => Some(BinaryOp::Mod),
            _ => None,
        })
    }

    /// One precedence level of left-associative binary operators. Every
    /// operator in the chain deepens the tree by one.
    fn left_assoc(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, ParseError>,
        operator: fn(&TokenKind) -> Option<BinaryOp>,
    ) -> Result<Expr, ParseError> {
        let base = self.depth;
        let mut left = operand(self)?;
        while let Some(op) = operator(self.peek_kind()) {
            self.advance();
            self.descend()?;
            let right = operand(self)?;
            left = binary(left, op, right);
        }
        self.depth = base;
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek_kind() {
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            _ => return self.primary(),
        };
        self.advance();
        self.descend()?;
        let expr = self.unary()?;
        self.depth -= 1;
        Ok(Expr::Unary {
            op,
            expr: Box::new(expr),
        })
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.advance().clone();
        match token.kind {
            TokenKind::Number(n) => Ok(Expr::Number(n)),
            // Strings have no numeric meaning; they read as 0.
            TokenKind::Str => Ok(Expr::Number(0.0)),
            TokenKind::LParen => {
                let expr = self.ternary()?;
                self.consume(&TokenKind::RParen, "')'")?;
                Ok(expr)
            }
            TokenKind::Ident(name) => {
                if self.match_token(&TokenKind::LParen) {
                    return self.finish_call(name);
                }
                Ok(match name.as_str() {
                    "true" => Expr::Bool(true),
                    "false" => Expr::Bool(false),
                    "pi" | "math.pi" => Expr::Number(std::f64::consts::PI),
                    _ => Expr::Ident(name),
                })
            }
            TokenKind::Eof => Err(ParseError::UnexpectedEof),
            _ => Err(ParseError::UnexpectedToken {
                offset: token.offset,
            }),
        }
    }

    fn finish_call(&mut self, name: String) -> Result<Expr, ParseError> {
        let mut args = Vec::new();
        if !self.match_token(&TokenKind::RParen) {
            loop {
                args.push(self.ternary()?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            self.consume(&TokenKind::RParen, "')'")?;
        }
        Ok(Expr::Call { name, args })
    }

    // === Token helpers ===

    fn peek_kind(&self) -> &TokenKind {
        &self.tokens[self.current.min(self.tokens.len() - 1)].kind
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn advance(&mut self) -> &Token {
        let index = self.current.min(self.tokens.len() - 1);
        if self.tokens[index].kind != TokenKind::Eof {
            self.current += 1;
        }
        &self.tokens[index]
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: &TokenKind, expected: &'static str) -> Result<(), ParseError> {
        if self.match_token(kind) {
            return Ok(());
        }
        if self.check(&TokenKind::Eof) {
            return Err(ParseError::UnexpectedEof);
        }
        Err(ParseError::Expected {
            expected,
            offset: self.tokens[self.current].offset,
        })
    }

    fn unexpected(&self) -> ParseError {
        ParseError::UnexpectedToken {
            offset: self.offset(),
        }
    }

    fn offset(&self) -> usize {
        self.tokens[self.current.min(self.tokens.len() - 1)].offset
    }

    fn descend(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::TooDeep {
                offset: self.offset(),
            });
        }
        Ok(())
    }
}

fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    Expr::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}
