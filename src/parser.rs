use std::fmt;

use crate::ast::{BinOp, Expr, Token, TokenKind};

/// Deepest tree the parser will build. Counts both parenthesis nesting and
/// the height of `and`/`or` chains, so parsing, evaluating and dropping a
/// tree all stay within a fixed amount of stack.
pub const MAX_DEPTH: usize = 256;

/// A subtree together with its height.
type Subtree = (Expr, usize);

/// Errors raised while building the tree. Each one names the offending token
/// text and its 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Input ran out in the middle of a rule
    MissingToken { expected: &'static str },

    /// A token that cannot start a primary expression
    UnexpectedToken { found: String, position: usize },

    /// A primary followed by something other than an operator, `and`, `or`
    /// or `)`
    ExpectedComparison { found: String, position: usize },

    /// A parenthesized expression not closed by `)`
    UnclosedParen { found: String, position: usize },

    /// Tokens left over after a complete expression
    TrailingToken { found: String, position: usize },

    /// Integer literal out of range
    InvalidInteger { text: String, reason: String },

    /// Float literal that does not parse
    InvalidFloat { text: String, reason: String },

    /// Parentheses nested, or `and`/`or` chained, past [`MAX_DEPTH`]
    TooDeep { position: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingToken { expected } => {
                write!(f, "missing token: expected {}", expected)
            }
            ParseError::UnexpectedToken { found, position } => {
                write!(f, "unexpected token \"{}\" at position {}", found, position)
            }
            ParseError::ExpectedComparison { found, position } => write!(
                f,
                "expected comparison operator after expression but got \"{}\" at position {}",
                found, position
            ),
            ParseError::UnclosedParen { found, position } => {
                write!(f, "expected ')' but got \"{}\" at position {}", found, position)
            }
            ParseError::TrailingToken { found, position } => write!(
                f,
                "unexpected token \"{}\" after end of expression at position {}",
                found, position
            ),
            ParseError::InvalidInteger { text, reason } => {
                write!(f, "could not parse \"{}\" as integer: {}", text, reason)
            }
            ParseError::InvalidFloat { text, reason } => {
                write!(f, "could not parse \"{}\" as float: {}", text, reason)
            }
            ParseError::TooDeep { position } => write!(
                f,
                "expression nested deeper than {} levels at position {}",
                MAX_DEPTH, position
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Undoes the `\'` and `\\` escapes kept in string tokens.
pub fn unescape_string(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(escaped) = chars.next() {
                result.push(escaped);
            }
        } else {
            result.push(ch);
        }
    }
    result
}

/// Recursive descent parser.
///
/// ```text
/// expression := term ( 'or' term )*
/// term       := factor ( 'and' factor )*
/// factor     := '(' expression ')' | comparison
/// comparison := primary ( operator primary )?
/// primary    := integer | float | string | 'true' | 'false' | 'nil' | atom | symbol
/// ```
///
/// A bare primary is only accepted where the next token is `and`, `or`, `)`
/// or the end of input. Trees higher than [`MAX_DEPTH`] are rejected with
/// [`ParseError::TooDeep`].
pub struct Parser<'src> {
    tokens: Vec<Token<'src>>,
    position: usize,
    /// Open parentheses around the current token
    nesting: usize,
}

impl<'src> Parser<'src> {
    pub fn new(tokens: Vec<Token<'src>>) -> Self {
        Parser {
            tokens,
            position: 0,
            nesting: 0,
        }
    }

    fn current_token(&self) -> Option<Token<'src>> {
        self.tokens.get(self.position).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current_token().is_some_and(|token| token.kind == kind)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.current_token().ok_or(ParseError::MissingToken {
            expected: "primary expression",
        })?;

        let expr = match token.kind {
            // Literals
            TokenKind::Integer => {
                let n = token
                    .value
                    .parse::<i64>()
                    .map_err(|e| ParseError::InvalidInteger {
                        text: token.value.to_string(),
                        reason: e.to_string(),
                    })?;
                Expr::Integer(n)
            }
            TokenKind::Float => {
                let n = token
                    .value
                    .parse::<f64>()
                    .map_err(|e| ParseError::InvalidFloat {
                        text: token.value.to_string(),
                        reason: e.to_string(),
                    })?;
                Expr::Float(n)
            }
            TokenKind::String => Expr::String(unescape_string(token.value)),
            TokenKind::True => Expr::Bool(true),
            TokenKind::False => Expr::Bool(false),
            TokenKind::Nil => Expr::Nil,

            // Deferred references
            TokenKind::Atom => Expr::LazyAtom(token.value.to_string()),
            TokenKind::Symbol => Expr::LazySymbol(token.value.to_string()),

            _ => {
                return Err(ParseError::UnexpectedToken {
                    found: token.value.to_string(),
                    position: token.position,
                });
            }
        };

        self.advance();
        Ok(expr)
    }

    fn parse_comparison(&mut self) -> Result<Subtree, ParseError> {
        let left = self.parse_primary()?;

        let Some(token) = self.current_token() else {
            return Ok((left, 1));
        };

        match token.kind {
            TokenKind::And | TokenKind::Or | TokenKind::CloseParen => Ok((left, 1)),
            kind => match BinOp::from_token_kind(kind) {
                Some(op) if kind.is_comparison() => {
                    self.advance();
                    let right = self.parse_primary()?;
                    Ok((Expr::binary(op, left, right), 2))
                }
                _ => Err(ParseError::ExpectedComparison {
                    found: token.value.to_string(),
                    position: token.position,
                }),
            },
        }
    }

    fn parse_factor(&mut self) -> Result<Subtree, ParseError> {
        if !self.check(TokenKind::OpenParen) {
            return self.parse_comparison();
        }

        if self.nesting >= MAX_DEPTH {
            return Err(ParseError::TooDeep {
                position: self.tokens[self.position].position,
            });
        }

        self.advance(); // Consume '('
        self.nesting += 1;
        let inner = self.parse_or()?;
        self.nesting -= 1;

        match self.current_token() {
            Some(token) if token.kind == TokenKind::CloseParen => {
                self.advance();
                Ok(inner)
            }
            Some(token) => Err(ParseError::UnclosedParen {
                found: token.value.to_string(),
                position: token.position,
            }),
            None => Err(ParseError::MissingToken { expected: "')'" }),
        }
    }

    /// Folds `left op right`, refusing trees higher than [`MAX_DEPTH`].
    fn fold(
        op: BinOp,
        operator: Token<'src>,
        (left, left_height): Subtree,
        (right, right_height): Subtree,
    ) -> Result<Subtree, ParseError> {
        let height = left_height.max(right_height) + 1;
        if height > MAX_DEPTH {
            return Err(ParseError::TooDeep {
                position: operator.position,
            });
        }
        Ok((Expr::binary(op, left, right), height))
    }

    fn parse_and(&mut self) -> Result<Subtree, ParseError> {
        let mut left = self.parse_factor()?;

        while let Some(operator) = self.current_token().filter(|t| t.kind == TokenKind::And) {
            self.advance();
            let right = self.parse_factor()?;
            left = Self::fold(BinOp::And, operator, left, right)?;
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Subtree, ParseError> {
        let mut left = self.parse_and()?;

        while let Some(operator) = self.current_token().filter(|t| t.kind == TokenKind::Or) {
            self.advance();
            let right = self.parse_and()?;
            left = Self::fold(BinOp::Or, operator, left, right)?;
        }
        Ok(left)
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_or().map(|(expr, _)| expr)
    }

    /// Parses the whole token stream. No tokens at all gives [`Expr::Nil`],
    /// the filter that accepts everything.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        if self.tokens.is_empty() {
            return Ok(Expr::Nil);
        }

        let expr = self.parse_expression()?;

        if let Some(token) = self.current_token() {
            return Err(ParseError::TrailingToken {
                found: token.value.to_string(),
                position: token.position,
            });
        }
        Ok(expr)
    }
}
