use std::fmt;

use crate::ast::{Token, TokenKind};

/// Errors raised while scanning. Positions are 1-based byte offsets into the
/// query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// A character that cannot start any token
    UnexpectedCharacter { ch: char, position: usize },

    /// Input ended before the closing quote; points at the opening quote
    UnterminatedString { position: usize },

    /// A backslash followed by anything but `'` or `\`; points at the backslash
    InvalidEscape { position: usize },

    /// A `:` not followed by an identifier; points at the colon
    MissingAtomName { position: usize },
}

impl LexError {
    pub fn position(&self) -> usize {
        match self {
            LexError::UnexpectedCharacter { position, .. }
            | LexError::UnterminatedString { position }
            | LexError::InvalidEscape { position }
            | LexError::MissingAtomName { position } => *position,
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnexpectedCharacter { ch, position } => {
                write!(f, "unexpected character \"{}\" at position {}", ch, position)
            }
            LexError::UnterminatedString { position } => {
                write!(f, "unterminated string literal at position {}", position)
            }
            LexError::InvalidEscape { position } => {
                write!(f, "invalid escape sequence at position {}", position)
            }
            LexError::MissingAtomName { position } => {
                write!(f, "missing atom name at position {}", position)
            }
        }
    }
}

impl std::error::Error for LexError {}

/// Identifier characters: ASCII letters and underscore. Digits are not
/// included, so `a1` scans as the symbol `a` followed by the integer `1`.
pub fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

/// Single pass scanner over a query string.
///
/// Errors are fatal: the first one aborts the scan and no tokens are returned.
pub struct Lexer<'src> {
    input: &'src str,
    /// Byte offset of the cursor
    position: usize,
    /// Byte offset where the current token began
    start: usize,
    tokens: Vec<Token<'src>>,
}

impl<'src> Lexer<'src> {
    pub fn new(input: &'src str) -> Self {
        Lexer {
            input,
            position: 0,
            start: 0,
            tokens: Vec::new(),
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    /// The character right after the current one
    fn peek_char(&self) -> Option<char> {
        let mut chars = self.input[self.position..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.position += ch.len_utf8();
        }
    }

    /// Only the space character counts as whitespace.
    fn skip_whitespace(&mut self) {
        while self.current_char() == Some(' ') {
            self.advance();
        }
    }

    fn push(&mut self, kind: TokenKind, value: &'src str) {
        self.tokens.push(Token::new(kind, value, self.start + 1));
    }

    fn single_char(&mut self, kind: TokenKind) {
        self.advance();
        let input = self.input;
        self.push(kind, &input[self.start..self.position]);
    }

    fn read_identifier(&mut self) -> &'src str {
        let input = self.input;
        let begin = self.position;
        while self.current_char().is_some_and(is_identifier_char) {
            self.advance();
        }
        &input[begin..self.position]
    }

    fn read_symbol_or_keyword(&mut self) {
        let ident = self.read_identifier();
        let kind = TokenKind::keyword(ident).unwrap_or(TokenKind::Symbol);
        self.push(kind, ident);
    }

    fn read_atom(&mut self) -> Result<(), LexError> {
        self.advance(); // Consume ':'

        let name = self.read_identifier();
        if name.is_empty() {
            return Err(LexError::MissingAtomName {
                position: self.start + 1,
            });
        }

        let input = self.input;
        self.push(TokenKind::Atom, &input[self.start..self.position]);
        Ok(())
    }

    fn read_number(&mut self) {
        let mut is_float = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                self.advance();
            } else if ch == '.'
                && !is_float
                && self.peek_char().is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                self.advance();
            } else {
                break;
            }
        }

        let kind = if is_float {
            TokenKind::Float
        } else {
            TokenKind::Integer
        };
        let input = self.input;
        self.push(kind, &input[self.start..self.position]);
    }

    /// Reads a single-quoted string. The token keeps the raw text between the
    /// quotes; `\'` and `\\` are the only escapes accepted and are undone by
    /// the parser.
    fn read_string(&mut self) -> Result<(), LexError> {
        self.advance(); // Consume opening quote

        loop {
            match self.current_char() {
                None => {
                    return Err(LexError::UnterminatedString {
                        position: self.start + 1,
                    });
                }
                Some('\'') => break,
                Some('\\') => match self.peek_char() {
                    Some('\'' | '\\') => {
                        self.advance();
                        self.advance();
                    }
                    Some(_) => {
                        return Err(LexError::InvalidEscape {
                            position: self.position + 1,
                        });
                    }
                    None => {
                        return Err(LexError::UnterminatedString {
                            position: self.start + 1,
                        });
                    }
                },
                Some(_) => self.advance(),
            }
        }

        let input = self.input;
        let value = &input[self.start + 1..self.position];
        self.advance(); // Consume closing quote
        self.push(TokenKind::String, value);
        Ok(())
    }

    /// Scans the whole input.
    pub fn scan(mut self) -> Result<Vec<Token<'src>>, LexError> {
        loop {
            self.skip_whitespace();

            let Some(ch) = self.current_char() else {
                break;
            };
            self.start = self.position;

            match ch {
                '\'' => self.read_string()?,
                '(' => self.single_char(TokenKind::OpenParen),
                ')' => self.single_char(TokenKind::CloseParen),
                ':' => self.read_atom()?,
                c if c.is_ascii_digit() => self.read_number(),
                c if is_identifier_char(c) => self.read_symbol_or_keyword(),
                c => {
                    return Err(LexError::UnexpectedCharacter {
                        ch: c,
                        position: self.position + 1,
                    });
                }
            }
        }

        Ok(self.tokens)
    }
}

/// Scans `input` into tokens.
pub fn scan(input: &str) -> Result<Vec<Token<'_>>, LexError> {
    Lexer::new(input).scan()
}

#[test]
fn test_keywords() {
    let tokens = scan("and or true false nil").unwrap();
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::And,
            TokenKind::Or,
            TokenKind::True,
            TokenKind::False,
            TokenKind::Nil,
        ]
    );
}

#[test]
fn test_filter() {
    let tokens = scan("(size gt 5)").unwrap();
    assert_eq!(tokens[0], Token::new(TokenKind::OpenParen, "(", 1));
    assert_eq!(tokens[1], Token::new(TokenKind::Symbol, "size", 2));
    assert_eq!(tokens[2], Token::new(TokenKind::Gt, "gt", 7));
    assert_eq!(tokens[3], Token::new(TokenKind::Integer, "5", 10));
    assert_eq!(tokens[4], Token::new(TokenKind::CloseParen, ")", 11));
    assert_eq!(tokens.len(), 5);
}
