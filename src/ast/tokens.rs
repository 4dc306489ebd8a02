/// Kind of a lexical token.
///
/// Keywords are recognized by exact match against identifier-shaped lexemes;
/// anything else shaped like an identifier is a [`TokenKind::Symbol`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Delimiters
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,

    // Logical
    /// `and`
    And,
    /// `or`
    Or,

    // Literal keywords
    /// `true`
    True,
    /// `false`
    False,
    /// `nil`
    Nil,

    // Comparison
    /// `eq`
    Eq,
    /// `ne`
    Ne,
    /// `gt`
    Gt,
    /// `lt`
    Lt,
    /// `gte`
    Gte,
    /// `lte`
    Lte,
    /// `reg`, regular expression match
    Reg,

    /// Bare identifier, later resolved as a variable
    ///
    /// # Examples
    /// ```text
    /// size
    /// user_agent
    /// ```
    Symbol,

    /// Run of ASCII digits
    Integer,

    /// Digits, a dot, then digits
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// 10.0
    /// ```
    Float,

    /// Identifier prefixed by `:`; the token value keeps the colon
    ///
    /// # Examples
    /// ```text
    /// :get
    /// :post
    /// ```
    Atom,

    /// Single-quoted string; the token value is the raw text between the
    /// quotes, still escaped
    String,
}

/// Fixed keyword table, consulted after an identifier has been read.
pub const KEYWORDS: &[(&str, TokenKind)] = &[
    ("true", TokenKind::True),
    ("false", TokenKind::False),
    ("nil", TokenKind::Nil),
    ("and", TokenKind::And),
    ("or", TokenKind::Or),
    ("reg", TokenKind::Reg),
    ("eq", TokenKind::Eq),
    ("ne", TokenKind::Ne),
    ("gt", TokenKind::Gt),
    ("lt", TokenKind::Lt),
    ("gte", TokenKind::Gte),
    ("lte", TokenKind::Lte),
];

impl TokenKind {
    /// Looks up an identifier in the keyword table.
    pub fn keyword(ident: &str) -> Option<TokenKind> {
        KEYWORDS
            .iter()
            .find(|(word, _)| *word == ident)
            .map(|(_, kind)| *kind)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            TokenKind::Eq
                | TokenKind::Ne
                | TokenKind::Gt
                | TokenKind::Lt
                | TokenKind::Gte
                | TokenKind::Lte
                | TokenKind::Reg
        )
    }
}

/// A token produced by the lexer.
///
/// `value` borrows from the query text, so tokens live only as long as the
/// source they were scanned from. The parser copies whatever it keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub value: &'src str,
    /// 1-based offset of the first character
    pub position: usize,
}

impl<'src> Token<'src> {
    pub fn new(kind: TokenKind, value: &'src str, position: usize) -> Self {
        Token {
            kind,
            value,
            position,
        }
    }
}
