use crate::ast::BinOp;

/// Abstract Syntax Tree node representing a parsed filter.
///
/// The tree is strictly owned: every `Binary` node owns its two children and
/// nothing is shared. Once parsed it is never mutated, so one tree can be
/// evaluated any number of times, from any number of threads, each with its
/// own [`Environment`](crate::Environment).
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // Literals
    /// `nil`. As the root of a tree it means "no filter" and evaluates to
    /// `true`; an empty query compiles to this.
    Nil,

    /// Literal integer
    ///
    /// # Example
    /// ```text
    /// 200
    /// ```
    Integer(i64),

    /// Literal floating point number
    ///
    /// # Example
    /// ```text
    /// 0.5
    /// ```
    Float(f64),

    /// String literal, already unescaped
    ///
    /// # Example
    /// ```text
    /// 'it\'s'
    /// ```
    String(String),

    /// Resolved atom code. Never produced by the parser, only by resolving a
    /// [`Expr::LazyAtom`] or an atom-typed variable.
    Atom(i64),

    /// Boolean literal
    Bool(bool),

    // Operations
    /// Comparison or logical connective
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    // Deferred references
    /// Atom literal, looked up in the atom table at evaluation time.
    /// Holds the literal text including the leading colon.
    ///
    /// # Example
    /// ```text
    /// :get
    /// ```
    LazyAtom(String),

    /// Variable name, looked up in the symbol table at evaluation time.
    ///
    /// # Example
    /// ```text
    /// size
    /// ```
    LazySymbol(String),
}

impl Expr {
    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Human-readable kind, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Nil => "nil",
            Expr::Integer(_) => "integer",
            Expr::Float(_) => "float",
            Expr::String(_) => "string",
            Expr::Atom(_) => "atom",
            Expr::Bool(_) => "bool",
            Expr::Binary { .. } => "binary",
            Expr::LazyAtom(_) => "lazy atom",
            Expr::LazySymbol(_) => "lazy symbol",
        }
    }
}
