use crate::ast::Expr;

/// A typed value bound to a variable name.
///
/// Variables are what bare identifiers in a filter resolve to. Each one keeps
/// its type, and comparisons never convert between types: an `Integer`
/// variable compared to a float literal is a type error.
///
/// # Examples
///
/// ```
/// use sift_lang::Variable;
///
/// let size = Variable::Integer(42);
/// let agent = Variable::from("curl/8.0");
/// let method = Variable::Atom(0);
///
/// assert_eq!(size.kind_name(), "integer");
/// assert_eq!(agent, Variable::String("curl/8.0".to_string()));
/// assert_eq!(method.kind_name(), "atom");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Variable {
    /// UTF-8 string
    String(String),

    /// Signed integer
    Integer(i64),

    /// Floating-point number
    Float(f64),

    /// Boolean
    Bool(bool),

    /// Atom code, comparable only with other atoms
    Atom(i64),
}

impl Variable {
    /// Human-readable type name, matching [`Expr::kind_name`]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Variable::String(_) => "string",
            Variable::Integer(_) => "integer",
            Variable::Float(_) => "float",
            Variable::Bool(_) => "bool",
            Variable::Atom(_) => "atom",
        }
    }

    /// Builds the immediate-value node this variable resolves to.
    pub fn to_expr(&self) -> Expr {
        match self {
            Variable::String(s) => Expr::String(s.clone()),
            Variable::Integer(n) => Expr::Integer(*n),
            Variable::Float(n) => Expr::Float(*n),
            Variable::Bool(b) => Expr::Bool(*b),
            Variable::Atom(code) => Expr::Atom(*code),
        }
    }
}

impl From<&str> for Variable {
    fn from(value: &str) -> Self {
        Variable::String(value.to_string())
    }
}

impl From<String> for Variable {
    fn from(value: String) -> Self {
        Variable::String(value)
    }
}

impl From<i64> for Variable {
    fn from(value: i64) -> Self {
        Variable::Integer(value)
    }
}

impl From<f64> for Variable {
    fn from(value: f64) -> Self {
        Variable::Float(value)
    }
}

impl From<bool> for Variable {
    fn from(value: bool) -> Self {
        Variable::Bool(value)
    }
}
