//! Compiling queries and the [`Filter`] facade.

use std::fmt;

use crate::{
    ast::Expr,
    evaluator::{DeclareAtomError, Environment, EvalError, Evaluator},
    lexer::{self, LexError},
    parser::{ParseError, Parser},
};

/// The first lexical or syntax error found while compiling a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Lexer error
    Lex(LexError),
    /// Parser error
    Parse(ParseError),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Lex(e) => write!(f, "Lex error: {}", e),
            CompileError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Lex(e) => Some(e),
            CompileError::Parse(e) => Some(e),
        }
    }
}

impl From<LexError> for CompileError {
    fn from(e: LexError) -> Self {
        CompileError::Lex(e)
    }
}

impl From<ParseError> for CompileError {
    fn from(e: ParseError) -> Self {
        CompileError::Parse(e)
    }
}

/// Scans and parses `query` into a reusable tree.
///
/// An empty (or all-space) query compiles to [`Expr::Nil`], which accepts
/// everything.
///
/// # Examples
///
/// ```
/// use sift_lang::{BinOp, Expr, compile};
///
/// let expr = compile("size gt 0").unwrap();
/// assert!(matches!(expr, Expr::Binary { op: BinOp::Gt, .. }));
///
/// assert_eq!(compile("").unwrap(), Expr::Nil);
/// assert!(compile("'abc").is_err());
/// ```
pub fn compile(query: &str) -> Result<Expr, CompileError> {
    let tokens = lexer::scan(query)?;
    let token_count = tokens.len();
    let expr = Parser::new(tokens).parse()?;

    tracing::debug!(query, tokens = token_count, root = expr.kind_name(), "compiled filter");
    Ok(expr)
}

/// A compiled filter plus the bindings it is evaluated against.
///
/// Compile once, then for every record update the variables and call
/// [`Filter::eval`]. Setters chain.
///
/// # Examples
///
/// ```
/// use sift_lang::Filter;
///
/// let mut filter = Filter::compile("size gt 0 and method eq :get and status eq 200").unwrap();
/// filter.declare_atoms([(":get", 0), (":post", 1)]).unwrap();
///
/// filter
///     .set_integer("size", 1)
///     .set_atom_variable("method", 0)
///     .set_integer("status", 200);
/// assert_eq!(filter.eval(), Ok(true));
///
/// filter.set_atom_variable("method", 1);
/// assert_eq!(filter.eval(), Ok(false));
/// ```
#[derive(Debug, Clone)]
pub struct Filter {
    evaluator: Evaluator,
}

impl Filter {
    pub fn compile(query: &str) -> Result<Self, CompileError> {
        Ok(Filter::from_expr(compile(query)?))
    }

    pub fn from_expr(expr: Expr) -> Self {
        Filter {
            evaluator: Evaluator::new(expr),
        }
    }

    /// The compiled tree. It is immutable and can be evaluated from other
    /// threads with separate [`Environment`]s.
    pub fn expr(&self) -> &Expr {
        self.evaluator.expr()
    }

    pub fn env(&self) -> &Environment {
        self.evaluator.env()
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        self.evaluator.env_mut()
    }

    /// Registers one atom. Atoms are usually declared once, before the first
    /// evaluation.
    pub fn declare_atom(&mut self, literal: &str, code: i64) -> Result<&mut Self, DeclareAtomError> {
        self.env_mut().declare_atom(literal, code)?;
        Ok(self)
    }

    /// Registers several atoms, stopping at the first invalid literal.
    pub fn declare_atoms<'a, I>(&mut self, atoms: I) -> Result<&mut Self, DeclareAtomError>
    where
        I: IntoIterator<Item = (&'a str, i64)>,
    {
        for (literal, code) in atoms {
            self.env_mut().declare_atom(literal, code)?;
        }
        Ok(self)
    }

    pub fn set_string(&mut self, name: &str, value: &str) -> &mut Self {
        self.env_mut().set_string(name, value);
        self
    }

    pub fn set_integer(&mut self, name: &str, value: i64) -> &mut Self {
        self.env_mut().set_integer(name, value);
        self
    }

    pub fn set_float(&mut self, name: &str, value: f64) -> &mut Self {
        self.env_mut().set_float(name, value);
        self
    }

    pub fn set_bool(&mut self, name: &str, value: bool) -> &mut Self {
        self.env_mut().set_bool(name, value);
        self
    }

    pub fn set_atom_variable(&mut self, name: &str, code: i64) -> &mut Self {
        self.env_mut().set_atom_variable(name, code);
        self
    }

    /// Forgets every variable binding, keeping declared atoms.
    pub fn clear_variables(&mut self) -> &mut Self {
        self.env_mut().clear_variables();
        self
    }

    pub fn eval(&self) -> Result<bool, EvalError> {
        self.evaluator.evaluate()
    }
}
