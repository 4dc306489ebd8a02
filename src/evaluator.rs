use std::{borrow::Cow, cell::RefCell, collections::HashMap, fmt};

use regex::Regex;

use crate::{
    ast::{BinOp, Expr, TokenKind},
    lexer::{self, LexError},
    parser::MAX_DEPTH,
    value::Variable,
};

/// Compiled patterns kept per environment before the cache starts over.
const PATTERN_CACHE_LIMIT: usize = 64;

/// Errors that can occur during evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// A bare identifier with no binding in the symbol table
    UndefinedVariable(String),

    /// An atom literal missing from the atom table
    UndefinedAtom(String),

    /// Operator not defined for this pair of operand types
    TypeMismatch {
        op: BinOp,
        left: &'static str,
        right: &'static str,
    },

    /// An `and`/`or` operand, or the root, that is not boolean-valued
    NotBoolean(&'static str),

    /// Right-hand side of `reg` is not a valid regular expression
    InvalidPattern { pattern: String, reason: String },

    /// A hand-built tree higher than the parser would ever produce
    TooDeep,
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::UndefinedVariable(name) => {
                write!(f, "variable \"{}\" does not exist", name)
            }
            EvalError::UndefinedAtom(literal) => write!(f, "atom \"{}\" does not exist", literal),
            EvalError::TypeMismatch { op, left, right } => write!(
                f,
                "cannot do such operation: {} {} {}",
                left, op, right
            ),
            EvalError::NotBoolean(kind) => {
                write!(f, "expected a boolean expression but got {}", kind)
            }
            EvalError::InvalidPattern { pattern, reason } => {
                write!(f, "invalid regular expression '{}': {}", pattern, reason)
            }
            EvalError::TooDeep => {
                write!(f, "expression nested deeper than {} levels", MAX_DEPTH)
            }
        }
    }
}

impl std::error::Error for EvalError {}

/// Errors from [`Environment::declare_atom`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclareAtomError {
    /// The literal does not even scan
    Lex(LexError),

    /// The literal scans, but not as exactly one atom token
    NotAnAtom(String),
}

impl fmt::Display for DeclareAtomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclareAtomError::Lex(e) => write!(f, "invalid atom: {}", e),
            DeclareAtomError::NotAnAtom(literal) => {
                write!(f, "\"{}\" is not a single atom literal", literal)
            }
        }
    }
}

impl std::error::Error for DeclareAtomError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeclareAtomError::Lex(e) => Some(e),
            DeclareAtomError::NotAnAtom(_) => None,
        }
    }
}

impl From<LexError> for DeclareAtomError {
    fn from(e: LexError) -> Self {
        DeclareAtomError::Lex(e)
    }
}

/// Symbol and atom tables a filter is evaluated against.
///
/// Tables change only through the setters below, never during evaluation. A
/// compiled [`Expr`] can be shared between threads as long as each thread
/// evaluates it with its own `Environment`.
///
/// Right-hand sides of `reg` are compiled once and reused across
/// evaluations, which is why an `Environment` is `Send` but not `Sync`.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// Variable name -> typed value, last write wins
    variables: HashMap<String, Variable>,
    /// Atom literal, colon included -> atom code
    atoms: HashMap<String, i64>,
    /// Pattern text -> compiled regex
    patterns: RefCell<HashMap<String, Regex>>,
}

impl Environment {
    /// Creates an environment with empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<Variable>) {
        self.variables.insert(name.into(), value.into());
    }

    pub fn set_string(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.set_variable(name, Variable::String(value.into()));
    }

    pub fn set_integer(&mut self, name: impl Into<String>, value: i64) {
        self.set_variable(name, Variable::Integer(value));
    }

    pub fn set_float(&mut self, name: impl Into<String>, value: f64) {
        self.set_variable(name, Variable::Float(value));
    }

    pub fn set_bool(&mut self, name: impl Into<String>, value: bool) {
        self.set_variable(name, Variable::Bool(value));
    }

    /// Binds `name` to an atom code. The code is compared against the codes
    /// of atom literals such as `:get`.
    pub fn set_atom_variable(&mut self, name: impl Into<String>, code: i64) {
        self.set_variable(name, Variable::Atom(code));
    }

    pub fn remove_variable(&mut self, name: &str) -> Option<Variable> {
        self.variables.remove(name)
    }

    /// Drops every variable binding. Declared atoms are kept.
    pub fn clear_variables(&mut self) {
        self.variables.clear();
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Registers the code for an atom literal such as `":get"`.
    ///
    /// The literal goes through the lexer and must come out as exactly one
    /// atom token; surrounding spaces are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use sift_lang::Environment;
    ///
    /// let mut env = Environment::new();
    /// env.declare_atom(":get", 0).unwrap();
    /// assert_eq!(env.atom_code(":get"), Some(0));
    ///
    /// assert!(env.declare_atom("get", 1).is_err());
    /// assert!(env.declare_atom(":get :post", 1).is_err());
    /// ```
    pub fn declare_atom(&mut self, literal: &str, code: i64) -> Result<(), DeclareAtomError> {
        let tokens = lexer::scan(literal)?;

        match tokens.as_slice() {
            [token] if token.kind == TokenKind::Atom => {
                tracing::debug!(atom = token.value, code, "declared atom");
                self.atoms.insert(token.value.to_string(), code);
                Ok(())
            }
            _ => Err(DeclareAtomError::NotAnAtom(literal.to_string())),
        }
    }

    pub fn atom_code(&self, literal: &str) -> Option<i64> {
        self.atoms.get(literal).copied()
    }

    /// Number of compiled `reg` patterns currently cached.
    pub fn cached_patterns(&self) -> usize {
        self.patterns.borrow().len()
    }

    /// Resolves a lazy reference into an immediate value.
    ///
    /// Symbols are looked up in the variable table and atoms in the atom
    /// table. Every other node is passed through borrowed. The tree is never
    /// modified.
    pub fn resolve<'e>(&self, expr: &'e Expr) -> Result<Cow<'e, Expr>, EvalError> {
        match expr {
            Expr::LazySymbol(name) => self
                .variables
                .get(name)
                .map(|variable| Cow::Owned(variable.to_expr()))
                .ok_or_else(|| EvalError::UndefinedVariable(name.clone())),
            Expr::LazyAtom(literal) => self
                .atom_code(literal)
                .map(|code| Cow::Owned(Expr::Atom(code)))
                .ok_or_else(|| EvalError::UndefinedAtom(literal.clone())),
            _ => Ok(Cow::Borrowed(expr)),
        }
    }

    /// Evaluates a compiled filter against the current tables.
    ///
    /// A `Nil` root means "no filter" and is always `true`. `and`/`or` do not
    /// short-circuit: both sides are evaluated, and an error on the left
    /// wins over one on the right.
    ///
    /// # Examples
    ///
    /// ```
    /// use sift_lang::{Environment, compile};
    ///
    /// let expr = compile("size gt 40").unwrap();
    /// let mut env = Environment::new();
    ///
    /// assert!(env.evaluate(&expr).is_err());
    ///
    /// env.set_integer("size", 41);
    /// assert_eq!(env.evaluate(&expr), Ok(true));
    ///
    /// env.set_integer("size", 38);
    /// assert_eq!(env.evaluate(&expr), Ok(false));
    /// ```
    pub fn evaluate(&self, expr: &Expr) -> Result<bool, EvalError> {
        tracing::trace!(root = expr.kind_name(), "evaluating filter");

        match expr {
            Expr::Nil => Ok(true),
            _ => self.eval_bool(expr, 1),
        }
    }

    fn eval_bool(&self, expr: &Expr, depth: usize) -> Result<bool, EvalError> {
        if depth > MAX_DEPTH {
            return Err(EvalError::TooDeep);
        }

        let resolved = self.resolve(expr)?;

        match &*resolved {
            Expr::Bool(b) => Ok(*b),
            Expr::Binary { op, left, right } => self.eval_binary(*op, left, right, depth),
            other => Err(EvalError::NotBoolean(other.kind_name())),
        }
    }

    fn eval_binary(
        &self,
        op: BinOp,
        left: &Expr,
        right: &Expr,
        depth: usize,
    ) -> Result<bool, EvalError> {
        match op {
            BinOp::And => {
                let left_val = self.eval_bool(left, depth + 1)?;
                let right_val = self.eval_bool(right, depth + 1)?;
                Ok(left_val && right_val)
            }
            BinOp::Or => {
                let left_val = self.eval_bool(left, depth + 1)?;
                let right_val = self.eval_bool(right, depth + 1)?;
                Ok(left_val || right_val)
            }
            _ => {
                let left_val = self.resolve(left)?;
                let right_val = self.resolve(right)?;
                self.apply_comparison(op, &left_val, &right_val)
            }
        }
    }

    /// Unanchored search of `pattern` in `text`.
    fn matches_pattern(&self, text: &str, pattern: &str) -> Result<bool, EvalError> {
        if let Some(re) = self.patterns.borrow().get(pattern) {
            return Ok(re.is_match(text));
        }

        let re = Regex::new(pattern).map_err(|e| EvalError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        let is_match = re.is_match(text);

        let mut patterns = self.patterns.borrow_mut();
        // Patterns bound from variables can differ on every record
        if patterns.len() >= PATTERN_CACHE_LIMIT {
            patterns.clear();
        }
        patterns.insert(pattern.to_string(), re);
        Ok(is_match)
    }

    /// Compares two resolved operands. Types never mix: integer against
    /// float is as much a type error as string against integer.
    fn apply_comparison(&self, op: BinOp, left: &Expr, right: &Expr) -> Result<bool, EvalError> {
        let result = match (left, right) {
            (Expr::Integer(a), Expr::Integer(b)) => compare_ordered(op, a, b),
            (Expr::Float(a), Expr::Float(b)) => compare_ordered(op, a, b),
            (Expr::String(text), Expr::String(pattern)) if op == BinOp::Reg => {
                return self.matches_pattern(text, pattern);
            }
            (Expr::String(a), Expr::String(b)) => compare_ordered(op, a.as_str(), b.as_str()),
            (Expr::Atom(a), Expr::Atom(b)) => match op {
                BinOp::Eq => Some(a == b),
                BinOp::Ne => Some(a != b),
                _ => None,
            },
            _ => None,
        };

        result.ok_or_else(|| type_mismatch(op, left, right))
    }
}

fn type_mismatch(op: BinOp, left: &Expr, right: &Expr) -> EvalError {
    EvalError::TypeMismatch {
        op,
        left: left.kind_name(),
        right: right.kind_name(),
    }
}

/// The six ordering/equality operators. `None` for anything else.
fn compare_ordered<T: PartialOrd + ?Sized>(op: BinOp, left: &T, right: &T) -> Option<bool> {
    match op {
        BinOp::Eq => Some(left == right),
        BinOp::Ne => Some(left != right),
        BinOp::Gt => Some(left > right),
        BinOp::Lt => Some(left < right),
        BinOp::Gte => Some(left >= right),
        BinOp::Lte => Some(left <= right),
        BinOp::Reg | BinOp::And | BinOp::Or => None,
    }
}

/// A compiled filter bound to its own environment.
///
/// # Examples
///
/// ```
/// use sift_lang::{Evaluator, compile};
///
/// let mut evaluator = Evaluator::new(compile("method eq :get").unwrap());
/// evaluator.env_mut().declare_atom(":get", 0).unwrap();
/// evaluator.env_mut().set_atom_variable("method", 0);
///
/// assert_eq!(evaluator.evaluate(), Ok(true));
/// ```
#[derive(Debug, Clone)]
pub struct Evaluator {
    expr: Expr,
    env: Environment,
}

impl Evaluator {
    /// Creates an evaluator for `expr` with empty tables.
    pub fn new(expr: Expr) -> Self {
        Evaluator {
            expr,
            env: Environment::new(),
        }
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn evaluate(&self) -> Result<bool, EvalError> {
        self.env.evaluate(&self.expr)
    }
}
