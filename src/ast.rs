//! # Sift Filter Language - Abstract Syntax Tree
//!
//! This module defines the vocabulary shared by the lexer, the parser and the
//! evaluator.
//!
//! - **[tokens]** - Lexical tokens and the keyword table
//! - **[expressions]** - Expression nodes (literals, binary operations, lazy references)
//! - **[operators]** - Comparison and logical operators
//!
//! ## Quick Start
//!
//! ```text
//! size gt 0 and method eq :get
//! ```
//!
//! This filter keeps records whose `size` variable is positive and whose
//! `method` variable holds the code registered for the `:get` atom.
//!
//! ## Precedence
//!
//! From loosest to tightest: `or`, `and`, then a single comparison or a
//! parenthesized expression. Comparisons do not chain.
//!
//! ```text
//! true and false or true        // (true and false) or true
//! a eq 1 and (b eq 2 or c eq 3)
//! ```
//!
//! ## Lazy References
//!
//! Bare identifiers (`size`) and atoms (`:get`) are not resolved while
//! parsing. They stay as [`Expr::LazySymbol`] and [`Expr::LazyAtom`] nodes
//! and are looked up on every evaluation, so one compiled tree can be run
//! against many sets of bindings.
pub mod tokens;
pub mod expressions;
pub mod operators;

pub use tokens::{KEYWORDS, Token, TokenKind};
pub use expressions::Expr;
pub use operators::BinOp;
