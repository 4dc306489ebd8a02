pub mod ast;
pub mod evaluator;
pub mod filter;
pub mod lexer;
pub mod parser;
pub mod record;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{BinOp, Expr, Token, TokenKind};
pub use evaluator::{DeclareAtomError, Environment, EvalError, Evaluator};
pub use filter::{CompileError, Filter, compile};
pub use lexer::{LexError, Lexer, scan};
pub use parser::{ParseError, Parser};
pub use value::Variable;
