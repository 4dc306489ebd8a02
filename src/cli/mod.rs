//! CLI support for sift-lang
//!
//! Provides programmatic access to the `sift` command so it can be driven
//! from tests or embedded in other tools.

mod check;

pub use check::{CheckOptions, CheckResult, execute_check};

use std::io;

use crate::{CompileError, DeclareAtomError, EvalError};

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// Query failed to compile
    Compile(CompileError),
    /// An `--atom` declaration was rejected
    Atom(DeclareAtomError),
    /// Evaluation failed on a record
    Eval { line: usize, source: EvalError },
    /// A record line is not valid JSON
    Json { line: usize, source: serde_json::Error },
    /// A record line is valid JSON but not an object
    NotAnObject { line: usize },
    /// IO error
    Io(io::Error),
    /// No input provided
    NoInput,
    /// Malformed `--atom` argument
    InvalidAtomArg(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Compile(e) => write!(f, "{}", e),
            CliError::Atom(e) => write!(f, "Atom error: {}", e),
            CliError::Eval { line, source } => {
                write!(f, "Evaluation error on line {}: {}", line, source)
            }
            CliError::Json { line, source } => write!(f, "Invalid JSON on line {}: {}", line, source),
            CliError::NotAnObject { line } => {
                write!(f, "Record on line {} is not a JSON object", line)
            }
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoInput => write!(
                f,
                "No input provided. Use --input or pipe JSON Lines to stdin."
            ),
            CliError::InvalidAtomArg(arg) => {
                write!(f, "Invalid atom '{}': expected NAME=CODE, e.g. :get=0", arg)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Compile(e) => Some(e),
            CliError::Atom(e) => Some(e),
            CliError::Eval { source, .. } => Some(source),
            CliError::Json { source, .. } => Some(source),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CompileError> for CliError {
    fn from(e: CompileError) -> Self {
        CliError::Compile(e)
    }
}

impl From<DeclareAtomError> for CliError {
    fn from(e: DeclareAtomError) -> Self {
        CliError::Atom(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

/// Parses an `--atom` argument of the form `NAME=CODE`.
///
/// The name is validated later, when it is declared.
pub fn parse_atom_arg(arg: &str) -> Result<(String, i64), CliError> {
    let (name, code) = arg
        .split_once('=')
        .ok_or_else(|| CliError::InvalidAtomArg(arg.to_string()))?;

    let code = code
        .trim()
        .parse::<i64>()
        .map_err(|_| CliError::InvalidAtomArg(arg.to_string()))?;

    Ok((name.trim().to_string(), code))
}
