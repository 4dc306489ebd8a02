//! Run a filter over JSON Lines input
//!
//! Records are read and written one line at a time, so memory stays flat no
//! matter how large the input is.

use std::io::{BufRead, Write};

use serde_json::Value;

use super::CliError;
use crate::{Filter, record::bind_record};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The filter query
    pub query: String,
    /// Atoms to declare before evaluating, as (literal, code)
    pub atoms: Vec<(String, i64)>,
    /// Treat records that fail to evaluate as excluded instead of aborting
    pub skip_errors: bool,
    /// Only count matching records, don't write them
    pub count_only: bool,
    /// Only validate syntax, don't execute
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug, PartialEq, Eq)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Counts for a filtered stream
    Matches {
        /// Records the filter accepted
        matched: usize,
        /// Records evaluated
        total: usize,
        /// Records excluded because evaluation failed
        errors: usize,
    },
}

/// Execute a sift check operation.
///
/// Each record line of `input` the filter accepts is copied verbatim to
/// `out`, unless `count_only` is set.
pub fn execute_check<R, W>(
    options: &CheckOptions,
    input: Option<R>,
    out: &mut W,
) -> Result<CheckResult, CliError>
where
    R: BufRead,
    W: Write,
{
    let mut filter = Filter::compile(&options.query)?;

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }

    let input = input.ok_or(CliError::NoInput)?;

    for (literal, code) in &options.atoms {
        filter.declare_atom(literal, *code)?;
    }

    let mut matched = 0;
    let mut total = 0;
    let mut errors = 0;

    for (index, line) in input.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let record: Value = serde_json::from_str(&line).map_err(|source| CliError::Json {
            line: line_number,
            source,
        })?;
        let Value::Object(record) = record else {
            return Err(CliError::NotAnObject { line: line_number });
        };

        filter.clear_variables();
        bind_record(filter.env_mut(), &record);
        total += 1;

        match filter.eval() {
            Ok(true) => {
                matched += 1;
                if !options.count_only {
                    writeln!(out, "{}", line)?;
                }
            }
            Ok(false) => {}
            Err(e) if options.skip_errors => {
                tracing::warn!(line = line_number, error = %e, "excluding record");
                errors += 1;
            }
            Err(source) => {
                return Err(CliError::Eval {
                    line: line_number,
                    source,
                });
            }
        }
    }

    out.flush()?;

    tracing::info!(total, matched, errors, "filtered records");
    Ok(CheckResult::Matches {
        matched,
        total,
        errors,
    })
}
