use clap::{ArgAction, Parser as ClapParser, Subcommand};
use sift_lang::cli::{self, CheckOptions, CheckResult, CliError};
use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::PathBuf,
};
use tracing::level_filters::LevelFilter;

#[derive(ClapParser)]
#[command(name = "sift")]
#[command(about = "Sift - filter JSON Lines records with a small boolean query language")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a query and run it over JSON Lines records
    Check {
        /// The filter query, e.g. "size gt 0 and method eq :get"
        query: String,

        /// JSON Lines file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Declare an atom, e.g. --atom :get=0 (repeatable)
        #[arg(short, long = "atom", value_name = "NAME=CODE")]
        atoms: Vec<String>,

        /// Exclude records that fail to evaluate instead of aborting
        #[arg(long)]
        skip_errors: bool,

        /// Print only the number of matching records
        #[arg(short, long)]
        count: bool,

        /// Only validate syntax, don't execute
        #[arg(long)]
        syntax_only: bool,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Check {
            query,
            input,
            atoms,
            skip_errors,
            count,
            syntax_only,
        } => run_check(query, input, atoms, skip_errors, count, syntax_only),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_check(
    query: String,
    input: Option<PathBuf>,
    atoms: Vec<String>,
    skip_errors: bool,
    count: bool,
    syntax_only: bool,
) -> Result<(), CliError> {
    let input: Option<Box<dyn BufRead>> = match input {
        Some(path) => Some(Box::new(BufReader::new(File::open(path)?))),
        None if !syntax_only && !atty::is(atty::Stream::Stdin) => {
            Some(Box::new(io::stdin().lock()))
        }
        None => None,
    };

    let atoms = atoms
        .iter()
        .map(|arg| cli::parse_atom_arg(arg))
        .collect::<Result<Vec<_>, _>>()?;

    let options = CheckOptions {
        query,
        atoms,
        skip_errors,
        count_only: count,
        syntax_only,
    };

    let mut out = io::BufWriter::new(io::stdout().lock());
    match cli::execute_check(&options, input, &mut out)? {
        CheckResult::SyntaxValid => writeln!(out, "Syntax is valid")?,
        CheckResult::Matches { matched, .. } if count => writeln!(out, "{}", matched)?,
        CheckResult::Matches { .. } => {}
    }
    out.flush()?;
    Ok(())
}
