//! pegcomb CLI - run the bundled example grammars over lines of input
//!
//! Usage: pegcomb [OPTIONS] [INPUT]
//!
//! Each input line is matched on its own. Exit status is 0 when every line
//! matched, 1 otherwise.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pegcomb::grammars::{Example, ExampleGrammar};
use pegcomb::{render_captures, CaptureList, MatchOptions};
use serde::Serialize;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum GrammarChoice {
    /// Broker endpoint URLs
    Url,
    /// Bracketed config stanzas
    Config,
}

impl From<GrammarChoice> for Example {
    fn from(choice: GrammarChoice) -> Self {
        match choice {
            GrammarChoice::Url => Example::EndpointUrl,
            GrammarChoice::Config => Example::ConfigFile,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "pegcomb", version, about = "Match lines of input against an example PEG grammar")]
struct Args {
    /// Grammar to match with
    #[arg(short, long, value_enum, default_value_t = GrammarChoice::Url)]
    grammar: GrammarChoice,

    /// Print the grammar's rules before matching
    #[arg(long)]
    print_grammar: bool,

    /// Output format for match results
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Maximum matcher nesting depth
    #[arg(long, default_value_t = pegcomb::parse_context::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Input file, one candidate per line (stdin when omitted)
    input: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct LineReport<'a> {
    line: usize,
    input: &'a str,
    success: bool,
    position: usize,
    captures: &'a CaptureList,
}

fn init_logging(verbose: u8) -> Result<()> {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default))
        .context("invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {}", e))
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}

/// Match every line, printing one report per line; returns whether all matched
fn run_lines(
    example: &ExampleGrammar,
    text: &str,
    options: &MatchOptions,
    format: OutputFormat,
) -> Result<bool> {
    let mut all_matched = true;

    for (index, line) in text.lines().enumerate() {
        let outcome = example
            .grammar
            .run_with(example.root, line, options)
            .with_context(|| format!("line {}: match aborted", index + 1))?;
        debug!(line = index + 1, success = outcome.success, "matched line");
        all_matched &= outcome.success;

        match format {
            OutputFormat::Text => {
                println!("{}", outcome.success);
                print!("{}", render_captures(&outcome.captures, line));
            }
            OutputFormat::Json => {
                let report = LineReport {
                    line: index + 1,
                    input: line,
                    success: outcome.success,
                    position: outcome.position,
                    captures: &outcome.captures,
                };
                println!("{}", serde_json::to_string(&report)?);
            }
        }
    }

    Ok(all_matched)
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let example = Example::from(args.grammar);
    let built = example
        .get()
        .with_context(|| format!("failed to build the {} grammar", example))?;
    info!(grammar = %example, "grammar ready");

    if args.print_grammar {
        print!("{}", built.render());
    }

    let text = read_input(args.input.as_ref())?;
    let options = MatchOptions::default().with_max_depth(args.max_depth);

    if run_lines(built, &text, &options, args.format)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
