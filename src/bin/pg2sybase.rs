//! pg2sybase: PostgreSQL to Sybase SQL translator CLI
//!
//! # Usage
//!
//! ```bash
//! # Translate an argument
//! pg2sybase "SELECT * FROM users WHERE active = TRUE LIMIT 10"
//!
//! # File in, file out
//! pg2sybase -f input.sql -o output.sql
//!
//! # Pipe
//! cat queries.sql | pg2sybase > sybase_queries.sql
//! ```

use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser, ValueEnum};
use colored::*;
use pg2sybase::prelude::*;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pg2sybase")]
#[command(version)]
#[command(about = "Translate PostgreSQL SQL to Sybase SQL dialect", long_about = None)]
#[command(after_help = "EXAMPLES:
    pg2sybase \"SELECT * FROM users WHERE active = TRUE LIMIT 10\"
    pg2sybase -f input.sql -o output.sql
    echo \"SELECT NOW()\" | pg2sybase
    cat queries.sql | pg2sybase > sybase_queries.sql")]
struct Cli {
    /// PostgreSQL query to translate (if not reading from stdin or file)
    query: Option<String>,

    /// Read query from file
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Write output to file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file
    #[arg(long, env = "PG2SYBASE_CONFIG")]
    config: Option<PathBuf>,

    /// Keep the column list when emitting TOP n START AT m
    #[arg(long)]
    no_collapse: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Verbose logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    source: &'a str,
    translated: &'a str,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let Some(query) = read_input(cli)? else {
        Cli::command().print_help()?;
        anyhow::bail!("no query given");
    };

    let mut options = Config::load(cli.config.as_deref())?.translate_options();
    if cli.no_collapse {
        options.collapse_offset_projection = false;
    }

    let translated = translate_with(&query, options)?;

    let rendered = match cli.format {
        OutputFormat::Text => translated.trim_end().to_string(),
        OutputFormat::Json => serde_json::to_string_pretty(&JsonOutput {
            source: &query,
            translated: &translated,
        })?,
    };

    match &cli.output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", rendered))
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!(
                "{} Translated query written to {}",
                "✓".green(),
                path.display().to_string().cyan()
            );
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

/// File first, then the positional argument, then piped stdin.
fn read_input(cli: &Cli) -> anyhow::Result<Option<String>> {
    if let Some(path) = &cli.file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        return Ok(Some(content));
    }
    if let Some(query) = &cli.query {
        return Ok(Some(query.clone()));
    }

    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }
    let mut buf = String::new();
    stdin.read_to_string(&mut buf).context("failed to read stdin")?;
    Ok(Some(buf))
}
