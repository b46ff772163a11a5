//! `mw` CLI — parse and validate MW markup from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Parse MW from stdin, print its Rust debug form
//! echo 'name: Alice' | mw parse
//!
//! # Parse from file to file, projecting onto JSON
//! mw parse -i config.mw -o config.json --json
//!
//! # Validate a file is well-formed MW (for CI / pre-commit hooks)
//! mw check -i config.mw
//!
//! # Parse the embedded JSON subset and re-emit it pretty-printed
//! mw json -i data.json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mw_core::error::ParseError;
use std::io::{self, Read};
use std::process;

#[derive(Parser)]
#[command(name = "mw", version, about = "MW markup parser CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse MW markup and print the resulting value
    Parse {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Recursion limit for nested blocks and embedded JSON
        #[arg(long)]
        max_depth: Option<u32>,
        /// Print the value's JSON projection instead of its debug form
        #[arg(long)]
        json: bool,
    },
    /// Validate that input is well-formed MW, exiting non-zero on failure
    Check {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Parse input as the JSON subset and re-emit it pretty-printed
    Json {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            input,
            output,
            max_depth,
            json,
        } => {
            let text = read_input(input.as_deref())?;
            let value = build_parser(&text, max_depth)
                .parse()
                .map_err(pretty_parse_error)?;
            let rendered = if json {
                serde_json::to_string_pretty(&value.to_json())?
            } else {
                format!("{value:#?}")
            };
            write_output(output.as_deref(), &rendered)?;
        }
        Commands::Check { input } => {
            let text = read_input(input.as_deref())?;
            match mw_core::Parser::parse_str(&text) {
                Ok(_) => println!("ok"),
                Err(e) => {
                    eprintln!("{e}");
                    process::exit(1);
                }
            }
        }
        Commands::Json { input, output } => {
            let text = read_input(input.as_deref())?;
            let value =
                mw_core::Parser::parse_json_str(&text).map_err(pretty_parse_error)?;
            let rendered = serde_json::to_string_pretty(&value.to_json())?;
            write_output(output.as_deref(), &rendered)?;
        }
    }

    Ok(())
}

fn build_parser(text: &str, max_depth: Option<u32>) -> mw_core::Parser<mw_core::StrLineSource<'_>> {
    let parser = mw_core::Parser::new(mw_core::StrLineSource::new(text));
    match max_depth {
        Some(n) => parser.with_max_blocklevel(n).with_max_json_depth(n),
        None => parser,
    }
}

fn pretty_parse_error(e: ParseError) -> anyhow::Error {
    anyhow::anyhow!("{e}")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
