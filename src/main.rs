use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use tblparser::{tokens, Cursor, ReadCursor};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to the file to tokenize.
    path: PathBuf,

    /// Print every token with its offset instead of the first token of two streams.
    #[clap(long)]
    all: bool,

    /// Disable log output
    #[clap(short, long)]
    quiet: bool,

    /// A level of verbosity, and can be used multiple times
    ///
    /// Level 0 - Warnings (Default)
    ///
    /// Level 1 - Info
    ///
    /// Level 2 - Debug
    ///
    /// Level 3 - Trace
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if !args.quiet {
        let log_level = match args.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
            .init();
    }

    let mut cursor = ReadCursor::open(&args.path)
        .with_context(|| format!("Failed to open {}", args.path.display()))?;

    if args.all {
        command_all(&mut cursor)
    } else {
        command_first(&mut cursor)
    }
}

/// Pulls the first token out of two streams created one after the other over the same
/// source. The second stream starts where the first one left off.
fn command_first(cursor: &mut impl Cursor) -> anyhow::Result<()> {
    for label in ["1st", "2nd"] {
        if let Some(token) = tokens(&mut *cursor).next().transpose()? {
            println!("{} \"{}\"", label.green(), token);
        }
    }
    Ok(())
}

fn command_all(cursor: &mut impl Cursor) -> anyhow::Result<()> {
    let mut stream = tokens(cursor);
    while let Some(token) = stream.next_token()? {
        let marker = if token.line_start { ">" } else { " " };
        println!(
            "{} {}\t\"{}\"",
            marker.blue(),
            token.offset.to_string().yellow(),
            token.text
        );
    }
    log::info!("Stopped at offset {}", stream.position());
    Ok(())
}
