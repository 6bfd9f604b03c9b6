//! parentns CLI
//!
//! Enters the parent user namespace of a process and replaces itself with a
//! command running there, by default slirp4netns configuring the process's
//! network.

use clap::Parser;
use std::io::IsTerminal;
use std::process;
use tracing::Level;

mod cli;
mod run;

use cli::Cli;

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    // stdout belongs to the command we hand off to
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    tracing::debug!("Verbose logging enabled");

    // Only comes back on failure
    let e = match run::execute(cli) {
        Ok(never) => match never {},
        Err(e) => e,
    };

    match e.downcast_ref::<parentns_core::Error>() {
        Some(err) => eprintln!("❌ Error: {} failed: {err}", err.stage()),
        None => eprintln!("❌ Error: {e:#}"),
    }
    process::exit(1);
}
