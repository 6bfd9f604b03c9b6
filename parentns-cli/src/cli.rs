//! CLI argument definitions

use clap::Parser;
use parentns_core::ProcessId;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "parentns")]
#[command(about = "Enter the parent user namespace of a process", long_about = None)]
#[command(version)]
#[command(
    after_help = "This must be run with sufficient privileges (e.g., as root) to perform \
                  the setns syscall into an arbitrary namespace."
)]
pub struct Cli {
    /// Process ID (PID) of a process in the child namespace
    pub pid: ProcessId,

    /// Enable verbose DEBUG logging
    #[arg(short, long)]
    pub verbose: bool,

    /// JSON file overriding the default command template
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Command to execute in the parent namespace [default: slirp4netns for PID]
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}
