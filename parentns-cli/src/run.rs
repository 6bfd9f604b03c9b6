//! Handoff execution logic

use anyhow::{Context, Result};
use parentns_core::HandoffConfig;
use parentns_namespace::{ascend_and_exec, native_platform};
use std::convert::Infallible;
use std::path::Path;
use tracing::debug;

use crate::cli::Cli;

/// Resolve the command, then ascend and exec
///
/// Only returns on failure.
pub fn execute(cli: Cli) -> Result<Infallible> {
    let config = load_config(cli.config.as_deref())?;

    // Decided before touching any namespace so setup errors leave nothing changed
    let command = config.resolve_command(cli.pid, &cli.command)?;
    if cli.command.is_empty() {
        debug!(%command, "No command given, using default");
    }

    let platform = native_platform()?;

    Err(ascend_and_exec(&platform, cli.pid, &command).into())
}

/// Load the handoff configuration, falling back to the built-in default
fn load_config(path: Option<&Path>) -> Result<HandoffConfig> {
    let Some(path) = path else {
        return Ok(HandoffConfig::default());
    };

    debug!(path = %path.display(), "Loading configuration");

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}
