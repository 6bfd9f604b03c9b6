//! Handoff configuration

use serde::{Deserialize, Serialize};

use crate::{Error, ProcessId, Result, TargetCommand};

/// Built-in default: configure slirp4netns networking for the target PID
pub const DEFAULT_COMMAND_TEMPLATE: &[&str] = &[
    "/usr/bin/slirp4netns",
    "--configure",
    "--enable-sandbox",
    "--userns=/proc/self/ns/user",
    "--disable-host-loopback",
    "{pid}",
    "tap0",
];

/// Handoff configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandoffConfig {
    /// Command run when the caller gives none; `{pid}` is substituted
    pub default_command: Vec<String>,
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            default_command: DEFAULT_COMMAND_TEMPLATE
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl HandoffConfig {
    /// Create a new configuration with the built-in default command
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the default command template
    #[must_use]
    pub fn with_default_command<I, S>(mut self, template: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_command = template.into_iter().map(Into::into).collect();
        self
    }

    /// Check the configuration is usable
    ///
    /// # Errors
    /// Returns error if the default command template is empty
    pub fn validate(&self) -> Result<()> {
        if self.default_command.first().is_none_or(String::is_empty) {
            return Err(Error::InvalidConfig {
                message: "default_command cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Pick the command to hand off to
    ///
    /// An explicit command always wins; otherwise the default template is
    /// instantiated for `pid`.
    ///
    /// # Errors
    /// Returns error if the chosen command is invalid
    pub fn resolve_command(&self, pid: ProcessId, explicit: &[String]) -> Result<TargetCommand> {
        if explicit.is_empty() {
            self.validate()?;
            TargetCommand::from_template(&self.default_command, pid)
        } else {
            TargetCommand::new(explicit.iter().cloned())
        }
    }
}
