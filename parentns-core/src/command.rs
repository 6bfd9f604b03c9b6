//! Target command for the final handoff

use std::ffi::CString;
use std::fmt;

use crate::{Error, ProcessId, Result};

/// Placeholder replaced by the target PID in command templates
pub const PID_PLACEHOLDER: &str = "{pid}";

/// Program path plus arguments, validated once and immutable afterwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetCommand {
    argv: Vec<String>,
    c_argv: Vec<CString>,
}

impl TargetCommand {
    /// Create a new command from `argv` (program first)
    ///
    /// # Errors
    /// Returns error if `argv` is empty or any element contains a NUL byte
    pub fn new<I, S>(argv: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();

        if argv.is_empty() || argv[0].is_empty() {
            return Err(Error::InvalidConfig {
                message: "Command cannot be empty".to_string(),
            });
        }

        let c_argv = argv
            .iter()
            .map(|arg| {
                CString::new(arg.as_bytes()).map_err(|_| Error::InvalidConfig {
                    message: format!("Command argument contains a NUL byte: {arg:?}"),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { argv, c_argv })
    }

    /// Instantiate a template, substituting [`PID_PLACEHOLDER`] with `pid`
    ///
    /// # Errors
    /// Returns error if the resulting command is invalid
    pub fn from_template(template: &[String], pid: ProcessId) -> Result<Self> {
        let pid = pid.to_string();
        Self::new(
            template
                .iter()
                .map(|arg| arg.replace(PID_PLACEHOLDER, &pid)),
        )
    }

    /// Program to execute (`argv[0]`)
    #[must_use]
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    /// Arguments after the program
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    /// Full argument vector, program included
    #[must_use]
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Argument vector in the form `execvp(3)` takes
    #[must_use]
    pub fn c_argv(&self) -> &[CString] {
        &self.c_argv
    }
}

impl fmt::Display for TargetCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv.join(" "))
    }
}
