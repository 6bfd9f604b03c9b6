//! Error types for parentns

use nix::errno::Errno;
use std::fmt;
use thiserror::Error;

use crate::ProcessId;

/// Pipeline stage an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Argument and configuration handling before any kernel call
    Setup,
    /// Opening the target's user namespace handle
    Locate,
    /// Walking to the parent namespace
    Resolve,
    /// Joining the parent namespace
    Switch,
    /// Replacing the process image
    Handoff,
}

impl Stage {
    /// Short lowercase name used in diagnostics
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Locate => "locate",
            Self::Resolve => "resolve",
            Self::Switch => "switch",
            Self::Handoff => "handoff",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// parentns error types
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Target process or its namespace handle is gone
    #[error("PID {pid} or its user namespace file does not exist. Is the process running?")]
    NotFound {
        /// Process that was looked up
        pid: ProcessId,
    },

    /// Caller lacks the rights for this stage
    #[error("Permission denied during {stage}: {source}")]
    PermissionDenied {
        /// Stage that was denied
        stage: Stage,
        /// Kernel error
        source: Errno,
    },

    /// Namespace is a root namespace from the caller's point of view
    #[error("User namespace of PID {pid} has no parent. Are you sure this is a child namespace?")]
    NoParent {
        /// Process whose namespace was inspected
        pid: ProcessId,
    },

    /// Kernel refused the namespace migration
    #[error("Kernel rejected the user namespace switch: {source}")]
    InvalidTransition {
        /// Kernel error
        source: Errno,
    },

    /// Handoff target could not be resolved
    #[error("Command not found: {program}")]
    CommandNotFound {
        /// Program that was looked up
        program: String,
    },

    /// Any other kernel error, carried verbatim
    #[error("Unexpected error during {stage}: {source}")]
    Unexpected {
        /// Stage the call belonged to
        stage: Stage,
        /// Kernel error
        source: Errno,
    },

    /// Namespace introspection is not available for this target
    #[error("Unsupported platform: {target}")]
    UnsupportedPlatform {
        /// Target description
        target: &'static str,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Error message
        message: String,
    },
}

impl Error {
    /// Stage this error belongs to
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::NotFound { .. } => Stage::Locate,
            Self::NoParent { .. } => Stage::Resolve,
            Self::InvalidTransition { .. } => Stage::Switch,
            Self::CommandNotFound { .. } => Stage::Handoff,
            Self::PermissionDenied { stage, .. } | Self::Unexpected { stage, .. } => *stage,
            Self::UnsupportedPlatform { .. } | Self::InvalidConfig { .. } => Stage::Setup,
        }
    }

    /// Underlying kernel error, if the failure came from a system call
    #[must_use]
    pub const fn errno(&self) -> Option<Errno> {
        match self {
            Self::PermissionDenied { source, .. }
            | Self::InvalidTransition { source }
            | Self::Unexpected { source, .. } => Some(*source),
            _ => None,
        }
    }
}

/// Result type alias for parentns operations
pub type Result<T> = std::result::Result<T, Error>;
