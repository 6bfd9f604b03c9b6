//! parentns Core - Foundation types and errors
//!
//! This crate provides the core abstractions used throughout parentns.

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod command;
pub mod config;
pub mod error;
pub mod types;

pub use command::TargetCommand;
pub use config::HandoffConfig;
pub use error::{Error, Result, Stage};
pub use types::{NamespaceId, ProcessId};
