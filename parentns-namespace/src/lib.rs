//! Step one level up the user namespace hierarchy and hand off execution
//!
//! The pipeline is a chain of stage types, each only constructible from the
//! previous one:
//! - [`locate`] - PID -> [`ChildNamespace`]
//! - [`ChildNamespace::resolve_parent`] -> [`ParentNamespace`]
//! - [`ParentNamespace::switch`] -> [`Ascended`]
//! - [`Ascended::handoff`] -> exec, or the error that prevented it
//!
//! Kernel access goes through [`NamespacePlatform`].

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod descriptor;
pub mod executor;
pub mod locator;
pub mod platform;
pub mod resolver;
pub mod switcher;

pub use descriptor::{NamespaceFd, NamespaceRole};
pub use executor::{ascend, ascend_and_exec};
pub use locator::{ChildNamespace, locate};
pub use platform::{MockCall, MockPlatform, NamespacePlatform, NativePlatform, native_platform};
pub use resolver::ParentNamespace;
pub use switcher::Ascended;

#[cfg(target_os = "linux")]
pub use platform::LinuxPlatform;
