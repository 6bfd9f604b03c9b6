//! Core type definitions with strong typing and validation

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Process identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ProcessId(i32);

impl ProcessId {
    /// Create a new `ProcessId` with validation
    ///
    /// # Errors
    /// Returns error if the PID is zero or negative
    pub fn new(pid: i32) -> Result<Self> {
        if pid <= 0 {
            return Err(Error::InvalidConfig {
                message: format!("PID must be a positive integer, got {pid}"),
            });
        }
        Ok(Self(pid))
    }

    /// Create from raw PID without validation
    #[must_use]
    pub const fn from_raw(pid: i32) -> Self {
        Self(pid)
    }

    /// Get the current process ID
    #[must_use]
    pub fn current() -> Self {
        #[allow(clippy::cast_possible_wrap)]
        Self(std::process::id() as i32)
    }

    /// Get raw PID value
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        self.0
    }

    /// Path of this process's user namespace handle
    #[must_use]
    pub fn user_ns_path(self) -> String {
        format!("/proc/{}/ns/user", self.0)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProcessId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let raw = s.trim().parse::<i32>().map_err(|e| Error::InvalidConfig {
            message: format!("Invalid PID '{s}': {e}"),
        })?;
        Self::new(raw)
    }
}

impl TryFrom<i32> for ProcessId {
    type Error = Error;

    fn try_from(pid: i32) -> Result<Self> {
        Self::new(pid)
    }
}

/// Identity of a namespace instance: the inode behind its handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespaceId(u64);

impl NamespaceId {
    /// Create from a raw inode number
    #[must_use]
    pub const fn from_inode(inode: u64) -> Self {
        Self(inode)
    }

    /// Inode number
    #[must_use]
    pub const fn inode(self) -> u64 {
        self.0
    }

    /// Parse a handle link target such as `user:[4026531837]`
    ///
    /// # Errors
    /// Returns error if the text is not a `user` namespace link
    pub fn parse_link(link: &str) -> Result<Self> {
        link.strip_prefix("user:[")
            .and_then(|rest| rest.strip_suffix(']'))
            .and_then(|inode| inode.parse().ok())
            .map(Self)
            .ok_or_else(|| Error::InvalidConfig {
                message: format!("Not a user namespace link: {link}"),
            })
    }
}

impl fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user:[{}]", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_id_validation() {
        assert!(ProcessId::new(1).is_ok());
        assert!(ProcessId::new(4242).is_ok());
        assert!(ProcessId::new(0).is_err());
        assert!(ProcessId::new(-7).is_err());
    }

    #[test]
    fn test_process_id_from_str() {
        let pid: ProcessId = "4242".parse().unwrap();
        assert_eq!(pid.as_raw(), 4242);
        assert_eq!(pid.user_ns_path(), "/proc/4242/ns/user");

        assert!("".parse::<ProcessId>().is_err());
        assert!("abc".parse::<ProcessId>().is_err());
        assert!("0".parse::<ProcessId>().is_err());
    }

    #[test]
    fn test_process_id_try_from() {
        assert_eq!(ProcessId::try_from(123).unwrap().as_raw(), 123);
        assert!(ProcessId::try_from(0).is_err());
        assert!(ProcessId::try_from(-1).is_err());
    }

    #[test]
    fn test_namespace_id_parse() {
        let id = NamespaceId::parse_link("user:[4026531837]").unwrap();
        assert_eq!(id.inode(), 4_026_531_837);
        assert_eq!(id.to_string(), "user:[4026531837]");

        assert!(NamespaceId::parse_link("net:[4026531840]").is_err());
        assert!(NamespaceId::parse_link("user:[abc]").is_err());
        assert!(NamespaceId::parse_link("user:4026531837").is_err());
    }
}
