//! Owned user namespace descriptors

use std::fmt;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd, RawFd};

/// Which side of the child -> parent edge a descriptor refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceRole {
    /// The target process's own user namespace
    Child,
    /// Its immediate parent
    Parent,
}

impl fmt::Display for NamespaceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Child => f.write_str("child"),
            Self::Parent => f.write_str("parent"),
        }
    }
}

/// Exclusively owned namespace descriptor, closed on drop
#[derive(Debug)]
pub struct NamespaceFd {
    fd: OwnedFd,
    role: NamespaceRole,
}

impl NamespaceFd {
    pub(crate) fn new(fd: OwnedFd, role: NamespaceRole) -> Self {
        tracing::debug!(fd = fd.as_raw_fd(), %role, "Opened namespace descriptor");
        Self { fd, role }
    }

    /// Role of this descriptor
    #[must_use]
    pub const fn role(&self) -> NamespaceRole {
        self.role
    }
}

impl AsFd for NamespaceFd {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl AsRawFd for NamespaceFd {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }
}

impl Drop for NamespaceFd {
    fn drop(&mut self) {
        // OwnedFd closes right after this body runs
        tracing::debug!(fd = self.fd.as_raw_fd(), role = %self.role, "Closing namespace descriptor");
    }
}
