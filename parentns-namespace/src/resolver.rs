//! Parent resolver: one hop up the user namespace hierarchy

use nix::errno::Errno;
use parentns_core::{Error, NamespaceId, ProcessId, Result, Stage};
use std::os::fd::AsFd;

use crate::descriptor::{NamespaceFd, NamespaceRole};
use crate::locator::ChildNamespace;
use crate::platform::NamespacePlatform;

/// The resolved parent namespace, second stage of the pipeline
///
/// The only way forward is [`ParentNamespace::switch`].
#[derive(Debug)]
pub struct ParentNamespace<'p, P: NamespacePlatform> {
    pub(crate) platform: &'p P,
    pub(crate) pid: ProcessId,
    pub(crate) fd: NamespaceFd,
    pub(crate) id: Option<NamespaceId>,
}

impl<P: NamespacePlatform> ParentNamespace<'_, P> {
    /// Process whose namespace's parent this is
    #[must_use]
    pub const fn pid(&self) -> ProcessId {
        self.pid
    }

    /// Identity of the parent namespace, if the kernel reported one
    #[must_use]
    pub const fn id(&self) -> Option<NamespaceId> {
        self.id
    }

    /// Owned descriptor
    #[must_use]
    pub const fn descriptor(&self) -> &NamespaceFd {
        &self.fd
    }
}

impl<'p, P: NamespacePlatform> ChildNamespace<'p, P> {
    /// Get the immediate parent of this namespace
    ///
    /// Consumes the child; its descriptor is closed before this returns,
    /// whether or not the parent could be resolved.
    ///
    /// # Errors
    /// - [`Error::NoParent`] if the namespace is a root namespace as seen
    ///   from the caller
    /// - [`Error::Unexpected`] for anything else
    pub fn resolve_parent(self) -> Result<ParentNamespace<'p, P>> {
        let Self {
            platform, pid, fd, ..
        } = self;

        let parent = platform.parent_namespace(fd.as_fd());
        drop(fd);

        let parent = parent.map_err(|errno| resolve_error(pid, errno))?;
        let fd = NamespaceFd::new(parent, NamespaceRole::Parent);
        let id = platform.namespace_id(fd.as_fd());

        tracing::debug!(
            %pid,
            ns = ?id.map(|ns| ns.to_string()),
            "Got parent namespace via NS_GET_PARENT"
        );

        Ok(ParentNamespace {
            platform,
            pid,
            fd,
            id,
        })
    }
}

fn resolve_error(pid: ProcessId, errno: Errno) -> Error {
    tracing::debug!(%pid, error = %errno, "ioctl(NS_GET_PARENT) failed");
    match errno {
        Errno::EPERM => Error::NoParent { pid },
        _ => Error::Unexpected {
            stage: Stage::Resolve,
            source: errno,
        },
    }
}
