//! Namespace locator: PID -> user namespace descriptor

use nix::errno::Errno;
use parentns_core::{Error, NamespaceId, ProcessId, Result, Stage};
use std::os::fd::AsFd;

use crate::descriptor::{NamespaceFd, NamespaceRole};
use crate::platform::NamespacePlatform;

/// A located user namespace, first stage of the pipeline
///
/// Owns the descriptor for the target process's user namespace. The only way
/// forward is [`ChildNamespace::resolve_parent`].
#[derive(Debug)]
pub struct ChildNamespace<'p, P: NamespacePlatform> {
    pub(crate) platform: &'p P,
    pub(crate) pid: ProcessId,
    pub(crate) fd: NamespaceFd,
    id: Option<NamespaceId>,
}

impl<P: NamespacePlatform> ChildNamespace<'_, P> {
    /// Process this namespace was located through
    #[must_use]
    pub const fn pid(&self) -> ProcessId {
        self.pid
    }

    /// Identity of the located namespace, if the kernel reported one
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

/// Open the user namespace of `pid`
///
/// # Errors
/// - [`Error::NotFound`] if the process or its handle does not exist
/// - [`Error::PermissionDenied`] if the caller may not inspect it
/// - [`Error::Unexpected`] for anything else
pub fn locate<P: NamespacePlatform>(platform: &P, pid: ProcessId) -> Result<ChildNamespace<'_, P>> {
    tracing::debug!(%pid, path = %pid.user_ns_path(), "Targeting user namespace file");

    let fd = platform
        .open_user_namespace(pid)
        .map_err(|errno| locate_error(pid, errno))?;
    let fd = NamespaceFd::new(fd, NamespaceRole::Child);
    let id = platform.namespace_id(fd.as_fd());

    if let Some(ns) = id {
        tracing::debug!(%pid, %ns, "Located user namespace");
    }

    Ok(ChildNamespace {
        platform,
        pid,
        fd,
        id,
    })
}

fn locate_error(pid: ProcessId, errno: Errno) -> Error {
    let err = match errno {
        Errno::ENOENT | Errno::ESRCH => Error::NotFound { pid },
        Errno::EACCES | Errno::EPERM => Error::PermissionDenied {
            stage: Stage::Locate,
            source: errno,
        },
        _ => Error::Unexpected {
            stage: Stage::Locate,
            source: errno,
        },
    };
    tracing::debug!(%pid, error = %errno, "Failed to open user namespace file");
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{MockCall, MockPlatform};

    #[test]
    fn test_locate_success() {
        let platform = MockPlatform::new();
        let child = locate(&platform, ProcessId::from_raw(4242)).unwrap();

        assert_eq!(child.pid().as_raw(), 4242);
        assert_eq!(child.id(), Some(MockPlatform::CHILD_NS));
        assert_eq!(child.descriptor().role(), NamespaceRole::Child);
        assert_eq!(platform.calls(), vec![MockCall::Open(ProcessId::from_raw(4242))]);
    }

    #[test]
    fn test_missing_process_is_not_found() {
        for errno in [Errno::ENOENT, Errno::ESRCH] {
            let platform = MockPlatform::new();
            platform.fail_open(errno);

            let err = locate(&platform, ProcessId::from_raw(4242)).unwrap_err();
            assert!(matches!(err, Error::NotFound { pid } if pid.as_raw() == 4242));
            assert!(err.to_string().contains("4242"));
            assert!(!platform.joined());
        }
    }

    #[test]
    fn test_access_denied() {
        let platform = MockPlatform::new();
        platform.fail_open(Errno::EACCES);

        let err = locate(&platform, ProcessId::from_raw(1)).unwrap_err();
        assert!(matches!(
            err,
            Error::PermissionDenied {
                stage: Stage::Locate,
                source: Errno::EACCES
            }
        ));
    }

    #[test]
    fn test_other_errors_are_unexpected() {
        let platform = MockPlatform::new();
        platform.fail_open(Errno::EMFILE);

        let err = locate(&platform, ProcessId::from_raw(1)).unwrap_err();
        assert!(matches!(
            err,
            Error::Unexpected {
                stage: Stage::Locate,
                source: Errno::EMFILE
            }
        ));
    }
}
