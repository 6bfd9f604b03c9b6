//! Namespace switcher: join the parent user namespace

use nix::errno::Errno;
use parentns_core::{Error, NamespaceId, ProcessId, Result, Stage};
use std::os::fd::{AsFd, AsRawFd};

use crate::platform::NamespacePlatform;
use crate::resolver::ParentNamespace;

/// Proof that the calling thread has moved into the parent user namespace
///
/// Marks the one-way transition of the process's ambient namespace
/// membership. Only [`ParentNamespace::switch`] creates it and
/// [`Ascended::handoff`] is the only way to hand off execution, so the exec
/// can never be issued from the original namespace.
#[derive(Debug)]
#[must_use = "the process already runs in the parent namespace; hand off or exit"]
pub struct Ascended<'p, P: NamespacePlatform> {
    pub(crate) platform: &'p P,
    pid: ProcessId,
    previous: Option<NamespaceId>,
    current: Option<NamespaceId>,
    pub(crate) handed_off: bool,
}

impl<P: NamespacePlatform> Ascended<'_, P> {
    /// Process whose parent namespace was joined
    #[must_use]
    pub const fn pid(&self) -> ProcessId {
        self.pid
    }

    /// Namespace the caller was in before the switch
    #[must_use]
    pub const fn previous(&self) -> Option<NamespaceId> {
        self.previous
    }

    /// Namespace the caller is in now
    #[must_use]
    pub const fn current(&self) -> Option<NamespaceId> {
        self.current
    }
}

impl<P: NamespacePlatform> Drop for Ascended<'_, P> {
    fn drop(&mut self) {
        if !self.handed_off {
            tracing::warn!(
                pid = %self.pid,
                "Namespace switch was not followed by a handoff; process keeps parent namespace membership"
            );
        }
    }
}

impl<'p, P: NamespacePlatform> ParentNamespace<'p, P> {
    /// Move the calling thread into this namespace
    ///
    /// All or nothing: on error the caller's membership is unchanged. The
    /// parent descriptor is closed before this returns on both paths. There
    /// is no way back once this succeeds.
    ///
    /// # Errors
    /// - [`Error::PermissionDenied`] if the caller lacks `CAP_SYS_ADMIN` in
    ///   the target namespace
    /// - [`Error::InvalidTransition`] if the kernel refuses the move (wrong
    ///   namespace type, disallowed direction, multi-threaded caller)
    /// - [`Error::Unexpected`] for anything else
    pub fn switch(self) -> Result<Ascended<'p, P>> {
        let Self {
            platform, pid, fd, id,
        } = self;

        let previous = platform.ambient_namespace();
        tracing::info!(fd = fd.as_raw_fd(), "Attempting to switch to parent user namespace");

        let joined = platform.join_user_namespace(fd.as_fd());
        drop(fd);

        if let Err(errno) = joined {
            tracing::debug!(%pid, error = %errno, "setns failed");
            return Err(switch_error(errno));
        }

        let current = platform.ambient_namespace();
        if let (Some(expected), Some(actual)) = (id, current)
            && expected != actual
        {
            tracing::warn!(%expected, %actual, "Ambient namespace differs from resolved parent after setns");
        }

        tracing::info!("Successfully switched to parent user namespace");
        tracing::debug!(
            from = ?previous.map(|ns| ns.to_string()),
            to = ?current.map(|ns| ns.to_string()),
            "Namespace membership changed"
        );

        Ok(Ascended {
            platform,
            pid,
            previous,
            current,
            handed_off: false,
        })
    }
}

const fn switch_error(errno: Errno) -> Error {
    match errno {
        Errno::EPERM => Error::PermissionDenied {
            stage: Stage::Switch,
            source: errno,
        },
        Errno::EINVAL => Error::InvalidTransition { source: errno },
        _ => Error::Unexpected {
            stage: Stage::Switch,
            source: errno,
        },
    }
}
