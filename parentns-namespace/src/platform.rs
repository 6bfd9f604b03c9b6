//! Kernel-facing namespace operations behind a pluggable trait
//!
//! This allows for different implementations:
//! - [`LinuxPlatform`] - procfs, `NS_GET_PARENT`, `setns(2)` and `execvp(3)`
//! - [`MockPlatform`] - Testing without touching the caller's namespaces
//!
//! Targets without the Linux namespace API get an uninhabited
//! [`NativePlatform`], so [`native_platform`] fails up front instead of
//! issuing a request with the wrong numeric constant.

use nix::errno::Errno;
use parentns_core::{NamespaceId, ProcessId, Result, TargetCommand};
use std::collections::HashMap;
use std::fs::File;
use std::os::fd::{AsRawFd, BorrowedFd, OwnedFd, RawFd};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Raw namespace operations the pipeline is built from
///
/// Errors are returned as bare [`Errno`] values; mapping them onto the
/// pipeline's error taxonomy is the job of each stage.
pub trait NamespacePlatform {
    /// Open the user namespace handle of `pid`, read-only and close-on-exec
    ///
    /// # Errors
    /// Returns the kernel error from the open
    fn open_user_namespace(&self, pid: ProcessId) -> nix::Result<OwnedFd>;

    /// Get a new descriptor for the parent of the namespace behind `ns`
    ///
    /// # Errors
    /// Returns the kernel error from the introspection request
    fn parent_namespace(&self, ns: BorrowedFd<'_>) -> nix::Result<OwnedFd>;

    /// Move the calling thread into the user namespace behind `ns`
    ///
    /// # Errors
    /// Returns the kernel error from the migration
    fn join_user_namespace(&self, ns: BorrowedFd<'_>) -> nix::Result<()>;

    /// Replace the process image with `command`
    ///
    /// Only returns on failure.
    fn exec(&self, command: &TargetCommand) -> Errno;

    /// Identity of the namespace behind `ns`, for diagnostics
    fn namespace_id(&self, ns: BorrowedFd<'_>) -> Option<NamespaceId>;

    /// Identity of the calling thread's current user namespace
    fn ambient_namespace(&self) -> Option<NamespaceId>;
}

#[cfg(target_os = "linux")]
mod linux {
    use super::{NamespaceId, NamespacePlatform, ProcessId, TargetCommand, errno_of};
    use nix::errno::Errno;
    use nix::sched::{CloneFlags, setns};
    use nix::sys::signal::{SigHandler, Signal, signal};
    use nix::unistd::execvp;
    use std::fs::OpenOptions;
    use std::os::fd::{AsRawFd, BorrowedFd, FromRawFd, OwnedFd};
    use std::os::unix::fs::OpenOptionsExt;
    use std::path::Path;

    /// `NSIO` ioctl type from `<linux/nsfs.h>`
    const NSIO: u8 = 0xb7;
    /// `NS_GET_PARENT` request number
    const NS_GET_PARENT_NR: u8 = 0x2;

    // Request encoding is computed per architecture by nix.
    nix::ioctl_none!(ns_get_parent, NSIO, NS_GET_PARENT_NR);

    /// Production platform for Linux
    #[derive(Debug, Clone, Copy, Default)]
    pub struct LinuxPlatform;

    impl LinuxPlatform {
        /// Create a new Linux platform
        #[must_use]
        pub const fn new() -> Self {
            Self
        }

        fn read_ns_link(path: impl AsRef<Path>) -> Option<NamespaceId> {
            let link = std::fs::read_link(path).ok()?;
            NamespaceId::parse_link(&link.to_string_lossy()).ok()
        }
    }

    impl NamespacePlatform for LinuxPlatform {
        fn open_user_namespace(&self, pid: ProcessId) -> nix::Result<OwnedFd> {
            let file = OpenOptions::new()
                .read(true)
                .custom_flags(libc::O_CLOEXEC)
                .open(pid.user_ns_path())
                .map_err(|e| errno_of(&e))?;
            Ok(OwnedFd::from(file))
        }

        fn parent_namespace(&self, ns: BorrowedFd<'_>) -> nix::Result<OwnedFd> {
            // The kernel opens the returned descriptor with O_CLOEXEC.
            // SAFETY: `ns` is a live borrowed descriptor for the whole call, and
            // NS_GET_PARENT takes no argument pointer.
            let raw = unsafe { ns_get_parent(ns.as_raw_fd()) }?;
            // SAFETY: a successful NS_GET_PARENT returns a fresh descriptor we own.
            Ok(unsafe { OwnedFd::from_raw_fd(raw) })
        }

        fn join_user_namespace(&self, ns: BorrowedFd<'_>) -> nix::Result<()> {
            setns(ns, CloneFlags::CLONE_NEWUSER)
        }

        fn exec(&self, command: &TargetCommand) -> Errno {
            let argv = command.c_argv();

            // Rust ignores SIGPIPE at startup; the new image expects the default.
            // SAFETY: SigDfl installs no Rust handler, and nothing else runs concurrently.
            if let Err(e) = unsafe { signal(Signal::SIGPIPE, SigHandler::SigDfl) } {
                tracing::debug!(error = %e, "Could not restore SIGPIPE disposition");
            }

            match execvp(argv[0].as_c_str(), argv) {
                Ok(never) => match never {},
                Err(e) => e,
            }
        }

        fn namespace_id(&self, ns: BorrowedFd<'_>) -> Option<NamespaceId> {
            Self::read_ns_link(format!("/proc/self/fd/{}", ns.as_raw_fd()))
        }

        fn ambient_namespace(&self) -> Option<NamespaceId> {
            Self::read_ns_link("/proc/thread-self/ns/user")
        }
    }
}

#[cfg(target_os = "linux")]
pub use linux::LinuxPlatform;

/// Platform implementation for the compilation target
#[cfg(target_os = "linux")]
pub type NativePlatform = LinuxPlatform;

/// Platform implementation for the compilation target
///
/// Uninhabited: this target has no user namespace API.
#[cfg(not(target_os = "linux"))]
#[derive(Debug, Clone, Copy)]
pub enum NativePlatform {}

#[cfg(not(target_os = "linux"))]
impl NamespacePlatform for NativePlatform {
    fn open_user_namespace(&self, _pid: ProcessId) -> nix::Result<OwnedFd> {
        match *self {}
    }

    fn parent_namespace(&self, _ns: BorrowedFd<'_>) -> nix::Result<OwnedFd> {
        match *self {}
    }

    fn join_user_namespace(&self, _ns: BorrowedFd<'_>) -> nix::Result<()> {
        match *self {}
    }

    fn exec(&self, _command: &TargetCommand) -> Errno {
        match *self {}
    }

    fn namespace_id(&self, _ns: BorrowedFd<'_>) -> Option<NamespaceId> {
        match *self {}
    }

    fn ambient_namespace(&self) -> Option<NamespaceId> {
        match *self {}
    }
}

/// Get the platform for the compilation target
///
/// # Errors
/// Returns [`parentns_core::Error::UnsupportedPlatform`] on targets without
/// user namespaces
#[cfg(target_os = "linux")]
pub const fn native_platform() -> Result<NativePlatform> {
    Ok(LinuxPlatform::new())
}

/// Get the platform for the compilation target
///
/// # Errors
/// Returns [`parentns_core::Error::UnsupportedPlatform`] on targets without
/// user namespaces
#[cfg(not(target_os = "linux"))]
pub const fn native_platform() -> Result<NativePlatform> {
    Err(parentns_core::Error::UnsupportedPlatform {
        target: std::env::consts::OS,
    })
}

fn errno_of(err: &std::io::Error) -> Errno {
    Errno::from_raw(err.raw_os_error().unwrap_or(libc::EIO))
}

/// Kernel-facing call recorded by [`MockPlatform`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    /// `open_user_namespace`
    Open(ProcessId),
    /// `parent_namespace`
    GetParent,
    /// `join_user_namespace`
    Join,
    /// `exec` with the full argv
    Exec(Vec<String>),
}

/// Mock platform for testing (never changes namespaces or execs)
///
/// Descriptors handed out are real (`/dev/null`), so ownership and close
/// behaviour match production.
///
/// # Example
/// ```
/// use parentns_core::{Error, ProcessId};
/// use parentns_namespace::{MockPlatform, locate};
///
/// let platform = MockPlatform::new();
/// platform.fail_parent(nix::errno::Errno::EPERM);
///
/// let child = locate(&platform, ProcessId::from_raw(4242)).unwrap();
/// let err = child.resolve_parent().unwrap_err();
///
/// assert!(matches!(err, Error::NoParent { .. }));
/// assert!(!platform.joined());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockPlatform {
    state: Arc<Mutex<MockState>>,
}

#[derive(Debug)]
struct MockState {
    calls: Vec<MockCall>,
    open_error: Option<Errno>,
    parent_error: Option<Errno>,
    join_error: Option<Errno>,
    exec_error: Errno,
    ids: HashMap<RawFd, NamespaceId>,
    ambient: NamespaceId,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            open_error: None,
            parent_error: None,
            join_error: None,
            exec_error: Errno::ENOENT,
            ids: HashMap::new(),
            ambient: MockPlatform::CHILD_NS,
        }
    }
}

impl MockPlatform {
    /// Namespace the mock pretends the caller and target start in
    pub const CHILD_NS: NamespaceId = NamespaceId::from_inode(4_026_532_001);
    /// Namespace the mock reports as the parent
    pub const PARENT_NS: NamespaceId = NamespaceId::from_inode(4_026_531_837);

    /// Create a new mock platform where every call succeeds
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dev_null() -> nix::Result<OwnedFd> {
        File::open("/dev/null")
            .map(OwnedFd::from)
            .map_err(|e| errno_of(&e))
    }

    /// Make `open_user_namespace` fail with `errno`
    pub fn fail_open(&self, errno: Errno) {
        self.state().open_error = Some(errno);
    }

    /// Make `parent_namespace` fail with `errno`
    pub fn fail_parent(&self, errno: Errno) {
        self.state().parent_error = Some(errno);
    }

    /// Make `join_user_namespace` fail with `errno`
    pub fn fail_join(&self, errno: Errno) {
        self.state().join_error = Some(errno);
    }

    /// Errno `exec` returns (defaults to `ENOENT`)
    pub fn fail_exec(&self, errno: Errno) {
        self.state().exec_error = errno;
    }

    /// All calls made so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.state().calls.clone()
    }

    /// Whether a join succeeded
    #[must_use]
    pub fn joined(&self) -> bool {
        self.state().ambient == Self::PARENT_NS
    }

    /// Last command passed to `exec`
    #[must_use]
    pub fn exec_argv(&self) -> Option<Vec<String>> {
        self.state().calls.iter().rev().find_map(|call| match call {
            MockCall::Exec(argv) => Some(argv.clone()),
            _ => None,
        })
    }
}

impl NamespacePlatform for MockPlatform {
    fn open_user_namespace(&self, pid: ProcessId) -> nix::Result<OwnedFd> {
        let mut state = self.state();
        state.calls.push(MockCall::Open(pid));
        if let Some(errno) = state.open_error {
            return Err(errno);
        }
        let fd = Self::dev_null()?;
        state.ids.insert(fd.as_raw_fd(), Self::CHILD_NS);
        Ok(fd)
    }

    fn parent_namespace(&self, ns: BorrowedFd<'_>) -> nix::Result<OwnedFd> {
        let mut state = self.state();
        state.calls.push(MockCall::GetParent);
        if let Some(errno) = state.parent_error {
            return Err(errno);
        }
        if !state.ids.contains_key(&ns.as_raw_fd()) {
            return Err(Errno::EBADF);
        }
        let fd = Self::dev_null()?;
        state.ids.insert(fd.as_raw_fd(), Self::PARENT_NS);
        Ok(fd)
    }

    fn join_user_namespace(&self, ns: BorrowedFd<'_>) -> nix::Result<()> {
        let mut state = self.state();
        state.calls.push(MockCall::Join);
        if let Some(errno) = state.join_error {
            return Err(errno);
        }
        let target = *state.ids.get(&ns.as_raw_fd()).ok_or(Errno::EBADF)?;
        state.ambient = target;
        Ok(())
    }

    fn exec(&self, command: &TargetCommand) -> Errno {
        let mut state = self.state();
        state.calls.push(MockCall::Exec(command.argv().to_vec()));
        state.exec_error
    }

    fn namespace_id(&self, ns: BorrowedFd<'_>) -> Option<NamespaceId> {
        self.state().ids.get(&ns.as_raw_fd()).copied()
    }

    fn ambient_namespace(&self) -> Option<NamespaceId> {
        Some(self.state().ambient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::fd::AsFd;

    #[test]
    fn test_mock_records_calls() {
        let platform = MockPlatform::new();
        let child = platform
            .open_user_namespace(ProcessId::from_raw(42))
            .unwrap();
        let parent = platform.parent_namespace(child.as_fd()).unwrap();
        platform.join_user_namespace(parent.as_fd()).unwrap();

        assert_eq!(
            platform.calls(),
            vec![
                MockCall::Open(ProcessId::from_raw(42)),
                MockCall::GetParent,
                MockCall::Join,
            ]
        );
        assert!(platform.joined());
        assert_eq!(
            platform.ambient_namespace(),
            Some(MockPlatform::PARENT_NS)
        );
    }

    #[test]
    fn test_mock_scripted_failure() {
        let platform = MockPlatform::new();
        platform.fail_open(Errno::ENOENT);

        let err = platform
            .open_user_namespace(ProcessId::from_raw(42))
            .unwrap_err();
        assert_eq!(err, Errno::ENOENT);
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_native_platform_available() {
        assert!(native_platform().is_ok());
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_ambient_namespace_readable() {
        let platform = native_platform().unwrap();
        assert!(platform.ambient_namespace().is_some());
    }

    #[test]
    fn test_errno_of_io_error() {
        let err = std::io::Error::from_raw_os_error(libc::ENOENT);
        assert_eq!(errno_of(&err), Errno::ENOENT);

        let err = std::io::Error::other("no errno");
        assert_eq!(errno_of(&err), Errno::EIO);
    }
}
