//! A real process in a nested user namespace, for tests against the kernel

use parentns_core::ProcessId;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// `sleep` running `depth` user namespaces below the test process
///
/// Killed and reaped on drop.
pub struct NestedTarget {
    child: Child,
}

impl NestedTarget {
    /// Spawn the target through `unshare -Ur`, once per level
    ///
    /// Returns `None` when `unshare` is missing or user namespaces cannot be
    /// created here.
    pub fn spawn(depth: usize) -> Option<Self> {
        let mut command = Command::new("unshare");
        for _ in 1..depth {
            command.args(["-Ur", "unshare"]);
        }
        command
            .args(["-Ur", "sleep", "30"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let mut target = Self {
            child: command.spawn().ok()?,
        };

        // unshare execs in place, so the pid turns into `sleep` once every
        // level has been created
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if matches!(target.child.try_wait(), Ok(Some(_)) | Err(_)) {
                return None;
            }
            let comm = std::fs::read_to_string(format!("/proc/{}/comm", target.child.id()));
            if comm.is_ok_and(|comm| comm.trim() == "sleep") {
                return Some(target);
            }
            thread::sleep(Duration::from_millis(10));
        }
        None
    }

    /// Process id of the target
    pub fn pid(&self) -> ProcessId {
        ProcessId::new(i32::try_from(self.child.id()).unwrap()).unwrap()
    }
}

impl Drop for NestedTarget {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
