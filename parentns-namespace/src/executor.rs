//! Handoff executor: replace the process image in the parent namespace

use nix::errno::Errno;
use parentns_core::{Error, ProcessId, Result, Stage, TargetCommand};

use crate::locator::{ChildNamespace, locate};
use crate::platform::NamespacePlatform;
use crate::resolver::ParentNamespace;
use crate::switcher::Ascended;

impl<P: NamespacePlatform> Ascended<'_, P> {
    /// Become `command`
    ///
    /// Resolves the program through `PATH` and inherits the environment,
    /// descriptor table and standard streams. On success this never returns,
    /// so the return value is always the reason it failed.
    pub fn handoff(mut self, command: &TargetCommand) -> Error {
        tracing::info!("Executing command: {command}");
        self.handed_off = true;

        let errno = self.platform.exec(command);
        tracing::debug!(program = command.program(), error = %errno, "exec failed");

        handoff_error(command, errno)
    }
}

fn handoff_error(command: &TargetCommand, errno: Errno) -> Error {
    match errno {
        Errno::ENOENT => Error::CommandNotFound {
            program: command.program().to_string(),
        },
        _ => Error::Unexpected {
            stage: Stage::Handoff,
            source: errno,
        },
    }
}

/// Run the whole pipeline: locate, resolve, switch, hand off
///
/// Only returns on failure. Every namespace descriptor has been closed by
/// the time it does.
pub fn ascend_and_exec<P: NamespacePlatform>(
    platform: &P,
    pid: ProcessId,
    command: &TargetCommand,
) -> Error {
    match ascend(platform, pid) {
        Ok(ascended) => ascended.handoff(command),
        Err(e) => e,
    }
}

/// Locate, resolve and switch without handing off
///
/// # Errors
/// Returns the first stage's error; membership is unchanged in that case
pub fn ascend<P: NamespacePlatform>(platform: &P, pid: ProcessId) -> Result<Ascended<'_, P>> {
    locate(platform, pid)
        .and_then(ChildNamespace::resolve_parent)
        .and_then(ParentNamespace::switch)
}
