use super::process::Handle;
use crate::error::ControlError;

/// What a process looks like from the outside after a poll or wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Running,
    ExitedOk,
    ExitedError,
}

impl ExitStatus {
    pub const fn has_exited(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Launches and steers externally running processes.
pub trait ProcessControl {
    fn spawn(&mut self, command: &str) -> Result<Handle, ControlError>;

    /// Stops a running process. Benign if it already exited.
    fn suspend(&mut self, handle: Handle) -> Result<(), ControlError>;

    fn resume(&mut self, handle: Handle) -> Result<(), ControlError>;

    /// Non-blocking status check.
    fn poll(&mut self, handle: Handle) -> Result<ExitStatus, ControlError>;

    /// Blocks until the process exits. Never returns `Running`.
    fn wait(&mut self, handle: Handle) -> Result<ExitStatus, ControlError>;
}
