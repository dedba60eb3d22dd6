//! Process control over real OS processes: spawn through `std::process`,
//! stop and continue with `SIGSTOP`/`SIGCONT`, reap with `waitpid`.

use std::process::Command;

use log::trace;
use nix::{
    errno::Errno,
    sys::{
        signal::{Signal, kill},
        wait::{WaitPidFlag, WaitStatus, waitpid},
    },
    unistd::Pid,
};

use crate::{
    core::{ExitStatus, Handle, ProcessControl},
    error::ControlError,
};

/// Splits a command line on spaces and tabs.
pub fn tokenize(command: &str) -> Vec<&str> {
    command
        .split([' ', '\t'])
        .filter(|token| !token.is_empty())
        .collect()
}

fn exit_status(status: WaitStatus) -> ExitStatus {
    match status {
        WaitStatus::Exited(_, 0) => ExitStatus::ExitedOk,
        WaitStatus::Exited(..) | WaitStatus::Signaled(..) => ExitStatus::ExitedError,
        // Stopped/continued reports are not requested, treat anything else as alive
        _ => ExitStatus::Running,
    }
}

#[derive(Debug, Default)]
pub struct OsProcessControl;

impl OsProcessControl {
    pub fn new() -> Self {
        Self
    }

    fn signal(
        &self,
        handle: Handle,
        signal: Signal,
        action: &'static str,
    ) -> Result<(), ControlError> {
        match kill(Pid::from_raw(handle.0), signal) {
            Ok(()) => Ok(()),
            // Already gone; the next poll will reap it
            Err(Errno::ESRCH) if signal == Signal::SIGSTOP => Ok(()),
            Err(source) => Err(ControlError::Signal {
                action,
                handle,
                source,
            }),
        }
    }
}

impl ProcessControl for OsProcessControl {
    fn spawn(&mut self, command: &str) -> Result<Handle, ControlError> {
        let tokens = tokenize(command);
        let (program, args) = tokens.split_first().ok_or(ControlError::EmptyCommand)?;

        let child = Command::new(program)
            .args(args)
            .spawn()
            .map_err(|source| ControlError::Spawn {
                command: command.to_owned(),
                source,
            })?;

        let handle = Handle(child.id() as i32);
        trace!("spawned `{command}` as {handle}");
        // The child is reaped through waitpid, not through `Child`
        drop(child);
        Ok(handle)
    }

    fn suspend(&mut self, handle: Handle) -> Result<(), ControlError> {
        self.signal(handle, Signal::SIGSTOP, "suspend")
    }

    fn resume(&mut self, handle: Handle) -> Result<(), ControlError> {
        self.signal(handle, Signal::SIGCONT, "resume")
    }

    fn poll(&mut self, handle: Handle) -> Result<ExitStatus, ControlError> {
        waitpid(Pid::from_raw(handle.0), Some(WaitPidFlag::WNOHANG))
            .map(exit_status)
            .map_err(|source| ControlError::Wait { handle, source })
    }

    fn wait(&mut self, handle: Handle) -> Result<ExitStatus, ControlError> {
        loop {
            match waitpid(Pid::from_raw(handle.0), None) {
                Ok(status) => match exit_status(status) {
                    ExitStatus::Running => continue,
                    exit => return Ok(exit),
                },
                Err(Errno::EINTR) => continue,
                Err(source) => return Err(ControlError::Wait { handle, source }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_collapses_blanks() {
        assert_eq!(tokenize("  ls \t-la   /tmp "), vec!["ls", "-la", "/tmp"]);
        assert!(tokenize(" \t ").is_empty());
    }

    #[test]
    fn empty_command_is_not_spawned() {
        let mut control = OsProcessControl::new();
        assert!(matches!(
            control.spawn("   "),
            Err(ControlError::EmptyCommand)
        ));
    }

    #[test]
    fn exit_codes_map_to_outcomes() {
        let pid = Pid::from_raw(1);
        assert_eq!(exit_status(WaitStatus::Exited(pid, 0)), ExitStatus::ExitedOk);
        assert_eq!(exit_status(WaitStatus::Exited(pid, 2)), ExitStatus::ExitedError);
        assert_eq!(
            exit_status(WaitStatus::Signaled(pid, Signal::SIGKILL, false)),
            ExitStatus::ExitedError
        );
        assert_eq!(exit_status(WaitStatus::StillAlive), ExitStatus::Running);
    }

    #[test]
    fn true_and_false_report_their_exit() {
        let mut control = OsProcessControl::new();
        let ok = control.spawn("true").unwrap();
        assert_eq!(control.wait(ok).unwrap(), ExitStatus::ExitedOk);
        let err = control.spawn("false").unwrap();
        assert_eq!(control.wait(err).unwrap(), ExitStatus::ExitedError);
    }

    #[test]
    fn stopped_process_can_be_continued() {
        let mut control = OsProcessControl::new();
        let handle = control.spawn("sleep 0.05").unwrap();
        control.suspend(handle).unwrap();
        assert_eq!(control.poll(handle).unwrap(), ExitStatus::Running);
        control.resume(handle).unwrap();
        assert_eq!(control.wait(handle).unwrap(), ExitStatus::ExitedOk);
    }

    #[test]
    fn missing_program_fails_to_spawn() {
        let mut control = OsProcessControl::new();
        assert!(matches!(
            control.spawn("definitely-not-a-real-program-xyz"),
            Err(ControlError::Spawn { .. })
        ));
    }
}
