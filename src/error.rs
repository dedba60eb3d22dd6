use std::{io, path::PathBuf};

use thiserror::Error;

use crate::core::Handle;

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("empty command line")]
    EmptyCommand,
    #[error("failed to spawn `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to {action} process {handle}")]
    Signal {
        action: &'static str,
        handle: Handle,
        #[source]
        source: nix::Error,
    },
    #[error("failed to wait on process {handle}")]
    Wait {
        handle: Handle,
        #[source]
        source: nix::Error,
    },
}

/// Failures that end a whole scheduling run.
#[derive(Debug, Error)]
pub enum SchedError {
    #[error("lost track of `{command}` while polling")]
    Poll {
        command: String,
        #[source]
        source: ControlError,
    },
    #[error("lost track of `{command}` while waiting for it to exit")]
    Wait {
        command: String,
        #[source]
        source: ControlError,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a positive number of milliseconds")]
    NotPositive { name: &'static str },
    #[error("expected {expected} quanta, got {got}")]
    QuantaCount { expected: usize, got: usize },
}

#[derive(Debug, Error)]
pub enum WorkloadError {
    #[error("failed to read workload from {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("workload is empty")]
    Empty,
}
