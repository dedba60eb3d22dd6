use std::fmt;

/// Milliseconds relative to the session epoch.
pub type Millis = u64;

/// Opaque reference to an externally running process (an OS pid in practice).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(pub i32);

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    NotStarted,
    // Started and currently off the CPU
    Ready,
    Running,
    Finished,
    Errored,
}

impl ProcessState {
    pub const fn is_started(self) -> bool {
        !matches!(self, Self::NotStarted)
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Errored)
    }
}

/// One workload unit. Timestamps only move forward and are mutated through
/// the lifecycle operations on [`SchedCtx`](super::state::SchedCtx).
#[derive(Debug, Clone)]
pub struct Process {
    command: String,
    pub(crate) handle: Option<Handle>,
    pub(crate) state: ProcessState,
    pub(crate) arrival_time: Millis,
    pub(crate) start_time: Millis,
    pub(crate) context_start_time: Millis,
    pub(crate) context_end_time: Millis,
    pub(crate) completion_time: Millis,
    pub(crate) burst_time: Millis,
}

impl Process {
    pub fn new(command: impl Into<String>, arrival_time: Millis) -> Self {
        Self {
            command: command.into(),
            handle: None,
            state: ProcessState::NotStarted,
            arrival_time,
            start_time: 0,
            context_start_time: 0,
            context_end_time: 0,
            completion_time: 0,
            burst_time: 0,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn handle(&self) -> Option<Handle> {
        self.handle
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn arrival_time(&self) -> Millis {
        self.arrival_time
    }

    pub fn start_time(&self) -> Millis {
        self.start_time
    }

    pub fn context_start_time(&self) -> Millis {
        self.context_start_time
    }

    pub fn context_end_time(&self) -> Millis {
        self.context_end_time
    }

    pub fn completion_time(&self) -> Option<Millis> {
        self.state.is_terminal().then_some(self.completion_time)
    }

    pub fn burst_time(&self) -> Millis {
        self.burst_time
    }

    /// Defined for finished processes only.
    pub fn turnaround_time(&self) -> Option<Millis> {
        (self.state == ProcessState::Finished)
            .then(|| self.completion_time.saturating_sub(self.arrival_time))
    }

    pub fn waiting_time(&self) -> Option<Millis> {
        self.turnaround_time()
            .map(|turnaround| turnaround.saturating_sub(self.burst_time))
    }

    pub fn response_time(&self) -> Option<Millis> {
        self.state
            .is_started()
            .then(|| self.start_time.saturating_sub(self.arrival_time))
    }

    pub fn report(&self) -> ProcessReport {
        ProcessReport {
            command: self.command.clone(),
            finished: self.state == ProcessState::Finished,
            errored: self.state == ProcessState::Errored,
            arrival_time: self.arrival_time,
            start_time: self.start_time,
            completion_time: self.completion_time,
            burst_time: self.burst_time,
            turnaround_time: self.turnaround_time(),
            waiting_time: self.waiting_time(),
            response_time: self.response_time().unwrap_or(0),
        }
    }
}

/// Terminal metrics of a process, emitted once per completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessReport {
    pub command: String,
    pub finished: bool,
    pub errored: bool,
    pub arrival_time: Millis,
    pub start_time: Millis,
    pub completion_time: Millis,
    pub burst_time: Millis,
    pub turnaround_time: Option<Millis>,
    pub waiting_time: Option<Millis>,
    pub response_time: Millis,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_process_has_no_metrics() {
        let p = Process::new("sleep 1", 5);
        assert_eq!(p.state(), ProcessState::NotStarted);
        assert_eq!(p.handle(), None);
        assert_eq!(p.burst_time(), 0);
        assert_eq!(p.turnaround_time(), None);
        assert_eq!(p.response_time(), None);
        assert_eq!(p.completion_time(), None);
    }

    #[test]
    fn finished_metrics_are_consistent() {
        let mut p = Process::new("ls", 10);
        p.state = ProcessState::Finished;
        p.start_time = 25;
        p.completion_time = 100;
        p.burst_time = 40;

        assert_eq!(p.turnaround_time(), Some(90));
        assert_eq!(p.waiting_time(), Some(50));
        assert_eq!(p.response_time(), Some(15));
        assert_eq!(
            p.turnaround_time().unwrap(),
            p.waiting_time().unwrap() + p.burst_time()
        );
    }

    #[test]
    fn errored_process_leaves_turnaround_undefined() {
        let mut p = Process::new("false", 0);
        p.state = ProcessState::Errored;
        p.start_time = 3;
        p.completion_time = 8;
        p.burst_time = 5;

        let report = p.report();
        assert!(report.errored && !report.finished);
        assert_eq!(report.turnaround_time, None);
        assert_eq!(report.waiting_time, None);
        assert_eq!(report.response_time, 3);
        assert_eq!(report.burst_time, 5);
    }
}
