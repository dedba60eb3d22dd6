use slotmap::{SlotMap, new_key_type};

use super::{
    estimate::BurstEstimates,
    process::{Handle, Millis, Process, ProcessState},
    queue::FeedbackQueues,
};

new_key_type! {
    pub struct ProcessId;
}

/// State of one scheduling session: the process table, the feedback queues
/// and the learned burst estimates. Policies receive it by reference on
/// every callback.
///
/// The lifecycle operations (`dispatch`, `resume`, `pause`, `complete`) are
/// the only place process timestamps change.
#[derive(Debug, Default)]
pub struct SchedCtx {
    pub processes: SlotMap<ProcessId, Process>,
    // Arrival order of the processes still held by the session
    pub order: Vec<ProcessId>,
    pub levels: FeedbackQueues,
    pub estimates: BurstEstimates,
    remaining: usize,
}

impl SchedCtx {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admit(&mut self, command: impl Into<String>, arrival_time: Millis) -> ProcessId {
        let pid = self.processes.insert(Process::new(command, arrival_time));
        self.order.push(pid);
        self.remaining += 1;
        pid
    }

    /// Drops a terminal process from the session once it has been reported.
    pub fn release(&mut self, pid: ProcessId) -> Option<Process> {
        debug_assert!(
            self.processes
                .get(pid)
                .is_none_or(|p| p.state.is_terminal()),
            "Releasing live process {pid:?}"
        );
        debug_assert!(!self.levels.contains(pid), "Releasing queued process {pid:?}");
        let process = self.processes.remove(pid)?;
        self.order.retain(|&other| other != pid);
        Some(process)
    }

    pub fn process(&self, pid: ProcessId) -> &Process {
        &self.processes[pid]
    }

    pub fn process_mut(&mut self, pid: ProcessId) -> &mut Process {
        &mut self.processes[pid]
    }

    pub fn command(&self, pid: ProcessId) -> &str {
        self.process(pid).command()
    }

    /// Processes admitted but not yet finished or errored.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn is_terminal(&self, pid: ProcessId) -> bool {
        self.process(pid).state.is_terminal()
    }

    pub fn dispatch(&mut self, pid: ProcessId, handle: Option<Handle>, now: Millis) {
        let p = self.process_mut(pid);
        debug_assert!(
            !p.state.is_terminal(),
            "Terminal process {pid:?} cannot be dispatched"
        );

        p.handle = handle;
        if !p.state.is_started() {
            p.start_time = now;
        }
        p.context_start_time = now;
        p.state = ProcessState::Running;
    }

    pub fn resume(&mut self, pid: ProcessId, now: Millis) {
        let p = self.process_mut(pid);
        debug_assert_eq!(
            p.state,
            ProcessState::Ready,
            "Process {pid:?} must be paused before it is resumed"
        );
        p.context_start_time = now;
        p.state = ProcessState::Running;
    }

    pub fn pause(&mut self, pid: ProcessId, now: Millis) {
        let p = self.process_mut(pid);
        debug_assert_eq!(
            p.state,
            ProcessState::Running,
            "Process {pid:?} must be running to be paused"
        );
        p.context_end_time = now;
        p.burst_time += now.saturating_sub(p.context_start_time);
        p.state = ProcessState::Ready;
    }

    /// Closes the final run interval. `ok` tells a clean exit from an error.
    pub fn complete(&mut self, pid: ProcessId, now: Millis, ok: bool) {
        let p = self.process_mut(pid);
        debug_assert_eq!(
            p.state,
            ProcessState::Running,
            "Process {pid:?} must have been running before completion"
        );

        p.context_end_time = now;
        p.completion_time = now;
        p.burst_time += now.saturating_sub(p.context_start_time);
        p.state = if ok {
            ProcessState::Finished
        } else {
            ProcessState::Errored
        };

        self.remaining -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_time_survives_resume() {
        let mut ctx = SchedCtx::new();
        let pid = ctx.admit("yes", 0);

        ctx.dispatch(pid, Some(Handle(7)), 10);
        ctx.pause(pid, 30);
        ctx.resume(pid, 50);
        ctx.pause(pid, 55);
        ctx.resume(pid, 70);
        ctx.complete(pid, 72, true);

        let p = ctx.process(pid);
        assert_eq!(p.start_time(), 10);
        assert_eq!(p.context_start_time(), 70);
        assert_eq!(p.context_end_time(), 72);
        assert_eq!(p.burst_time(), 20 + 5 + 2);
        assert_eq!(p.turnaround_time(), Some(72));
        assert_eq!(p.waiting_time(), Some(72 - 27));
        assert_eq!(p.response_time(), Some(10));
        assert_eq!(ctx.remaining(), 0);
    }

    #[test]
    fn errored_completion_counts_final_slice() {
        let mut ctx = SchedCtx::new();
        let pid = ctx.admit("false", 4);
        ctx.dispatch(pid, Some(Handle(9)), 6);
        ctx.complete(pid, 9, false);

        let p = ctx.process(pid);
        assert_eq!(p.state(), ProcessState::Errored);
        assert_eq!(p.burst_time(), 3);
        assert_eq!(p.response_time(), Some(2));
        assert_eq!(p.turnaround_time(), None);
    }

    #[test]
    fn release_forgets_arrival_position() {
        let mut ctx = SchedCtx::new();
        let a = ctx.admit("a", 0);
        let b = ctx.admit("b", 0);
        ctx.dispatch(a, None, 0);
        ctx.complete(a, 1, true);

        assert!(ctx.release(a).is_some());
        assert_eq!(ctx.order, vec![b]);
        assert_eq!(ctx.remaining(), 1);
    }
}
