use super::{process::ProcessState, queue::NUM_LEVELS, state::SchedCtx};

#[derive(Debug, Default)]
pub struct Observer {
    step: u64,
}

impl Observer {
    pub fn new() -> Self {
        Self { step: 0 }
    }

    pub fn steps(&self) -> u64 {
        self.step
    }

    pub fn observe(&mut self, ctx: &SchedCtx) {
        self.step += 1;

        let mut live = 0;
        for (pid, process) in &ctx.processes {
            let state = process.state();
            debug_assert_ne!(
                state,
                ProcessState::Running,
                "Process {pid:?} left running between steps"
            );
            if !state.is_terminal() {
                live += 1;
            }
            if state.is_started() {
                debug_assert!(
                    process.start_time() >= process.arrival_time(),
                    "Process {pid:?} started before it arrived"
                );
            }
            if state == ProcessState::Finished {
                debug_assert_eq!(
                    process.turnaround_time(),
                    process.waiting_time().map(|w| w + process.burst_time()),
                    "Process {pid:?} turnaround != waiting + burst"
                );
            }
        }
        debug_assert_eq!(live, ctx.remaining(), "Remaining count drifted");

        let queued: usize = (0..NUM_LEVELS).map(|level| ctx.levels.level(level).len()).sum();
        debug_assert_eq!(ctx.levels.len(), queued, "Queue lengths disagree with memberships");
        debug_assert_eq!(ctx.levels.is_empty(), queued == 0);

        for (pid, level) in ctx.levels.memberships() {
            let Some(process) = ctx.processes.get(pid) else {
                debug_assert!(false, "Level {level} references unknown process {pid:?}");
                continue;
            };
            debug_assert!(
                !process.state().is_terminal(),
                "Terminal process {pid:?} still queued on level {level}"
            );
            debug_assert!(
                ctx.levels.level(level).contains(pid),
                "Membership claims {pid:?} on level {level}, but the queue does not hold it"
            );
        }
    }
}
