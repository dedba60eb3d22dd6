use log::debug;

use super::{Dispatch, ExitStatus, ProcessId, SchedConfig, SchedCtx, Scheduler, Slice};
use crate::core::{BOTTOM_LEVEL, Level, Millis, NUM_LEVELS, TOP_LEVEL};

/// Where a newly admitted process enters the feedback queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Always the top level.
    Top,
    /// The level whose quantum covers the command's expected burst. Observed
    /// bursts are recorded on every clean exit to refine the estimate.
    Predicted,
}

/// Three-level feedback queue with demotion on quantum expiry and a
/// periodic priority boost back to the top level.
#[derive(Debug)]
pub struct MlfqScheduler {
    quanta: [Millis; NUM_LEVELS],
    boost_interval: Millis,
    placement: Placement,
    last_boost: Millis,
    // Level the dispatched process was taken from
    running: Option<(ProcessId, Level)>,
}

impl MlfqScheduler {
    /// Fixed workload, every process starts at the top level.
    pub fn offline(config: &SchedConfig) -> Self {
        Self::with_placement(config, Placement::Top)
    }

    /// Dynamic arrivals placed by their predicted burst.
    pub fn online(config: &SchedConfig) -> Self {
        Self::with_placement(config, Placement::Predicted)
    }

    pub fn with_placement(config: &SchedConfig, placement: Placement) -> Self {
        Self {
            quanta: config.quanta,
            boost_interval: config.boost_interval,
            placement,
            last_boost: 0,
            running: None,
        }
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Level 0 if the expected burst fits quantum 0, level 1 if it fits
    /// quantum 1, level 2 otherwise.
    pub fn level_for(&self, expected_burst: Millis) -> Level {
        (TOP_LEVEL..BOTTOM_LEVEL)
            .find(|&level| expected_burst <= self.quanta[level])
            .unwrap_or(BOTTOM_LEVEL)
    }

    fn boost(&mut self, ctx: &mut SchedCtx, now: Millis) {
        let moved = ctx.levels.boost();
        self.last_boost = now;
        debug!("t={now} priority boost moved {moved} processes to level {TOP_LEVEL}");
    }
}

impl Scheduler for MlfqScheduler {
    fn init(_ctx: &mut SchedCtx, config: &SchedConfig) -> Self {
        Self::offline(config)
    }

    fn name(&self) -> &'static str {
        "MLFQ"
    }

    fn enqueue(&mut self, ctx: &mut SchedCtx, pid: ProcessId) {
        let level = match self.placement {
            Placement::Top => TOP_LEVEL,
            Placement::Predicted => {
                let expected = ctx.estimates.expected_burst(ctx.command(pid));
                self.level_for(expected)
            }
        };
        debug!("placing `{}` on level {level}", ctx.command(pid));
        ctx.levels.push(level, pid);
    }

    fn dispatch(&mut self, ctx: &mut SchedCtx) -> Option<Dispatch> {
        let (level, pid) = ctx.levels.pop_highest()?;
        self.running = Some((pid, level));
        Some(Dispatch {
            pid,
            slice: Slice::Quantum(self.quanta[level]),
        })
    }

    fn preempted(&mut self, ctx: &mut SchedCtx, pid: ProcessId) {
        let Some((running, level)) = self.running.take() else {
            debug_assert!(false, "Preempted {pid:?} was never dispatched");
            return;
        };
        debug_assert_eq!(running, pid, "Preempted process is not the dispatched one");
        ctx.levels.demote(level, pid);
    }

    fn completed(&mut self, ctx: &mut SchedCtx, pid: ProcessId, exit: ExitStatus) {
        self.running = None;
        if self.placement == Placement::Predicted && exit == ExitStatus::ExitedOk {
            let process = ctx.process(pid);
            let (command, burst) = (process.command().to_owned(), process.burst_time());
            ctx.estimates.record_burst(&command, burst);
        }
    }

    fn tick(&mut self, ctx: &mut SchedCtx, now: Millis) {
        if now.saturating_sub(self.last_boost) >= self.boost_interval {
            self.boost(ctx, now);
        }
    }
}
