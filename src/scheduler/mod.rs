pub mod fcfs;
pub mod mlfq;
pub mod rr;
pub mod sjf;

use crate::{
    config::SchedConfig,
    core::{
        Millis,
        control::ExitStatus,
        state::{ProcessId, SchedCtx},
    },
};
pub use fcfs::FcfsScheduler;
pub use mlfq::MlfqScheduler;
pub use rr::RoundRobinScheduler;
pub use sjf::SjfScheduler;

/// How long the driver lets a dispatched process run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slice {
    Quantum(Millis),
    ToCompletion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    pub pid: ProcessId,
    pub slice: Slice,
}

/// A scheduling policy. The driver calls back into it around every run
/// interval; the policy only decides, the driver does the process control
/// and the timestamp bookkeeping.
pub trait Scheduler {
    fn init(ctx: &mut SchedCtx, config: &SchedConfig) -> Self
    where
        Self: Sized;

    fn name(&self) -> &'static str;

    /// A process entered the session.
    fn enqueue(&mut self, ctx: &mut SchedCtx, pid: ProcessId);

    /// Picks the next process to run, or `None` to idle.
    fn dispatch(&mut self, ctx: &mut SchedCtx) -> Option<Dispatch>;

    /// The process used up its slice and was paused.
    fn preempted(&mut self, _ctx: &mut SchedCtx, _pid: ProcessId) {}

    /// The process exited; `exit` is `ExitedOk` or `ExitedError`.
    fn completed(&mut self, _ctx: &mut SchedCtx, _pid: ProcessId, _exit: ExitStatus) {}

    /// Called after every driver step with the current session time.
    fn tick(&mut self, _ctx: &mut SchedCtx, _now: Millis) {}
}
