use super::{Dispatch, ProcessId, SchedConfig, SchedCtx, Scheduler, Slice};
use crate::core::Millis;

/// Circular scan over the arrival order. A preempted process keeps its
/// position instead of being re-queued, so the service order is the one a
/// FIFO seeded once with every process would give.
#[derive(Debug)]
pub struct RoundRobinScheduler {
    quantum: Millis,
    cursor: usize,
}

impl RoundRobinScheduler {
    pub fn quantum(&self) -> Millis {
        self.quantum
    }
}

impl Scheduler for RoundRobinScheduler {
    fn init(_ctx: &mut SchedCtx, config: &SchedConfig) -> Self {
        Self {
            quantum: config.quantum,
            cursor: 0,
        }
    }

    fn name(&self) -> &'static str {
        "RR"
    }

    fn enqueue(&mut self, _ctx: &mut SchedCtx, _pid: ProcessId) {}

    fn dispatch(&mut self, ctx: &mut SchedCtx) -> Option<Dispatch> {
        let n = ctx.order.len();
        if n == 0 || ctx.remaining() == 0 {
            return None;
        }

        // Skip finished or errored entries, wrapping at most once.
        let index = (0..n)
            .map(|offset| (self.cursor + offset) % n)
            .find(|&index| !ctx.is_terminal(ctx.order[index]))?;

        self.cursor = (index + 1) % n;
        Some(Dispatch {
            pid: ctx.order[index],
            slice: Slice::Quantum(self.quantum),
        })
    }
}
