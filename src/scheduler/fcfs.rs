use super::{Dispatch, ProcessId, SchedConfig, SchedCtx, Scheduler, Slice};

/// Runs processes one after another in arrival order, each to completion.
#[derive(Debug, Default)]
pub struct FcfsScheduler {
    // First arrival position that may still be unfinished
    cursor: usize,
}

impl Scheduler for FcfsScheduler {
    fn init(_ctx: &mut SchedCtx, _config: &SchedConfig) -> Self {
        Self { cursor: 0 }
    }

    fn name(&self) -> &'static str {
        "FCFS"
    }

    fn enqueue(&mut self, _ctx: &mut SchedCtx, _pid: ProcessId) {}

    fn dispatch(&mut self, ctx: &mut SchedCtx) -> Option<Dispatch> {
        while let Some(&pid) = ctx.order.get(self.cursor) {
            if !ctx.is_terminal(pid) {
                return Some(Dispatch {
                    pid,
                    slice: Slice::ToCompletion,
                });
            }
            self.cursor += 1;
        }
        None
    }
}
