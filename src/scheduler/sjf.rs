use std::cmp::Ordering;

use keyed_priority_queue::KeyedPriorityQueue;

use super::{Dispatch, ExitStatus, ProcessId, SchedConfig, SchedCtx, Scheduler, Slice};
use crate::core::Millis;

/// Ranking of a waiting process: smaller expected burst first, then earlier
/// arrival.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub struct SjfRank {
    pub expected: Millis,
    pub arrival_seq: u64,
}

// KeyedPriorityQueue is a max-heap, so the comparison is reversed
impl PartialOrd for SjfRank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SjfRank {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.expected, other.arrival_seq).cmp(&(self.expected, self.arrival_seq))
    }
}

/// Non-preemptive shortest job first, ranked by learned burst estimates.
#[derive(Debug)]
pub struct SjfScheduler {
    waiting: KeyedPriorityQueue<ProcessId, SjfRank>,
    next_seq: u64,
}

impl SjfScheduler {
    pub fn waiting(&self) -> usize {
        self.waiting.len()
    }

    /// Re-ranks waiting processes running `command` after its estimate moved.
    fn rerank(&mut self, ctx: &SchedCtx, command: &str) {
        let expected = ctx.estimates.expected_burst(command);
        let stale: Vec<(ProcessId, SjfRank)> = self
            .waiting
            .iter()
            .filter(|(pid, _)| ctx.command(**pid) == command)
            .map(|(pid, rank)| (*pid, *rank))
            .collect();

        for (pid, rank) in stale {
            let rank = SjfRank { expected, ..rank };
            let updated = self.waiting.set_priority(&pid, rank);
            debug_assert!(updated.is_ok(), "Process {pid:?} vanished while re-ranking");
        }
    }
}

impl Scheduler for SjfScheduler {
    fn init(_ctx: &mut SchedCtx, _config: &SchedConfig) -> Self {
        Self {
            waiting: KeyedPriorityQueue::new(),
            next_seq: 0,
        }
    }

    fn name(&self) -> &'static str {
        "SJF"
    }

    fn enqueue(&mut self, ctx: &mut SchedCtx, pid: ProcessId) {
        let rank = SjfRank {
            expected: ctx.estimates.expected_burst(ctx.command(pid)),
            arrival_seq: self.next_seq,
        };
        self.next_seq += 1;
        self.waiting.push(pid, rank);
    }

    fn dispatch(&mut self, _ctx: &mut SchedCtx) -> Option<Dispatch> {
        let (pid, _) = self.waiting.pop()?;
        Some(Dispatch {
            pid,
            slice: Slice::ToCompletion,
        })
    }

    fn completed(&mut self, ctx: &mut SchedCtx, pid: ProcessId, exit: ExitStatus) {
        if exit != ExitStatus::ExitedOk {
            return;
        }
        let process = ctx.process(pid);
        let (command, burst) = (process.command().to_owned(), process.burst_time());
        ctx.estimates.record_burst(&command, burst);
        self.rerank(ctx, &command);
    }
}
