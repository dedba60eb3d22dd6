use rustc_hash::FxHashMap;
use std::collections::VecDeque;

use super::state::ProcessId;

pub const NUM_LEVELS: usize = 3;
pub const TOP_LEVEL: Level = 0;
pub const BOTTOM_LEVEL: Level = NUM_LEVELS - 1;

/// Feedback level, 0 being the highest priority.
pub type Level = usize;

/// FIFO of process references. Service order is insertion order.
#[derive(Debug, Default)]
pub struct ReadyQueue {
    entries: VecDeque<ProcessId>,
}

impl ReadyQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, pid: ProcessId) {
        self.entries.push_back(pid);
    }

    pub fn dequeue(&mut self) -> Option<ProcessId> {
        self.entries.pop_front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, pid: ProcessId) -> bool {
        self.entries.contains(&pid)
    }

    pub fn iter(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.entries.iter().copied()
    }
}

/// The three ready queues of a multi-level feedback scheduler.
#[derive(Debug, Default)]
pub struct FeedbackQueues {
    levels: [ReadyQueue; NUM_LEVELS],
    // pid --> level it is queued on; a process sits on at most one level
    queued_on: FxHashMap<ProcessId, Level>,
}

impl FeedbackQueues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: Level, pid: ProcessId) {
        assert!(level < NUM_LEVELS, "Feedback level {level} out of range");
        let previous = self.queued_on.insert(pid, level);
        assert!(
            previous.is_none(),
            "Process {pid:?} already queued on level {previous:?}"
        );
        self.levels[level].enqueue(pid);
    }

    pub fn pop(&mut self, level: Level) -> Option<ProcessId> {
        let pid = self.levels[level].dequeue()?;
        let removed = self.queued_on.remove(&pid);
        debug_assert_eq!(removed, Some(level), "Process {pid:?} membership mismatch");
        Some(pid)
    }

    /// Scans levels top to bottom and dequeues from the first non-empty one.
    pub fn pop_highest(&mut self) -> Option<(Level, ProcessId)> {
        let level = (TOP_LEVEL..NUM_LEVELS).find(|&level| !self.levels[level].is_empty())?;
        self.pop(level).map(|pid| (level, pid))
    }

    /// Re-queues a process that used up its quantum at `level` one level
    /// lower, or on the bottom level again when it is already there.
    pub fn demote(&mut self, level: Level, pid: ProcessId) -> Level {
        let target = (level + 1).min(BOTTOM_LEVEL);
        self.push(target, pid);
        target
    }

    /// Moves everything below the top level to the tail of level 0, level 1
    /// first, keeping queue order. Returns how many processes moved.
    pub fn boost(&mut self) -> usize {
        let mut moved = 0;
        for level in TOP_LEVEL + 1..NUM_LEVELS {
            while let Some(pid) = self.pop(level) {
                self.push(TOP_LEVEL, pid);
                moved += 1;
            }
        }
        moved
    }

    pub fn level_of(&self, pid: ProcessId) -> Option<Level> {
        self.queued_on.get(&pid).copied()
    }

    pub fn contains(&self, pid: ProcessId) -> bool {
        self.queued_on.contains_key(&pid)
    }

    pub fn level(&self, level: Level) -> &ReadyQueue {
        &self.levels[level]
    }

    pub fn len(&self) -> usize {
        self.queued_on.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queued_on.is_empty()
    }

    pub fn memberships(&self) -> impl Iterator<Item = (ProcessId, Level)> + '_ {
        self.queued_on.iter().map(|(&pid, &level)| (pid, level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use slotmap::SlotMap;

    fn pids(n: usize) -> Vec<ProcessId> {
        let mut keys: SlotMap<ProcessId, ()> = SlotMap::with_key();
        (0..n).map(|_| keys.insert(())).collect()
    }

    #[test]
    fn empty_queue_dequeues_nothing() {
        let mut q = ReadyQueue::new();
        assert_eq!(q.dequeue(), None);
        assert!(q.is_empty());
    }

    #[test]
    fn pop_highest_skips_empty_levels() {
        let ids = pids(2);
        let mut fq = FeedbackQueues::new();
        fq.push(2, ids[0]);
        fq.push(1, ids[1]);

        assert_eq!(fq.pop_highest(), Some((1, ids[1])));
        assert_eq!(fq.pop_highest(), Some((2, ids[0])));
        assert_eq!(fq.pop_highest(), None);
        assert!(fq.is_empty());
    }

    #[test]
    fn demotion_stops_at_bottom_level() {
        let ids = pids(1);
        let mut fq = FeedbackQueues::new();

        assert_eq!(fq.demote(0, ids[0]), 1);
        assert_eq!(fq.pop(1), Some(ids[0]));
        assert_eq!(fq.demote(1, ids[0]), 2);
        assert_eq!(fq.pop(2), Some(ids[0]));
        assert_eq!(fq.demote(2, ids[0]), 2);
        assert_eq!(fq.level_of(ids[0]), Some(2));
    }

    #[test]
    fn boost_drains_lower_levels_in_order() {
        let ids = pids(5);
        let mut fq = FeedbackQueues::new();
        fq.push(0, ids[0]);
        fq.push(1, ids[1]);
        fq.push(2, ids[2]);
        fq.push(1, ids[3]);
        fq.push(2, ids[4]);

        assert_eq!(fq.len(), 5);
        assert_eq!(fq.boost(), 4);
        assert!(fq.level(1).is_empty());
        assert!(fq.level(2).is_empty());
        let order: Vec<_> = fq.level(0).iter().collect();
        assert_eq!(order, vec![ids[0], ids[1], ids[3], ids[2], ids[4]]);
        assert!(fq.memberships().all(|(_, level)| level == 0));
    }

    #[test]
    #[should_panic(expected = "already queued")]
    fn double_queueing_is_rejected() {
        let ids = pids(1);
        let mut fq = FeedbackQueues::new();
        fq.push(0, ids[0]);
        fq.push(2, ids[0]);
    }

    proptest! {
        #[test]
        fn ready_queue_preserves_insertion_order(n in 0usize..64) {
            let ids = pids(n);
            let mut q = ReadyQueue::new();
            for &pid in &ids {
                q.enqueue(pid);
            }
            prop_assert_eq!(q.len(), n);
            let drained: Vec<_> = std::iter::from_fn(|| q.dequeue()).collect();
            prop_assert_eq!(drained, ids);
            prop_assert!(q.is_empty());
        }
    }
}
