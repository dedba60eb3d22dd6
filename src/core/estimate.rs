//! Learned burst-time estimates keyed by command text.
//!
//! A fixed set of buckets with chained entries. Lookups always compare the
//! full command, so two commands that hash to the same bucket never share
//! statistics.

use super::process::Millis;

/// Expected burst for a command that has never completed.
pub const DEFAULT_EXPECTED_BURST: Millis = 1000;

const NUM_BUCKETS: usize = 8;
const HASH_SEED: u64 = 5147;
const HASH_BASE: u64 = 131;
const HASH_MODULUS: u64 = 1_000_000_007;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurstStat {
    pub command: String,
    pub total: Millis,
    pub samples: u64,
}

impl BurstStat {
    pub fn mean(&self) -> Millis {
        self.total / self.samples
    }
}

#[derive(Debug, Default)]
pub struct BurstEstimates {
    buckets: [Vec<BurstStat>; NUM_BUCKETS],
}

/// Polynomial rolling hash over the whole command, last byte first.
pub fn command_hash(command: &str) -> u64 {
    command
        .bytes()
        .rev()
        .fold(HASH_SEED, |acc, byte| (acc * HASH_BASE + byte as u64) % HASH_MODULUS)
}

fn bucket_of(command: &str) -> usize {
    (command_hash(command) % NUM_BUCKETS as u64) as usize
}

impl BurstEstimates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, command: &str) -> Option<&BurstStat> {
        self.buckets[bucket_of(command)]
            .iter()
            .find(|stat| stat.command == command)
    }

    /// Average of the observed bursts, rounded down, or
    /// [`DEFAULT_EXPECTED_BURST`] for an unseen command.
    pub fn expected_burst(&self, command: &str) -> Millis {
        self.lookup(command)
            .map_or(DEFAULT_EXPECTED_BURST, BurstStat::mean)
    }

    pub fn record_burst(&mut self, command: &str, burst: Millis) {
        let bucket = &mut self.buckets[bucket_of(command)];
        match bucket.iter_mut().find(|stat| stat.command == command) {
            Some(stat) => {
                stat.total += burst;
                stat.samples += 1;
            }
            None => bucket.push(BurstStat {
                command: command.to_owned(),
                total: burst,
                samples: 1,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
