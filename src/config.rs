use crate::{
    core::{Millis, NUM_LEVELS},
    error::ConfigError,
};

pub const DEFAULT_QUANTUM: Millis = 100;
pub const DEFAULT_QUANTA: [Millis; NUM_LEVELS] = [100, 200, 400];
pub const DEFAULT_BOOST_INTERVAL: Millis = 1000;
pub const DEFAULT_IDLE_POLL: Millis = 10;

/// Timing knobs of a scheduling session, all in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedConfig {
    /// Round-robin slice.
    pub quantum: Millis,
    /// Per-level slices of the feedback queues, top level first.
    pub quanta: [Millis; NUM_LEVELS],
    pub boost_interval: Millis,
    /// Sleep between input polls while nothing is runnable (online only).
    pub idle_poll: Millis,
}

impl Default for SchedConfig {
    fn default() -> Self {
        Self {
            quantum: DEFAULT_QUANTUM,
            quanta: DEFAULT_QUANTA,
            boost_interval: DEFAULT_BOOST_INTERVAL,
            idle_poll: DEFAULT_IDLE_POLL,
        }
    }
}

impl SchedConfig {
    pub fn with_quantum(mut self, quantum: Millis) -> Self {
        self.quantum = quantum;
        self
    }

    pub fn with_quanta(mut self, quanta: &[Millis]) -> Result<Self, ConfigError> {
        self.quanta = quanta
            .try_into()
            .map_err(|_| ConfigError::QuantaCount {
                expected: NUM_LEVELS,
                got: quanta.len(),
            })?;
        Ok(self)
    }

    pub fn with_boost_interval(mut self, boost_interval: Millis) -> Self {
        self.boost_interval = boost_interval;
        self
    }

    pub fn with_idle_poll(mut self, idle_poll: Millis) -> Self {
        self.idle_poll = idle_poll;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("quantum", self.quantum),
            ("boost interval", self.boost_interval),
            ("idle poll", self.idle_poll),
        ];
        let quanta = ["quantum 0", "quantum 1", "quantum 2"]
            .into_iter()
            .zip(self.quanta);

        match fields.into_iter().chain(quanta).find(|&(_, value)| value == 0) {
            Some((name, _)) => Err(ConfigError::NotPositive { name }),
            None => Ok(()),
        }
    }
}
