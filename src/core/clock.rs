use std::{
    thread,
    time::{Duration, Instant},
};

use super::process::Millis;

/// Session time source. `now` is measured from the session epoch.
pub trait Clock {
    fn now(&self) -> Millis;

    fn sleep(&mut self, duration: Millis);
}

/// Wall-clock time at millisecond granularity.
#[derive(Debug)]
pub struct WallClock {
    epoch: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WallClock {
    fn now(&self) -> Millis {
        self.epoch.elapsed().as_millis() as Millis
    }

    fn sleep(&mut self, duration: Millis) {
        thread::sleep(Duration::from_millis(duration));
    }
}
