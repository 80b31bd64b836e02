//! Sleep seam for the scheduler

use std::thread;
use std::time::Duration;

/// Something the scheduler can wait on
pub trait Clock {
    fn sleep(&mut self, duration: Duration);
}

/// Wall-clock sleeps
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Records requested sleeps without waiting. Used by dry runs and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    pub sleeps: Vec<Duration>,
}

impl ManualClock {
    pub fn elapsed(&self) -> Duration {
        self.sleeps.iter().sum()
    }
}

impl Clock for ManualClock {
    fn sleep(&mut self, duration: Duration) {
        self.sleeps.push(duration);
    }
}
