use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;

use crate::capture::domain::scheduler::Scheduler;
use crate::shared::constants::TICK_INTERVAL;

/// Fixed-period timer backed by `crossbeam_channel::tick`.
///
/// The tick channel buffers at most one pending tick, so a slow consumer
/// sees dropped ticks rather than a backlog.
pub struct IntervalScheduler {
    interval: Duration,
}

impl IntervalScheduler {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for IntervalScheduler {
    fn default() -> Self {
        Self::new(TICK_INTERVAL)
    }
}

impl Scheduler for IntervalScheduler {
    fn ticks(&self) -> Receiver<Instant> {
        crossbeam_channel::tick(self.interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_fire_periodically() {
        let scheduler = IntervalScheduler::new(Duration::from_millis(10));
        let ticks = scheduler.ticks();
        let first = ticks.recv_timeout(Duration::from_secs(1)).unwrap();
        let second = ticks.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_default_interval() {
        assert_eq!(IntervalScheduler::default().interval(), TICK_INTERVAL);
    }
}
