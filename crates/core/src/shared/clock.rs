use std::time::Instant;

use chrono::NaiveDateTime;

/// Source of time for the capture loop.
///
/// Monotonic time drives tick spacing; wall-clock local time drives
/// session activity. Tests substitute a manual clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    fn local_now(&self) -> NaiveDateTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn local_now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
