use std::time::{Duration, Instant};

/// Spacing half of the tick overlap guard.
///
/// A tick passes only if at least `min_spacing` has elapsed since the last
/// tick that passed. Rejected ticks are dropped, never queued.
#[derive(Debug, Clone)]
pub struct TickGate {
    min_spacing: Duration,
    last_executed: Option<Instant>,
}

impl TickGate {
    pub fn new(min_spacing: Duration) -> Self {
        Self {
            min_spacing,
            last_executed: None,
        }
    }

    /// Records `now` as an executed tick if spacing allows.
    pub fn try_pass(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_executed {
            if now.saturating_duration_since(last) < self.min_spacing {
                return false;
            }
        }
        self.last_executed = Some(now);
        true
    }

    pub fn reset(&mut self) {
        self.last_executed = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_first_tick_always_passes() {
        let mut gate = TickGate::new(Duration::from_millis(700));
        assert!(gate.try_pass(Instant::now()));
    }

    #[rstest]
    #[case(100, false)]
    #[case(699, false)]
    #[case(700, true)]
    #[case(900, true)]
    fn test_spacing_since_last_executed(#[case] elapsed_ms: u64, #[case] passes: bool) {
        let mut gate = TickGate::new(Duration::from_millis(700));
        let t0 = Instant::now();
        assert!(gate.try_pass(t0));
        assert_eq!(gate.try_pass(t0 + Duration::from_millis(elapsed_ms)), passes);
    }

    #[test]
    fn test_rejected_tick_does_not_move_reference_point() {
        let mut gate = TickGate::new(Duration::from_millis(700));
        let t0 = Instant::now();
        assert!(gate.try_pass(t0));
        assert!(!gate.try_pass(t0 + Duration::from_millis(400)));
        // Measured from t0, not from the rejected tick at +400ms.
        assert!(gate.try_pass(t0 + Duration::from_millis(750)));
    }

    #[test]
    fn test_reset_allows_immediate_tick() {
        let mut gate = TickGate::new(Duration::from_millis(700));
        let t0 = Instant::now();
        assert!(gate.try_pass(t0));
        gate.reset();
        assert!(gate.try_pass(t0 + Duration::from_millis(1)));
    }
}
