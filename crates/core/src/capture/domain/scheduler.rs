use std::time::Instant;

use crossbeam_channel::Receiver;

/// Periodic timer driving the capture loop.
///
/// Each call to `ticks` starts a fresh timer; dropping the receiver cancels
/// it. Ticks that arrive while the loop is busy are simply dropped by the
/// controller's overlap guard.
pub trait Scheduler: Send {
    fn ticks(&self) -> Receiver<Instant>;
}
