use crossbeam_channel::Receiver;

use crate::kiosk::capture_controller::CaptureController;

/// Operator commands accepted while the kiosk runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KioskCommand {
    Start,
    Stop,
    SelectSession(Option<i64>),
    SelectClasses(Vec<String>),
    Shutdown,
}

/// Drives a [`CaptureController`] until shutdown.
///
/// This is a port. Infrastructure decides how ticks are produced and where
/// network jobs run.
pub trait KioskRunner: Send {
    /// Runs until `Shutdown` arrives or every command sender is dropped.
    /// Capture is stopped before returning.
    fn run(&self, controller: &mut CaptureController, commands: Receiver<KioskCommand>);
}
