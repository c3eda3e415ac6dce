use crossbeam_channel::Receiver;

use crate::kiosk::capture_controller::CaptureController;
use crate::kiosk::kiosk_runner::{KioskCommand, KioskRunner};

/// Runs the attendance kiosk until shutdown and reports a summary.
pub struct RunKioskUseCase {
    controller: CaptureController,
    runner: Box<dyn KioskRunner>,
}

impl RunKioskUseCase {
    pub fn new(controller: CaptureController, runner: Box<dyn KioskRunner>) -> Self {
        Self { controller, runner }
    }

    /// Blocks until `Shutdown` or until every command sender is gone.
    pub fn execute(&mut self, commands: Receiver<KioskCommand>) {
        log::info!(
            "Kiosk ready ({} sessions, {} classes loaded)",
            self.controller.catalog().sessions.len(),
            self.controller.catalog().classes.len()
        );
        self.runner.run(&mut self.controller, commands);
        self.controller.notifier().summary();
    }

    pub fn controller(&self) -> &CaptureController {
        &self.controller
    }
}
