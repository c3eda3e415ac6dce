use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionError {
    #[error("camera {device} could not be opened: {reason}")]
    Unavailable { device: String, reason: String },
    #[error("camera access denied for {device}")]
    Denied { device: String },
    #[error("camera {device} has no video stream")]
    NoVideoStream { device: String },
    #[error("camera stream was lost")]
    Lost,
}

/// Live video source owned by the capture controller.
///
/// `start` acquires the device at a requested resolution (the device may
/// settle on its own native size); `capture_frame` returns the most recent
/// frame without blocking, or `None` while the stream is not yet producing
/// frames or after it has ended. `is_streaming` turns false once the
/// stream ends on its own. `stop` must be idempotent.
pub trait Camera: Send {
    fn start(&mut self, width: u32, height: u32) -> Result<(), AcquisitionError>;

    fn capture_frame(&mut self) -> Option<Frame>;

    fn stop(&mut self);

    fn is_streaming(&self) -> bool;
}
