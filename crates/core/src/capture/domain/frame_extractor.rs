use std::sync::Arc;

use crate::capture::domain::camera::{AcquisitionError, Camera};
use crate::capture::domain::frame_encoder::FrameEncoder;
use crate::shared::encoded_frame::EncodedFrame;
use crate::shared::frame::Frame;

/// One captured still: the raw pixels (for overlay snapshots) and the
/// encoded buffer that is uploaded.
#[derive(Clone, Debug)]
pub struct CapturedFrame {
    pub raw: Frame,
    pub encoded: Arc<EncodedFrame>,
}

/// Owns the camera stream and turns its current frame into an image buffer.
pub struct FrameExtractor {
    camera: Box<dyn Camera>,
    encoder: Box<dyn FrameEncoder>,
}

impl FrameExtractor {
    pub fn new(camera: Box<dyn Camera>, encoder: Box<dyn FrameEncoder>) -> Self {
        Self { camera, encoder }
    }

    pub fn start(&mut self, width: u32, height: u32) -> Result<(), AcquisitionError> {
        self.camera.start(width, height)
    }

    pub fn stop(&mut self) {
        self.camera.stop();
    }

    pub fn is_streaming(&self) -> bool {
        self.camera.is_streaming()
    }

    /// Encodes the camera's current frame at its native resolution.
    ///
    /// Returns `None` when the camera has nothing to offer yet or encoding
    /// fails; either way the caller skips the tick.
    pub fn extract(&mut self) -> Option<CapturedFrame> {
        let raw = self.camera.capture_frame()?;
        match self.encoder.encode(&raw) {
            Ok(encoded) => Some(CapturedFrame {
                raw,
                encoded: Arc::new(encoded),
            }),
            Err(e) => {
                log::warn!("Dropping frame {}: {e}", raw.sequence());
                None
            }
        }
    }
}
