use thiserror::Error;

use crate::shared::encoded_frame::EncodedFrame;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("frame buffer does not match {width}x{height}x{channels}")]
    Dimensions { width: u32, height: u32, channels: u8 },
    #[error("image encoding failed: {0}")]
    Encode(String),
}

/// Compresses a raw frame into an uploadable image.
pub trait FrameEncoder: Send {
    fn encode(&self, frame: &Frame) -> Result<EncodedFrame, EncodeError>;
}
