use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;

use crate::capture::domain::frame_encoder::{EncodeError, FrameEncoder};
use crate::shared::constants::JPEG_QUALITY;
use crate::shared::encoded_frame::EncodedFrame;
use crate::shared::frame::Frame;

/// Encodes RGB frames to baseline JPEG using the `image` crate.
pub struct JpegFrameEncoder {
    quality: u8,
}

impl JpegFrameEncoder {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }
}

impl Default for JpegFrameEncoder {
    fn default() -> Self {
        Self::new(JPEG_QUALITY)
    }
}

impl FrameEncoder for JpegFrameEncoder {
    fn encode(&self, frame: &Frame) -> Result<EncodedFrame, EncodeError> {
        let expected = frame.width() as usize * frame.height() as usize * 3;
        if frame.channels() != 3 || frame.data().len() != expected {
            return Err(EncodeError::Dimensions {
                width: frame.width(),
                height: frame.height(),
                channels: frame.channels(),
            });
        }

        let mut bytes = Vec::with_capacity(expected / 8);
        let mut encoder = JpegEncoder::new_with_quality(&mut bytes, self.quality);
        encoder
            .encode(
                frame.data(),
                frame.width(),
                frame.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| EncodeError::Encode(e.to_string()))?;

        Ok(EncodedFrame::jpeg(bytes, frame.width(), frame.height()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_frame(width: u32, height: u32, value: u8) -> Frame {
        Frame::new(vec![value; (width * height * 3) as usize], width, height, 3, 0)
    }

    #[test]
    fn test_encode_produces_decodable_jpeg() {
        let encoded = JpegFrameEncoder::default()
            .encode(&make_frame(64, 48, 120))
            .unwrap();
        assert_eq!(encoded.mime_type(), "image/jpeg");
        assert_eq!(&encoded.bytes()[..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory(encoded.bytes()).unwrap();
        assert_eq!(decoded.width(), 64);
        assert_eq!(decoded.height(), 48);
    }

    #[test]
    fn test_lower_quality_is_smaller() {
        let mut data = Vec::with_capacity(64 * 64 * 3);
        for i in 0..(64 * 64 * 3) {
            data.push((i * 31 % 251) as u8);
        }
        let frame = Frame::new(data, 64, 64, 3, 0);
        let high = JpegFrameEncoder::new(95).encode(&frame).unwrap();
        let low = JpegFrameEncoder::new(20).encode(&frame).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn test_quality_is_clamped() {
        assert_eq!(JpegFrameEncoder::new(0).quality(), 1);
        assert_eq!(JpegFrameEncoder::new(200).quality(), 100);
    }

    #[test]
    fn test_non_rgb_frame_is_rejected() {
        let frame = Frame::new(vec![0; 16], 2, 2, 4, 0);
        let result = JpegFrameEncoder::default().encode(&frame);
        assert!(matches!(result, Err(EncodeError::Dimensions { channels: 4, .. })));
    }
}
