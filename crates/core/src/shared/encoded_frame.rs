/// A compressed still image ready to be uploaded.
///
/// Produced once per executed tick and shared between the recognition call
/// and the check-in call of the same cycle, so the camera is never read twice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedFrame {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
    mime_type: &'static str,
}

impl EncodedFrame {
    pub fn new(bytes: Vec<u8>, width: u32, height: u32, mime_type: &'static str) -> Self {
        Self {
            bytes,
            width,
            height,
            mime_type,
        }
    }

    pub fn jpeg(bytes: Vec<u8>, width: u32, height: u32) -> Self {
        Self::new(bytes, width, height, "image/jpeg")
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    /// Upload file name matching the encoding.
    pub fn file_name(&self) -> &'static str {
        match self.mime_type {
            "image/png" => "frame.png",
            _ => "frame.jpg",
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jpeg_constructor_sets_mime_and_file_name() {
        let frame = EncodedFrame::jpeg(vec![0xFF, 0xD8], 640, 480);
        assert_eq!(frame.mime_type(), "image/jpeg");
        assert_eq!(frame.file_name(), "frame.jpg");
        assert_eq!((frame.width(), frame.height()), (640, 480));
        assert_eq!(frame.len(), 2);
        assert!(!frame.is_empty());
    }

    #[test]
    fn test_png_file_name() {
        let frame = EncodedFrame::new(Vec::new(), 1, 1, "image/png");
        assert_eq!(frame.file_name(), "frame.png");
        assert!(frame.is_empty());
    }
}
