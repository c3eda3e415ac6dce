use thiserror::Error;

use crate::recognition::domain::face_match::Recognition;
use crate::shared::encoded_frame::EncodedFrame;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecognitionError {
    #[error("recognition service unreachable: {0}")]
    Unreachable(String),
    #[error("recognition service returned HTTP {status}: {detail}")]
    Rejected { status: u16, detail: String },
    #[error("malformed recognition response: {0}")]
    Malformed(String),
}

/// Detects faces in an image and matches them against enrolled students.
pub trait FaceRecognizer: Send + Sync {
    fn recognize(&self, image: &EncodedFrame) -> Result<Recognition, RecognitionError>;
}
