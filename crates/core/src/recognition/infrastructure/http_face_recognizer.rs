use serde::Deserialize;

use crate::recognition::domain::face_match::{FaceBox, Recognition, RecognizedIdentity};
use crate::recognition::domain::face_recognizer::{FaceRecognizer, RecognitionError};
use crate::shared::api_client::{ApiClient, ApiError};
use crate::shared::constants::RECOGNIZE_PATH;
use crate::shared::encoded_frame::EncodedFrame;

/// Wire shape of `POST /api/face/recognize`.
#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    faces_count: usize,
    #[serde(default)]
    faces: Vec<FaceBox>,
    #[serde(default)]
    recognized_count: Option<usize>,
    #[serde(default)]
    recognized_students: Vec<Option<RecognizedIdentity>>,
    #[serde(default)]
    message: String,
}

impl From<RecognizeResponse> for Recognition {
    fn from(response: RecognizeResponse) -> Self {
        if response.faces_count != response.faces.len() {
            log::warn!(
                "Recognition reported {} faces but returned {} boxes",
                response.faces_count,
                response.faces.len()
            );
        }
        Recognition::from_aligned(
            response.faces,
            response.recognized_students,
            response.recognized_count,
            response.message,
        )
    }
}

/// Recognition service reached over the attendance backend's REST API.
pub struct HttpFaceRecognizer {
    client: ApiClient,
}

impl HttpFaceRecognizer {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl FaceRecognizer for HttpFaceRecognizer {
    fn recognize(&self, image: &EncodedFrame) -> Result<Recognition, RecognitionError> {
        let response: RecognizeResponse = self
            .client
            .post_frame(RECOGNIZE_PATH, image, Vec::new())
            .map_err(to_recognition_error)?;
        Ok(response.into())
    }
}

fn to_recognition_error(error: ApiError) -> RecognitionError {
    match error {
        ApiError::Status { status, detail, .. } => RecognitionError::Rejected { status, detail },
        ApiError::Decode { source, .. } => RecognitionError::Malformed(source.to_string()),
        other => RecognitionError::Unreachable(other.to_string()),
    }
}
