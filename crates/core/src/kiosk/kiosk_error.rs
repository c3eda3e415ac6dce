use thiserror::Error;

use crate::attendance::domain::checkin_service::CheckinError;
use crate::capture::domain::camera::AcquisitionError;
use crate::recognition::domain::face_recognizer::RecognitionError;

/// Failures surfaced to the operator by the capture loop.
///
/// None of these end the process. Acquisition errors turn capture off;
/// the other two only affect the cycle they happened in.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KioskError {
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),
    #[error(transparent)]
    Recognition(#[from] RecognitionError),
    #[error(transparent)]
    Checkin(#[from] CheckinError),
}

impl KioskError {
    /// Short operator-facing headline for the error kind.
    pub fn headline(&self) -> &'static str {
        match self {
            KioskError::Acquisition(AcquisitionError::Lost) => {
                "Camera disconnected. Start capture again once it is back."
            }
            KioskError::Acquisition(_) => "Could not open the camera. Check device access.",
            KioskError::Recognition(_) => "Recognition failed. Check the backend.",
            KioskError::Checkin(_) => "Check-in failed.",
        }
    }
}
