use crate::attendance::domain::attendance_record::CheckinOutcome;
use crate::attendance::domain::checkin_service::{CheckinError, CheckinService, CheckinTarget};
use crate::shared::api_client::{ApiClient, ApiError};
use crate::shared::constants::CHECKIN_PATH;
use crate::shared::encoded_frame::EncodedFrame;

/// Check-in through `POST /api/attendance/checkin-by-face`.
pub struct HttpCheckinClient {
    client: ApiClient,
}

impl HttpCheckinClient {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl CheckinService for HttpCheckinClient {
    fn check_in(
        &self,
        image: &EncodedFrame,
        target: &CheckinTarget,
    ) -> Result<CheckinOutcome, CheckinError> {
        self.client
            .post_frame(CHECKIN_PATH, image, target.form_fields())
            .map_err(to_checkin_error)
    }
}

fn to_checkin_error(error: ApiError) -> CheckinError {
    match error {
        ApiError::Status { status, detail, .. } => CheckinError::Rejected { status, detail },
        ApiError::Decode { source, .. } => CheckinError::Malformed(source.to_string()),
        other => CheckinError::Unreachable(other.to_string()),
    }
}
