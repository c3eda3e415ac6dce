use thiserror::Error;

use crate::attendance::domain::attendance_record::CheckinOutcome;
use crate::shared::encoded_frame::EncodedFrame;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckinError {
    #[error("check-in service unreachable: {0}")]
    Unreachable(String),
    #[error("check-in service returned HTTP {status}: {detail}")]
    Rejected { status: u16, detail: String },
    #[error("malformed check-in response: {0}")]
    Malformed(String),
}

/// Class/session context attached to a check-in request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckinTarget {
    pub session_id: Option<i64>,
    pub class_ids: Vec<String>,
}

impl CheckinTarget {
    /// Form fields for the check-in request.
    ///
    /// Several classes travel as one comma-joined `class_ids` field, which
    /// the backend prefers over `class_id`; a single class uses `class_id`.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(id) = self.session_id {
            fields.push(("session_id", id.to_string()));
        }
        match self.class_ids.as_slice() {
            [] => {}
            [single] => fields.push(("class_id", single.clone())),
            many => fields.push(("class_ids", many.join(","))),
        }
        fields
    }
}

/// Records attendance for every enrolled student found in an image.
pub trait CheckinService: Send + Sync {
    fn check_in(
        &self,
        image: &EncodedFrame,
        target: &CheckinTarget,
    ) -> Result<CheckinOutcome, CheckinError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_target_sends_no_fields() {
        assert!(CheckinTarget::default().form_fields().is_empty());
    }

    #[test]
    fn test_session_with_single_class() {
        let target = CheckinTarget {
            session_id: Some(4),
            class_ids: vec!["C1".into()],
        };
        assert_eq!(
            target.form_fields(),
            vec![("session_id", "4".to_string()), ("class_id", "C1".to_string())]
        );
    }

    #[test]
    fn test_multiple_classes_use_class_ids() {
        let target = CheckinTarget {
            session_id: None,
            class_ids: vec!["C1".into(), "C2".into()],
        };
        assert_eq!(target.form_fields(), vec![("class_ids", "C1,C2".to_string())]);
    }
}
