use serde::{Deserialize, Serialize};

/// One attendance row created (or refreshed) by a check-in call.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct AttendanceRecord {
    #[serde(default)]
    pub attendance_id: Option<i64>,
    pub student_id: String,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub student_email: Option<String>,
    #[serde(default)]
    pub class_id: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub subject_name: Option<String>,
    #[serde(default)]
    pub session_id: Option<i64>,
    #[serde(default)]
    pub session_date: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub checkin_time: Option<String>,
    #[serde(default)]
    pub attendance_date: Option<String>,
    #[serde(default)]
    pub attendance_time: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub recognition_confidence: Option<f64>,
}

impl AttendanceRecord {
    /// Check-in time for display.
    ///
    /// Prefers `attendance_date attendance_time`; otherwise the ISO
    /// `checkin_time` with the `T` separator replaced and fractional seconds
    /// cut; otherwise empty.
    pub fn display_time(&self) -> String {
        if let (Some(date), Some(time)) = (&self.attendance_date, &self.attendance_time) {
            return format!("{date} {time}");
        }
        match &self.checkin_time {
            Some(iso) => iso.replacen('T', " ", 1).chars().take(19).collect(),
            None => String::new(),
        }
    }
}

/// Response of the check-in endpoint.
#[derive(Clone, Debug, PartialEq, Default, Deserialize)]
pub struct CheckinOutcome {
    #[serde(default)]
    pub faces_count: usize,
    #[serde(default)]
    pub recognized_count: usize,
    #[serde(default)]
    pub attendances_created: usize,
    #[serde(default)]
    pub attendances: Vec<AttendanceRecord>,
    #[serde(default)]
    pub message: String,
}
