use std::time::Instant;

use crate::attendance::domain::attendance_record::AttendanceRecord;
use crate::kiosk::kiosk_error::KioskError;
use crate::recognition::domain::face_match::Recognition;

/// Operator-facing event sink for the capture loop.
///
/// Decouples the controller from how events are shown (log lines, a
/// terminal UI, a test recorder).
pub trait KioskNotifier: Send {
    /// The status line changed.
    fn status(&mut self, text: &str);

    /// A recognition response was applied.
    fn recognized(&mut self, recognition: &Recognition);

    /// A student entered the checked-in list for this capture session.
    fn checked_in(&mut self, record: &AttendanceRecord);

    fn error(&mut self, error: &KioskError);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards every event.
pub struct NullNotifier;

impl KioskNotifier for NullNotifier {
    fn status(&mut self, _text: &str) {}
    fn recognized(&mut self, _recognition: &Recognition) {}
    fn checked_in(&mut self, _record: &AttendanceRecord) {}
    fn error(&mut self, _error: &KioskError) {}
}

/// Writes events through the `log` facade and keeps run totals for the
/// summary report.
pub struct LogNotifier {
    start_time: Instant,
    cycles: usize,
    faces: usize,
    recognized: usize,
    checked_in: usize,
    recognition_errors: usize,
    checkin_errors: usize,
    acquisition_errors: usize,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            faces: 0,
            recognized: 0,
            checked_in: 0,
            recognition_errors: 0,
            checkin_errors: 0,
            acquisition_errors: 0,
        }
    }

    /// Returns the formatted summary, or `None` if nothing happened.
    pub fn summary_string(&self) -> Option<String> {
        let errors = self.recognition_errors + self.checkin_errors + self.acquisition_errors;
        if self.cycles == 0 && errors == 0 {
            return None;
        }

        let elapsed = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Kiosk summary ({} recognition cycles, {elapsed:.1}s total):",
            self.cycles
        )];
        lines.push(format!("  faces seen:       {}", self.faces));
        lines.push(format!("  faces recognized: {}", self.recognized));
        lines.push(format!("  students checked in: {}", self.checked_in));
        if errors > 0 {
            lines.push(format!(
                "  errors: {} recognition, {} check-in, {} camera",
                self.recognition_errors, self.checkin_errors, self.acquisition_errors
            ));
        }
        Some(lines.join("\n"))
    }

    pub fn cycles(&self) -> usize {
        self.cycles
    }

    pub fn checked_in_count(&self) -> usize {
        self.checked_in
    }
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl KioskNotifier for LogNotifier {
    fn status(&mut self, text: &str) {
        log::info!("Status: {text}");
    }

    fn recognized(&mut self, recognition: &Recognition) {
        self.cycles += 1;
        self.faces += recognition.faces_count();
        self.recognized += recognition.recognized_count;
        if recognition.faces_count() == 0 {
            log::debug!("No faces in frame");
            return;
        }
        let labels: Vec<String> = recognition.matches.iter().map(|m| m.label()).collect();
        log::info!(
            "Recognized {}/{} faces: {}",
            recognition.recognized_count,
            recognition.faces_count(),
            labels.join(", ")
        );
    }

    fn checked_in(&mut self, record: &AttendanceRecord) {
        self.checked_in += 1;
        let name = record.student_name.as_deref().unwrap_or("");
        let class = record
            .class_name
            .as_deref()
            .or(record.class_id.as_deref())
            .unwrap_or("-");
        log::info!(
            "Checked in {} {} ({}) at {}",
            record.student_id,
            name,
            class,
            record.display_time()
        );
    }

    fn error(&mut self, error: &KioskError) {
        match error {
            KioskError::Acquisition(_) => {
                self.acquisition_errors += 1;
                log::error!("{} {}", error.headline(), error);
            }
            KioskError::Recognition(_) => {
                self.recognition_errors += 1;
                log::warn!("{} {}", error.headline(), error);
            }
            KioskError::Checkin(_) => {
                self.checkin_errors += 1;
                log::warn!("{} {}", error.headline(), error);
            }
        }
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::domain::checkin_service::CheckinError;
    use crate::recognition::domain::face_match::{FaceBox, FaceMatch};
    use crate::recognition::domain::face_recognizer::RecognitionError;

    fn recognition(faces: usize, recognized: usize) -> Recognition {
        Recognition {
            matches: (0..faces)
                .map(|i| FaceMatch {
                    face: FaceBox {
                        id: i as u32,
                        x: 0,
                        y: 0,
                        w: 1,
                        h: 1,
                        confidence: None,
                    },
                    identity: None,
                })
                .collect(),
            recognized_count: recognized,
            message: String::new(),
        }
    }

    #[test]
    fn test_null_notifier_all_methods_are_noop() {
        let mut notifier = NullNotifier;
        notifier.status("Ready");
        notifier.recognized(&recognition(1, 0));
        notifier.checked_in(&AttendanceRecord::default());
        notifier.error(&KioskError::Checkin(CheckinError::Malformed("x".into())));
        notifier.summary();
    }

    #[test]
    fn test_recognized_accumulates_counts() {
        let mut notifier = LogNotifier::new();
        notifier.recognized(&recognition(2, 1));
        notifier.recognized(&recognition(0, 0));
        assert_eq!(notifier.cycles(), 2);

        let summary = notifier.summary_string().unwrap();
        assert!(summary.contains("2 recognition cycles"));
        assert!(summary.contains("faces seen:       2"));
        assert!(summary.contains("faces recognized: 1"));
    }

    #[test]
    fn test_errors_counted_by_kind() {
        let mut notifier = LogNotifier::new();
        notifier.error(&KioskError::Recognition(RecognitionError::Unreachable(
            "refused".into(),
        )));
        notifier.error(&KioskError::Recognition(RecognitionError::Malformed(
            "eof".into(),
        )));
        notifier.error(&KioskError::Checkin(CheckinError::Malformed("eof".into())));

        let summary = notifier.summary_string().unwrap();
        assert!(summary.contains("errors: 2 recognition, 1 check-in, 0 camera"));
    }

    #[test]
    fn test_checked_in_counts() {
        let mut notifier = LogNotifier::new();
        notifier.checked_in(&AttendanceRecord {
            student_id: "S1".into(),
            ..Default::default()
        });
        assert_eq!(notifier.checked_in_count(), 1);
    }

    #[test]
    fn test_empty_summary_returns_none() {
        assert!(LogNotifier::new().summary_string().is_none());
    }
}
