use std::collections::{HashSet, VecDeque};

use crate::attendance::domain::attendance_record::AttendanceRecord;

/// Students already shown as checked in during the current capture session.
///
/// Backs the displayed check-in list: newest first, at most one row per
/// student id.
#[derive(Debug, Default)]
pub struct DedupLedger {
    seen: HashSet<String>,
    entries: VecDeque<AttendanceRecord>,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the record unless its student is already listed.
    ///
    /// Returns whether the record was added.
    pub fn admit(&mut self, record: AttendanceRecord) -> bool {
        if record.student_id.is_empty() || !self.seen.insert(record.student_id.clone()) {
            return false;
        }
        self.entries.push_front(record);
        true
    }

    pub fn contains(&self, student_id: &str) -> bool {
        self.seen.contains(student_id)
    }

    /// Displayed rows, most recent first.
    pub fn entries(&self) -> impl Iterator<Item = &AttendanceRecord> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.seen.clear();
        self.entries.clear();
    }
}
