use chrono::NaiveDateTime;

use crate::attendance::domain::catalog::{Catalog, Session};
use crate::attendance::domain::checkin_service::CheckinTarget;

/// True iff the session is today and has not yet ended.
pub fn is_active(session: &Session, now: NaiveDateTime) -> bool {
    session.session_date == now.date() && session.end_time > now.time()
}

pub fn active_sessions(sessions: &[Session], now: NaiveDateTime) -> Vec<&Session> {
    sessions.iter().filter(|s| is_active(s, now)).collect()
}

/// Distinct class ids of all active sessions, in first-seen order.
pub fn active_class_ids(sessions: &[Session], now: NaiveDateTime) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for session in active_sessions(sessions, now) {
        let listed = session.class_ids.iter().flatten();
        for id in session.class_id.iter().chain(listed) {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
    }
    ids
}

/// The operator's session/class choice.
///
/// A pinned session forces the class selection to that session's class;
/// choosing more than one class unpins the session, since an attendance row
/// can reference only one session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassSelection {
    session_id: Option<i64>,
    class_ids: Vec<String>,
}

impl ClassSelection {
    pub fn session_id(&self) -> Option<i64> {
        self.session_id
    }

    pub fn class_ids(&self) -> &[String] {
        &self.class_ids
    }

    pub fn select_session(&mut self, session_id: Option<i64>, catalog: &Catalog) {
        self.session_id = session_id;
        let pinned = session_id
            .and_then(|id| catalog.session(id))
            .and_then(|s| s.class_id.clone());
        if let Some(class_id) = pinned {
            self.class_ids = vec![class_id];
        }
    }

    pub fn select_classes(&mut self, class_ids: Vec<String>) {
        let mut unique: Vec<String> = Vec::with_capacity(class_ids.len());
        for id in class_ids {
            let id = id.trim().to_string();
            if !id.is_empty() && !unique.contains(&id) {
                unique.push(id);
            }
        }
        self.class_ids = unique;
        if self.class_ids.len() > 1 {
            self.session_id = None;
        }
    }

    /// Context for the next check-in; a known pinned session's class wins.
    pub fn checkin_target(&self, catalog: &Catalog) -> CheckinTarget {
        let pinned = self
            .session_id
            .and_then(|id| catalog.session(id))
            .and_then(|s| s.class_id.clone());
        CheckinTarget {
            session_id: self.session_id,
            class_ids: match pinned {
                Some(class_id) => vec![class_id],
                None => self.class_ids.clone(),
            },
        }
    }
}
