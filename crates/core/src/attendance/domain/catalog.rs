use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A scheduled class meeting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: i64,
    #[serde(default)]
    pub class_id: Option<String>,
    #[serde(default)]
    pub class_ids: Option<Vec<String>>,
    pub session_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub class_id: String,
    #[serde(default, rename = "class_name")]
    pub name: Option<String>,
    #[serde(default)]
    pub subject_name: Option<String>,
    #[serde(default)]
    pub lecturer_name: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog service unreachable: {0}")]
    Unreachable(String),
    #[error("catalog service returned HTTP {status}: {detail}")]
    Rejected { status: u16, detail: String },
    #[error("malformed catalog response: {0}")]
    Malformed(String),
}

/// Read-only listing of sessions and classes.
pub trait CatalogSource: Send + Sync {
    fn sessions(&self) -> Result<Vec<Session>, CatalogError>;

    fn classes(&self) -> Result<Vec<ClassInfo>, CatalogError>;
}

/// Reference data fetched once when the kiosk starts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    pub sessions: Vec<Session>,
    pub classes: Vec<ClassInfo>,
}

impl Catalog {
    pub fn new(sessions: Vec<Session>, classes: Vec<ClassInfo>) -> Self {
        Self { sessions, classes }
    }

    /// Fetches both lists; a failing list is logged and left empty.
    pub fn load(source: &dyn CatalogSource) -> Self {
        let sessions = source.sessions().unwrap_or_else(|e| {
            log::warn!("Could not load sessions: {e}");
            Vec::new()
        });
        let classes = source.classes().unwrap_or_else(|e| {
            log::warn!("Could not load classes: {e}");
            Vec::new()
        });
        log::info!(
            "Loaded {} sessions and {} classes",
            sessions.len(),
            classes.len()
        );
        Self { sessions, classes }
    }

    pub fn session(&self, session_id: i64) -> Option<&Session> {
        self.sessions.iter().find(|s| s.session_id == session_id)
    }

    /// Display name for a class: its trimmed name, or the id when unnamed.
    pub fn class_name<'a>(&'a self, class_id: &'a str) -> &'a str {
        self.classes
            .iter()
            .find(|c| c.class_id == class_id)
            .and_then(|c| c.name.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(class_id)
    }
}
