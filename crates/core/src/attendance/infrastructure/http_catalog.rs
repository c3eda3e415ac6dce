use serde::Deserialize;

use crate::attendance::domain::catalog::{CatalogError, CatalogSource, ClassInfo, Session};
use crate::shared::api_client::{ApiClient, ApiError};
use crate::shared::constants::{CLASSES_PATH, SESSIONS_PATH};

#[derive(Debug, Deserialize)]
struct ClassesResponse {
    #[serde(default)]
    #[allow(dead_code)]
    total: usize,
    #[serde(default)]
    classes: Vec<ClassInfo>,
}

/// Session and class listings from the attendance backend.
pub struct HttpCatalog {
    client: ApiClient,
}

impl HttpCatalog {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl CatalogSource for HttpCatalog {
    fn sessions(&self) -> Result<Vec<Session>, CatalogError> {
        self.client.get_json(SESSIONS_PATH).map_err(to_catalog_error)
    }

    fn classes(&self) -> Result<Vec<ClassInfo>, CatalogError> {
        self.client
            .get_json::<ClassesResponse>(CLASSES_PATH)
            .map(|response| response.classes)
            .map_err(to_catalog_error)
    }
}

fn to_catalog_error(error: ApiError) -> CatalogError {
    match error {
        ApiError::Status { status, detail, .. } => CatalogError::Rejected { status, detail },
        ApiError::Decode { source, .. } => CatalogError::Malformed(source.to_string()),
        other => CatalogError::Unreachable(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_classes_envelope() {
        let json = r#"{"total": 2, "classes": [
            {"class_id": "C1", "class_name": "Networks"},
            {"class_id": "C2", "class_name": null, "subject_name": "Math"}
        ]}"#;
        let parsed: ClassesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.classes.len(), 2);
        assert_eq!(parsed.classes[1].subject_name.as_deref(), Some("Math"));
    }

    #[test]
    fn test_unreachable_backend() {
        let client = ApiClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let catalog = HttpCatalog::new(client);
        assert!(matches!(catalog.sessions(), Err(CatalogError::Unreachable(_))));
        assert!(matches!(catalog.classes(), Err(CatalogError::Unreachable(_))));
    }
}
