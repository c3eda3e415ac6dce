use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::shared::encoded_frame::EncodedFrame;
use crate::shared::settings::{join_url, normalize_base_url};

const MAX_DETAIL_CHARS: usize = 200;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}: {detail}")]
    Status {
        url: String,
        status: u16,
        detail: String,
    },
    #[error("unexpected response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Blocking JSON client for the attendance backend.
///
/// Shared by the recognition, check-in and catalog adapters. Cheap to clone:
/// the underlying reqwest client is reference counted.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    pub fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|e| ApiError::Request {
                url: url.clone(),
                source: e,
            })?;
        read_json(url, response)
    }

    /// Uploads `frame` as the multipart field `file`, plus extra text fields.
    pub fn post_frame<T: DeserializeOwned>(
        &self,
        path: &str,
        frame: &EncodedFrame,
        fields: Vec<(&'static str, String)>,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let part = Part::bytes(frame.bytes().to_vec())
            .file_name(frame.file_name())
            .mime_str(frame.mime_type())
            .map_err(|e| ApiError::Request {
                url: url.clone(),
                source: e,
            })?;

        let mut form = Form::new().part("file", part);
        for (name, value) in fields {
            form = form.text(name, value);
        }

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .map_err(|e| ApiError::Request {
                url: url.clone(),
                source: e,
            })?;
        read_json(url, response)
    }
}

fn read_json<T: DeserializeOwned>(
    url: String,
    response: reqwest::blocking::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.bytes().map_err(|e| ApiError::Request {
        url: url.clone(),
        source: e,
    })?;

    if !status.is_success() {
        return Err(ApiError::Status {
            url,
            status: status.as_u16(),
            detail: error_detail(&body),
        });
    }

    serde_json::from_slice(&body).map_err(|e| ApiError::Decode { url, source: e })
}

/// Extracts a human-readable message from an error body.
///
/// FastAPI-style `{"detail": ...}` bodies yield the detail; anything else
/// yields the (truncated) body text.
pub fn error_detail(body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        match value.get("detail") {
            Some(serde_json::Value::String(s)) => return s.clone(),
            Some(other) => return other.to_string(),
            None => {}
        }
    }
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.chars().count() > MAX_DETAIL_CHARS {
        let truncated: String = text.chars().take(MAX_DETAIL_CHARS).collect();
        format!("{truncated}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_detail_prefers_fastapi_detail() {
        let body = br#"{"detail": "Invalid image format"}"#;
        assert_eq!(error_detail(body), "Invalid image format");
    }

    #[test]
    fn test_error_detail_serializes_structured_detail() {
        let body = br#"{"detail": [{"loc": ["body", "file"]}]}"#;
        assert!(error_detail(body).contains("\"file\""));
    }

    #[test]
    fn test_error_detail_falls_back_to_text() {
        assert_eq!(error_detail(b"  Bad Gateway \n"), "Bad Gateway");
    }

    #[test]
    fn test_error_detail_truncates_long_bodies() {
        let body = "x".repeat(500);
        let detail = error_detail(body.as_bytes());
        assert_eq!(detail.len(), MAX_DETAIL_CHARS + 3);
        assert!(detail.ends_with("..."));
    }

    #[test]
    fn test_client_normalizes_base_url() {
        let client = ApiClient::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(
            client.url("/api/face/recognize"),
            "http://localhost:8000/api/face/recognize"
        );
    }

    #[test]
    fn test_unreachable_backend_is_request_error() {
        // Port 9 (discard) on loopback is expected to refuse connections.
        let client = ApiClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let result: Result<serde_json::Value, ApiError> = client.get_json("/api/sessions/");
        assert!(matches!(result, Err(ApiError::Request { .. })));
    }
}
