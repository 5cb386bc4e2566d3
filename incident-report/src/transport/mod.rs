//! The request seam between the report page and the incident reports API.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

mod http;
#[cfg(test)]
pub(crate) mod mock;

pub use http::HttpTransport;
pub use reqwest::header::{HeaderMap, HeaderValue};

/// Response header carrying the number the server assigned to a new report.
pub const REPORT_NUMBER_HEADER: &str = "Incident-Report-Number";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(String),
    #[error("HTTP {status}{}", describe_body(.body))]
    Status { status: u16, body: String },
    #[error("Failed to parse response as JSON: {0}")]
    Decode(String),
}

fn describe_body(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(": {}", body)
    }
}

#[derive(Debug, Clone, Default)]
pub struct JsonResponse {
    pub status: u16,
    pub headers: HeaderMap,
    /// `None` when the server sent no content.
    pub body: Option<Value>,
}

impl JsonResponse {
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
    }
}

/// Issues JSON requests: a GET when `body` is `None`, a POST otherwise.
///
/// Every call resolves to exactly one response or error.
#[async_trait]
pub trait JsonTransport: Send + Sync {
    async fn request(&self, url: &str, body: Option<&Value>)
        -> Result<JsonResponse, TransportError>;
}
