use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, ACCEPT},
    Client, StatusCode,
};
use serde_json::Value;

use super::{JsonResponse, JsonTransport, TransportError};

const USER_AGENT: &str = concat!("incident-report/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    auth_token: Option<String>,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            auth_token: None,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}

#[async_trait]
impl JsonTransport for HttpTransport {
    async fn request(
        &self,
        url: &str,
        body: Option<&Value>,
    ) -> Result<JsonResponse, TransportError> {
        let (method, request) = match body {
            Some(body) => ("POST", self.client.post(url).json(body)),
            None => ("GET", self.client.get(url)),
        };
        let request = match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        tracing::debug!("{} {}", method, url);

        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| TransportError::Request(format!("{} {}: {}", method, url, e)))?;

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.bytes().await.map_err(|e| {
            TransportError::Request(format!("Failed to read response from {}: {}", url, e))
        })?;

        into_json_response(status, headers, &bytes)
    }
}

/// Map a received status and body onto a [`JsonResponse`].
///
/// Non-2xx statuses become [`TransportError::Status`] carrying the trimmed
/// body. A blank 2xx body means no content.
fn into_json_response(
    status: StatusCode,
    headers: HeaderMap,
    bytes: &[u8],
) -> Result<JsonResponse, TransportError> {
    if !status.is_success() {
        return Err(TransportError::Status {
            status: status.as_u16(),
            body: String::from_utf8_lossy(bytes).trim().to_string(),
        });
    }

    let body = if bytes.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        Some(serde_json::from_slice(bytes).map_err(|e| TransportError::Decode(e.to_string()))?)
    };

    Ok(JsonResponse {
        status: status.as_u16(),
        headers,
        body,
    })
}
