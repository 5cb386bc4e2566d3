use async_trait::async_trait;
use incident_report::{HttpTransport, JsonResponse, JsonTransport, TransportError};
use serde_json::Value;

use crate::dev_backend::DevBackend;

/// Where requests go: a real IMS server or the in-memory dev backend.
#[derive(Debug, Clone)]
pub enum Backend {
    Http(HttpTransport),
    Dev(DevBackend),
}

#[async_trait]
impl JsonTransport for Backend {
    async fn request(
        &self,
        url: &str,
        body: Option<&Value>,
    ) -> Result<JsonResponse, TransportError> {
        match self {
            Backend::Http(http) => http.request(url, body).await,
            Backend::Dev(dev) => dev.request(url, body).await,
        }
    }
}
