//! Scripted transport for exercising the report page without a server.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use super::{JsonResponse, JsonTransport, TransportError};

/// Ordered log of everything the transport and view were asked to do.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().expect("journal lock poisoned").push(event.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().expect("journal lock poisoned").clone()
    }

    pub fn position(&self, event: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == event)
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.entries()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub url: String,
    pub body: Option<Value>,
}

/// Replies to requests in order from a queue of scripted outcomes.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<VecDeque<Result<JsonResponse, TransportError>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    journal: Journal,
}

impl MockTransport {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            ..Self::default()
        }
    }

    fn push(&self, outcome: Result<JsonResponse, TransportError>) {
        self.responses
            .lock()
            .expect("mock responses lock poisoned")
            .push_back(outcome);
    }

    pub fn respond_json(&self, body: Value) {
        self.push(Ok(JsonResponse {
            status: 200,
            headers: HeaderMap::new(),
            body: Some(body),
        }));
    }

    pub fn respond_no_content(&self) {
        self.push(Ok(JsonResponse {
            status: 204,
            headers: HeaderMap::new(),
            body: None,
        }));
    }

    pub fn respond_created(&self, number: &'static str) {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("incident-report-number"),
            HeaderValue::from_static(number),
        );
        self.push(Ok(JsonResponse {
            status: 204,
            headers,
            body: None,
        }));
    }

    pub fn fail(&self, error: TransportError) {
        self.push(Err(error));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .expect("mock requests lock poisoned")
            .clone()
    }

    pub fn gets(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|r| r.body.is_none())
            .map(|r| r.url)
            .collect()
    }

    pub fn posts(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.body.is_some())
            .collect()
    }
}

#[async_trait]
impl JsonTransport for MockTransport {
    async fn request(
        &self,
        url: &str,
        body: Option<&Value>,
    ) -> Result<JsonResponse, TransportError> {
        let method = if body.is_some() { "POST" } else { "GET" };
        self.journal.push(format!("{} {}", method, url));
        self.requests
            .lock()
            .expect("mock requests lock poisoned")
            .push(RecordedRequest {
                url: url.to_string(),
                body: body.cloned(),
            });

        self.responses
            .lock()
            .expect("mock responses lock poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Request("no scripted response".to_string())))
    }
}
