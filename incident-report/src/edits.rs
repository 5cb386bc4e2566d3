use serde::Serialize;
use serde_json::{json, Map, Value};

/// Fields that must be present when an edit creates a new report. Missing
/// ones are copied from the held record before the request is sent.
pub const REQUIRED_ON_CREATE: &[&str] = &[];

/// A partial set of incident report fields to apply on the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ReportEdits(Map<String, Value>);

impl ReportEdits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn summary(self, summary: impl Into<String>) -> Self {
        self.set("summary", summary.into())
    }

    /// Queue a new report entry. Repeated calls append in order.
    pub fn add_report_entry(mut self, text: impl Into<String>) -> Self {
        let entry = json!({ "text": text.into() });
        match self.0.get_mut("report_entries") {
            Some(Value::Array(entries)) => entries.push(entry),
            _ => {
                self.0
                    .insert("report_entries".to_string(), Value::Array(vec![entry]));
            }
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub(crate) fn insert(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    pub fn as_json(&self) -> Value {
        Value::Object(self.0.clone())
    }
}
