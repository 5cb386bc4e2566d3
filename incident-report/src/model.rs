use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::error::ReportError;

/// An incident report as served by the incident reports API.
///
/// The decoded JSON object is held as received, so a record serializes back
/// to exactly the payload it was loaded from. Accessors read the fields the
/// client works with.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IncidentReport(Map<String, Value>);

impl IncidentReport {
    /// The stand-in record used before the server has assigned a number.
    pub fn placeholder() -> Self {
        let mut fields = Map::new();
        fields.insert("number".to_string(), Value::Null);
        fields.insert("created".to_string(), Value::Null);
        Self(fields)
    }

    pub fn number(&self) -> Option<i64> {
        self.0.get("number").and_then(Value::as_i64)
    }

    /// Creation time as sent by the server. Not required to be RFC 3339.
    pub fn created(&self) -> Option<&str> {
        self.0.get("created").and_then(Value::as_str)
    }

    pub fn summary(&self) -> Option<&str> {
        self.0.get("summary").and_then(Value::as_str)
    }

    /// Entries in server order. Entries that are not objects are skipped.
    pub fn report_entries(&self) -> Vec<ReportEntry> {
        match self.0.get("report_entries") {
            Some(Value::Array(entries)) => entries
                .iter()
                .filter_map(|entry| ReportEntry::deserialize(entry).ok())
                .collect(),
            _ => vec![],
        }
    }

    /// Look up a top-level field by its JSON key.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn as_json(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for IncidentReport {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl TryFrom<Value> for IncidentReport {
    type Error = ReportError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(ReportError::Decode(format!(
                "expected a JSON object, got {}",
                other
            ))),
        }
    }
}

/// Display view of one entry of a report's `report_entries`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub system_entry: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parse an RFC 3339 timestamp, as the server writes them.
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(raw, &Rfc3339).ok()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
