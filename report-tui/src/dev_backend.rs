use async_trait::async_trait;
use incident_report::transport::{HeaderMap, HeaderValue};
use incident_report::{
    parse_timestamp, IncidentReport, JsonResponse, JsonTransport, ReportsURL, TransportError,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub const DEV_REPORTS_URL: &str = "http://localhost/ims/api/incident_reports";

/// In-memory stand-in for the IMS incident reports endpoints.
#[derive(Debug, Clone)]
pub struct DevBackend {
    base: ReportsURL,
    author: String,
    store: Arc<Mutex<DevStore>>,
}

#[derive(Debug)]
struct DevStore {
    reports: BTreeMap<i64, IncidentReport>,
    next_number: i64,
}

impl DevBackend {
    pub fn new(author: &str) -> Self {
        let reports = seed_dev_reports();
        let next_number = reports.keys().max().map_or(1, |n| n + 1);
        Self {
            base: ReportsURL::new(DEV_REPORTS_URL),
            author: author.to_string(),
            store: Arc::new(Mutex::new(DevStore {
                reports,
                next_number,
            })),
        }
    }

    pub fn reports_url(&self) -> &ReportsURL {
        &self.base
    }

    fn create(&self, body: &Value) -> Result<JsonResponse, TransportError> {
        let Value::Object(json) = body else {
            return Err(bad_request("JSON incident report must be a dictionary"));
        };
        if json.get("number").is_some_and(|n| !n.is_null()) {
            return Err(bad_request("New incident reports may not specify a number"));
        }
        let mut report = json.clone();
        match report.get("report_entries") {
            None | Some(Value::Null) | Some(Value::Array(_)) => {}
            Some(_) => return Err(bad_request("report_entries must be a list")),
        }
        let now = OffsetDateTime::now_utc();

        match report.get("created") {
            Some(Value::String(raw)) => match parse_timestamp(raw) {
                Some(created) if created > now => {
                    return Err(bad_request(&format!(
                        "Created time {} is in the future. Current time is {}.",
                        raw,
                        format_timestamp(now)
                    )));
                }
                Some(_) => {}
                None => return Err(bad_request(&format!("Invalid created time: {}", raw))),
            },
            None | Some(Value::Null) => {
                // Default to now, or to the oldest entry if one predates it.
                let mut created = now;
                if let Some(Value::Array(entries)) = report.get_mut("report_entries") {
                    for entry in entries.iter_mut().filter_map(Value::as_object_mut) {
                        if entry.get("author").map_or(true, Value::is_null) {
                            entry.insert("author".to_string(), Value::from(self.author.clone()));
                        }
                        match entry
                            .get("created")
                            .and_then(Value::as_str)
                            .and_then(parse_timestamp)
                        {
                            Some(entry_created) if entry_created < created => {
                                created = entry_created
                            }
                            Some(_) => {}
                            None => {
                                entry.insert(
                                    "created".to_string(),
                                    Value::from(format_timestamp(now)),
                                );
                            }
                        }
                    }
                }
                report.insert("created".to_string(), Value::from(format_timestamp(created)));
            }
            Some(other) => {
                return Err(bad_request(&format!("Invalid created time: {}", other)));
            }
        }

        let mut store = self.store.lock().expect("dev store lock poisoned");
        let number = store.next_number;
        store.next_number += 1;
        report.insert("number".to_string(), Value::from(number));
        store.reports.insert(number, IncidentReport::from(report));

        let mut headers = HeaderMap::new();
        insert_header(&mut headers, "incident-report-number", &number.to_string());
        insert_header(&mut headers, "location", &self.base.report(number));
        Ok(JsonResponse {
            status: 204,
            headers,
            body: None,
        })
    }

    fn edit(&self, number: i64, body: &Value) -> Result<JsonResponse, TransportError> {
        let Value::Object(edits) = body else {
            return Err(bad_request("JSON incident report must be a dictionary"));
        };

        if edits.get("number").is_some_and(|n| n.as_i64() != Some(number)) {
            return Err(bad_request("Incident report number may not be modified"));
        }
        if edits.contains_key("created") {
            return Err(bad_request(
                "Incident report created time may not be modified",
            ));
        }

        let new_entries = match edits.get("report_entries") {
            Some(Value::Array(entries)) => entries
                .iter()
                .map(|entry| self.new_entry(entry))
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => return Err(bad_request("report_entries must be a list")),
            None => vec![],
        };

        let mut store = self.store.lock().expect("dev store lock poisoned");
        let report = store.reports.get_mut(&number).ok_or_else(not_found)?;

        if let Some(summary) = edits.get("summary") {
            report.insert("summary", summary.clone());
        }
        if !new_entries.is_empty() {
            let mut entries = match report.field("report_entries") {
                Some(Value::Array(entries)) => entries.clone(),
                _ => vec![],
            };
            entries.extend(new_entries);
            report.insert("report_entries", entries);
        }

        Ok(JsonResponse {
            status: 204,
            headers: HeaderMap::new(),
            body: None,
        })
    }

    fn new_entry(&self, json: &Value) -> Result<Value, TransportError> {
        let text = json
            .get("text")
            .and_then(Value::as_str)
            .ok_or_else(|| bad_request("Report entry must have text"))?;

        Ok(json!({
            "author": self.author,
            "text": text,
            "created": format_timestamp(OffsetDateTime::now_utc()),
            "system_entry": false,
        }))
    }

    fn read(&self, number: i64) -> Result<JsonResponse, TransportError> {
        let store = self.store.lock().expect("dev store lock poisoned");
        let report = store.reports.get(&number).ok_or_else(not_found)?;

        Ok(JsonResponse {
            status: 200,
            headers: HeaderMap::new(),
            body: Some(Value::Object(report.as_json().clone())),
        })
    }
}

#[async_trait]
impl JsonTransport for DevBackend {
    async fn request(
        &self,
        url: &str,
        body: Option<&Value>,
    ) -> Result<JsonResponse, TransportError> {
        let rest = url
            .strip_prefix(self.base.as_ref())
            .ok_or_else(not_found)?
            .trim_start_matches('/');

        if rest.is_empty() {
            return match body {
                Some(body) => self.create(body),
                None => Err(TransportError::Status {
                    status: 405,
                    body: "Listing incident reports is not supported".to_string(),
                }),
            };
        }

        let number = rest.parse::<i64>().map_err(|_| not_found())?;
        match body {
            Some(body) => self.edit(number, body),
            None => self.read(number),
        }
    }
}

fn insert_header(headers: &mut HeaderMap, name: &'static str, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(name, value);
    }
}

fn bad_request(message: &str) -> TransportError {
    TransportError::Status {
        status: 400,
        body: message.to_string(),
    }
}

fn not_found() -> TransportError {
    TransportError::Status {
        status: 404,
        body: "Not found".to_string(),
    }
}

fn format_timestamp(dt: OffsetDateTime) -> String {
    dt.format(&Rfc3339).unwrap_or_default()
}

fn seed_dev_reports() -> BTreeMap<i64, IncidentReport> {
    let entry = |author: &str, text: &str, created: &str, system_entry: bool| {
        json!({
            "author": author,
            "text": text,
            "created": created,
            "system_entry": system_entry,
        })
    };
    let report = |fields: Value| match fields {
        Value::Object(fields) => IncidentReport::from(fields),
        _ => IncidentReport::default(),
    };

    let mut reports = BTreeMap::new();
    reports.insert(
        1,
        report(json!({
            "number": 1,
            "created": "2024-08-28T21:04:11Z",
            "summary": "Lost bike near 7:30 & Esplanade",
            "report_entries": [
                entry(
                    "Hubcap",
                    "Participant reports a blue cruiser missing since last night.",
                    "2024-08-28T21:04:11Z",
                    false,
                ),
                entry("Hubcap", "Changed summary", "2024-08-28T21:05:02Z", true),
                entry(
                    "Bucket",
                    "Bike located at the Center Camp racks, owner notified.",
                    "2024-08-29T09:40:37Z",
                    false,
                ),
            ],
        })),
    );
    reports.insert(
        2,
        report(json!({
            "number": 2,
            "created": "2024-08-30T02:17:55Z",
            "summary": "Noise complaint, 4:00 & G",
            "report_entries": [entry(
                "Tool",
                "Sound camp asked to turn it down until sunrise.",
                "2024-08-30T02:17:55Z",
                false,
            )],
        })),
    );
    reports
}
