use std::fmt;

/// Base URL of the incident reports collection, e.g.
/// `https://ims.example.com/ims/api/incident_reports`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportsURL(String);

impl AsRef<str> for ReportsURL {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReportsURL {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl ReportsURL {
    pub fn new(base: impl AsRef<str>) -> Self {
        Self(base.as_ref().trim_end_matches('/').to_string())
    }

    /// Where new reports are posted.
    pub fn collection(&self) -> String {
        format!("{}/", self.0)
    }

    pub fn report(&self, number: i64) -> String {
        format!("{}/{}", self.0, number)
    }
}
