use incident_report::{ReportEntry, ReportView};
use std::collections::VecDeque;
use tracing::debug;

/// What the terminal shows of a report, as told by the report page.
#[derive(Debug, Default)]
pub struct TerminalView {
    pub editing_enabled: bool,
    pub entries: Vec<ReportEntry>,
    pub input_bound: bool,
    alerts: VecDeque<String>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    /// The alert blocking the page, if any. Older alerts are shown first.
    pub fn current_alert(&self) -> Option<&str> {
        self.alerts.front().map(String::as_str)
    }

    pub fn dismiss_alert(&mut self) {
        self.alerts.pop_front();
    }

    pub fn accepts_input(&self) -> bool {
        self.input_bound && self.editing_enabled && self.alerts.is_empty()
    }
}

impl ReportView for TerminalView {
    fn disable_editing(&mut self) {
        self.editing_enabled = false;
    }

    fn enable_editing(&mut self) {
        self.editing_enabled = true;
    }

    fn draw_report_entries(&mut self, entries: &[ReportEntry]) {
        debug!("Showing {} report entries", entries.len());
        self.entries = entries.to_vec();
    }

    fn bind_entry_input(&mut self) {
        self.input_bound = true;
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push_back(message.to_string());
    }
}
