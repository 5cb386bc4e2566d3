use incident_report::{PageSettings, ReportPage};

use crate::backend::Backend;
use crate::terminal_view::TerminalView;
use crate::text_input::TextInput;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputTarget {
    Entry,
    Summary,
}

pub struct App {
    pub page: ReportPage<Backend, TerminalView>,
    pub input: TextInput,
    pub input_target: InputTarget,
    pub entry_scroll: u16,
    pub status: Option<String>,
    pub running: bool,
}

impl App {
    pub fn new(backend: Backend, settings: PageSettings) -> Self {
        Self {
            page: ReportPage::new(backend, TerminalView::new(), settings),
            input: TextInput::new(),
            input_target: InputTarget::Entry,
            entry_scroll: 0,
            status: None,
            running: true,
        }
    }

    pub fn view(&self) -> &TerminalView {
        self.page.view()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Switch between writing a new entry and editing the summary. The
    /// summary input starts out with the current summary.
    pub fn toggle_input_target(&mut self) {
        self.input_target = match self.input_target {
            InputTarget::Entry => {
                let summary = self.page.report().and_then(|report| report.summary());
                self.input.replace(summary.unwrap_or_default());
                InputTarget::Summary
            }
            InputTarget::Summary => {
                self.input.clear();
                InputTarget::Entry
            }
        };
    }

    pub fn scroll_entries_up(&mut self) {
        self.entry_scroll = self.entry_scroll.saturating_sub(1);
    }

    pub fn scroll_entries_down(&mut self) {
        self.entry_scroll = self.entry_scroll.saturating_add(1);
    }
}
