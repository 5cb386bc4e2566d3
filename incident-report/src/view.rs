use crate::model::ReportEntry;

/// The surface an incident report is shown on.
///
/// The page calls into the view; the view never calls back into the page.
/// Input handling is left to the host, which forwards submissions to
/// [`ReportPage::submit_report_entry`](crate::ReportPage::submit_report_entry).
pub trait ReportView {
    fn disable_editing(&mut self);

    fn enable_editing(&mut self);

    /// Replace whatever entries are currently shown.
    fn draw_report_entries(&mut self, entries: &[ReportEntry]);

    /// Start routing the new-entry input to the page. Called once.
    fn bind_entry_input(&mut self);

    /// Show a message the user has to acknowledge.
    fn alert(&mut self, message: &str);
}
