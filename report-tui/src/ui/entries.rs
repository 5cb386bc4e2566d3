use incident_report::ReportEntry;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use super::utils::display_timestamp;

/// Lines for the entry list: a byline per entry followed by its text.
pub fn entry_lines(entries: &[ReportEntry]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for entry in entries {
        let created = entry
            .created
            .as_deref()
            .map(display_timestamp)
            .unwrap_or_else(|| "(unknown time)".to_string());
        let author = entry.author.clone().unwrap_or_else(|| "(unknown)".to_string());

        lines.push(Line::from(vec![
            Span::styled(created, Style::default().fg(Color::DarkGray)),
            Span::raw("  "),
            Span::styled(author, Style::default().fg(Color::Cyan)),
        ]));

        let text_style = if entry.system_entry {
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC)
        } else {
            Style::default().fg(Color::White)
        };
        for text_line in entry.text.lines() {
            lines.push(Line::from(Span::styled(text_line.to_string(), text_style)));
        }
        lines.push(Line::from(""));
    }

    lines
}
