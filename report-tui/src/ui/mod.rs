use crate::app::{App, InputTarget};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap},
    Frame,
};

mod entries;
mod utils;

pub fn render(frame: &mut Frame, app: &App) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // header
            Constraint::Min(0),    // entries
            Constraint::Length(3), // input
            Constraint::Length(1), // controls
        ])
        .split(frame.area());

    render_header(frame, app, root[0]);
    render_entries(frame, app, root[1]);
    render_input(frame, app, root[2]);
    render_controls(frame, app, root[3]);

    if let Some(message) = app.view().current_alert() {
        render_alert(frame, message);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let report = app.page.report();

    let title = match report.and_then(|r| r.number()) {
        Some(number) => format!(" Incident Report #{} ", number),
        None if report.is_some() => " New Incident Report ".to_string(),
        None => " Incident Report ".to_string(),
    };
    let created = report
        .and_then(|r| r.created())
        .map(utils::display_timestamp)
        .unwrap_or_else(|| "(not yet created)".to_string());
    let summary = report
        .and_then(|r| r.summary())
        .unwrap_or("(no summary)")
        .to_string();

    let lines = vec![
        Line::from(vec![
            Span::styled("Created: ", Style::default().fg(Color::DarkGray)),
            Span::raw(created),
        ]),
        Line::from(vec![
            Span::styled("Summary: ", Style::default().fg(Color::DarkGray)),
            Span::styled(summary, Style::default().add_modifier(Modifier::BOLD)),
        ]),
    ];

    let header = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(header, area);
}

fn render_entries(frame: &mut Frame, app: &App, area: Rect) {
    let lines = entries::entry_lines(&app.view().entries);
    let title = format!(" Entries ({}) ", app.view().entries.len());

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((app.entry_scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(paragraph, area);
}

fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.input_target {
        InputTarget::Entry => " New Entry ",
        InputTarget::Summary => " Summary ",
    };

    let (text, style) = if app.view().accepts_input() {
        let (before, after) = app.input.split_at_cursor();
        (
            format!("{}█{}", before, after),
            Style::default().fg(Color::Yellow),
        )
    } else if app.view().editing_enabled || app.view().input_bound {
        (
            "Editing disabled".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        ("Loading…".to_string(), Style::default().fg(Color::DarkGray))
    };

    let input = Paragraph::new(text).style(style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(input, area);
}

fn render_controls(frame: &mut Frame, app: &App, area: Rect) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
    let mut spans = vec![
        key("Enter"),
        Span::raw(": Submit  "),
        key("Tab"),
        Span::raw(": Entry/Summary  "),
        key("↑↓"),
        Span::raw(": Scroll  "),
        key("Ctrl-r"),
        Span::raw(": Reload  "),
        key("Esc"),
        Span::raw(": Clear  "),
        key("q/Ctrl-c"),
        Span::raw(": Quit"),
    ];
    if let Some(status) = &app.status {
        spans.push(Span::styled(
            format!("   {}", status),
            Style::default().fg(Color::Green),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_alert(frame: &mut Frame, message: &str) {
    let area = utils::centered_rect(64, 10, frame.area());
    frame.render_widget(Clear, area);

    let mut lines: Vec<Line> = message
        .lines()
        .map(|line| Line::from(Span::styled(line.to_string(), Style::default().fg(Color::White))))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::raw("/"),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::raw(": Dismiss"),
    ]));

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(Span::styled(" Alert ", Style::default().fg(Color::Red)))
                .padding(Padding::horizontal(2)),
        )
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}
