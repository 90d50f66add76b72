//! Dashboard views and the chrome they share

pub mod cards;
pub mod graph;

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use super::app::{App, InputMode};
use super::utils::status_color;
use super::ViewMode;
use crate::domain::FeatureStatus;

/// Splits the screen into header, body and status bar; returns the body
pub fn frame_layout(frame: &mut Frame, app: &App) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(5),    // Body
            Constraint::Length(3), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_status_bar(frame, app, chunks[2]);
    chunks[1]
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let summary = app.summary();
    let history = app.history();

    let count = |label: &str, n: usize, status: Option<FeatureStatus>| {
        let style = status.map_or(Style::default(), |s| Style::default().fg(status_color(s)));
        vec![
            Span::styled(format!("{} ", n), style.add_modifier(Modifier::BOLD)),
            Span::raw(format!("{}   ", label)),
        ]
    };

    let mut spans = Vec::new();
    spans.extend(count("active", summary.active, Some(FeatureStatus::Active)));
    spans.extend(count("manual", summary.manual, Some(FeatureStatus::DisabledManual)));
    spans.extend(count("blocked", summary.blocked, Some(FeatureStatus::DisabledDependency)));
    spans.extend(count("total", summary.total, None));
    spans.push(Span::styled(
        format!("snapshot {}/{}", history.cursor() + 1, history.len()),
        Style::default().fg(Color::DarkGray),
    ));

    let paragraph = Paragraph::new(Line::from(spans))
        .block(Block::default().title("flagdeck").borders(Borders::ALL));

    frame.render_widget(paragraph, area);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let view = match app.view_mode() {
        ViewMode::Cards => "[1:Cards]",
        ViewMode::Graph => "[2:Graph]",
    };

    let (content, style) = match app.input_mode() {
        InputMode::Search(query) => (
            format!("/{}  (Enter to keep, Esc to clear)", query),
            Style::default().fg(Color::Yellow),
        ),
        InputMode::Normal => {
            let msg = app
                .status_message()
                .unwrap_or("space:toggle u:undo r:redo /:search ?:help q:quit");
            let filter = if app.filter().is_empty() {
                String::new()
            } else {
                format!("  filter: {}", app.filter())
            };
            (format!("{}{}", msg, filter), Style::default())
        }
    };

    let paragraph = Paragraph::new(format!("{} {}", view, content))
        .style(style)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(paragraph, area);
}
