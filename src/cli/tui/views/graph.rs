//! Graph view: dependency tree coloured by status

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::frame_layout;
use crate::cli::query::render_tree;
use crate::cli::tui::app::App;
use crate::cli::tui::utils::status_color;
use crate::domain::FeatureStatus;

pub fn draw(frame: &mut Frame, app: &App) {
    let body = frame_layout(frame, app);

    let text = if app.computed().is_empty() {
        Text::from("No features.")
    } else {
        let tree = render_tree(app.computed(), app.graph());
        Text::from(tree.lines().map(color_line).collect::<Vec<_>>())
    };

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .title("Dependency Graph (dependents below their dependencies)")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, body);
}

/// Colours the status indicator of one tree line
fn color_line(line: &str) -> Line<'static> {
    let status = [
        FeatureStatus::Active,
        FeatureStatus::DisabledManual,
        FeatureStatus::DisabledDependency,
    ]
    .into_iter()
    .find_map(|s| line.find(s.indicator()).map(|at| (s, at)));

    match status {
        Some((status, at)) => {
            let end = at + status.indicator().len();
            Line::from(vec![
                Span::raw(line[..at].to_string()),
                Span::styled(
                    line[at..end].to_string(),
                    Style::default().fg(status_color(status)),
                ),
                Span::raw(line[end..].to_string()),
            ])
        }
        None => Line::from(line.to_string()),
    }
}
