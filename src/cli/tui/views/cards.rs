//! Cards view: feature list with a detail pane

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use super::frame_layout;
use crate::cli::tui::app::App;
use crate::cli::tui::utils::{status_color, truncate_str};
use crate::domain::ComputedFeature;

pub fn draw(frame: &mut Frame, app: &App) {
    let body = frame_layout(frame, app);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(body);

    draw_list(frame, app, chunks[0]);
    draw_details(frame, app, chunks[1]);
}

fn draw_list(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .visible_features()
        .map(|c| {
            let line = Line::from(vec![
                Span::styled(
                    format!("{} ", c.status.indicator()),
                    Style::default().fg(status_color(c.status)),
                ),
                Span::raw(truncate_str(c.display_name(), 32)),
            ]);
            ListItem::new(line)
        })
        .collect();

    let title = if items.is_empty() {
        "Features (none)".to_string()
    } else {
        format!("Features ({})", items.len())
    };

    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(app.selected_feature().map(|_| app.selected_index()));

    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_details(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match app.selected_feature() {
        Some(feature) => detail_lines(app, feature),
        None => vec![Line::from("No feature selected.")],
    };

    let paragraph = Paragraph::new(lines)
        .block(Block::default().title("Details").borders(Borders::ALL))
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

fn detail_lines<'a>(app: &App, feature: &'a ComputedFeature) -> Vec<Line<'a>> {
    let label = |s: &'static str| Span::styled(format!("{:<12}", s), Style::default().fg(Color::DarkGray));

    let mut lines = vec![
        Line::from(Span::styled(
            feature.display_name(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![label("ID"), Span::raw(feature.id.as_str())]),
        Line::from(vec![
            label("Status"),
            Span::styled(
                feature.status.as_str(),
                Style::default().fg(status_color(feature.status)),
            ),
        ]),
        Line::from(vec![label("Preview"), Span::raw(feature.availability().to_string())]),
    ];

    if !feature.version.is_empty() {
        lines.push(Line::from(vec![label("Version"), Span::raw(feature.version.as_str())]));
    }
    if !feature.requires().is_empty() {
        lines.push(Line::from(vec![
            label("Requires"),
            Span::raw(feature.requires().join(", ")),
        ]));
    }

    let dependents = app.graph().dependents(feature.id.as_str());
    if !dependents.is_empty() {
        let names: Vec<&str> = dependents.iter().map(|d| d.as_str()).collect();
        lines.push(Line::from(vec![label("Required by"), Span::raw(names.join(", "))]));
    }
    if let Some(fallback) = &feature.fallback {
        lines.push(Line::from(vec![label("Fallback"), Span::raw(fallback.as_str())]));
    }

    if !feature.description.is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(feature.description.as_str()));
    }

    if !feature.backend.routes.is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled("Routes", Style::default().fg(Color::DarkGray))));
        for route in &feature.backend.routes {
            lines.push(Line::from(format!("  {:<7} {}", route.method, route.path)));
        }
    }

    if !feature.health.endpoint.is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(vec![
            label("Health"),
            Span::raw(feature.health.endpoint.as_str()),
        ]));
    }

    lines
}
