//! Shared helpers for dashboard views

use ratatui::style::Color;

use crate::domain::FeatureStatus;

/// Node colour per status, matching the DOT export
pub fn status_color(status: FeatureStatus) -> Color {
    match status {
        FeatureStatus::Active => Color::Rgb(0x22, 0xd3, 0xee),
        FeatureStatus::DisabledManual => Color::Rgb(0xf8, 0x71, 0x71),
        FeatureStatus::DisabledDependency => Color::Rgb(0xfb, 0x92, 0x3c),
    }
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncate_at = max_len.saturating_sub(3);
        let truncated: String = s.chars().take(truncate_at).collect();
        format!("{}...", truncated)
    }
}
