use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Span;

use crate::models::group_thousands;
use crate::stats::Statistics;

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

/// Summary strip shown above the catalog, as `(label, value)` pairs.
pub(crate) fn statistics_pairs(stats: &Statistics) -> [(&'static str, String); 6] {
    [
        ("Books", group_thousands(stats.total as u64)),
        ("Pages", group_thousands(stats.pages)),
        ("Authors", group_thousands(stats.authors as u64)),
        ("Read", group_thousands(stats.read as u64)),
        ("Unread", group_thousands(stats.unread as u64)),
        ("Trash", group_thousands(stats.trash as u64)),
    ]
}

/// `[key] description` hint spans for the footer.
pub(crate) fn key_hint(key: &str, text: &str, key_style: Style) -> [Span<'static>; 2] {
    [
        Span::styled(format!("[{key}]"), key_style),
        Span::raw(format!(" {text}   ")),
    ]
}

/// Checkbox marker for multi-select rows.
pub(crate) fn mark(selected: bool) -> &'static str {
    if selected {
        "[x]"
    } else {
        "[ ]"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Context};

    #[test]
    fn surface_error_prefers_root_cause() {
        let err = Err::<(), _>(anyhow!("quota exceeded"))
            .context("failed to save")
            .unwrap_err();
        assert_eq!(surface_error(&err), "quota exceeded");
    }

    #[test]
    fn statistics_are_grouped() {
        let stats = Statistics {
            total: 3,
            pages: 12_345,
            authors: 2,
            read: 1,
            unread: 2,
            trash: 0,
        };
        let pairs = statistics_pairs(&stats);
        assert_eq!(pairs[1], ("Pages", "12,345".to_string()));
    }

    #[test]
    fn centered_rect_stays_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered_rect(60, 50, area);
        assert_eq!(popup.width, 60);
        assert_eq!(popup.height, 20);
        assert!(popup.x >= area.x && popup.right() <= area.right());
    }
}
