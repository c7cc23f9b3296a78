//! Layout helpers — split the terminal area into regions.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Primary screen layout with the table pane and a bottom status bar.
pub struct AppLayout {
    pub table_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    pub fn from_area(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // table pane
                Constraint::Length(1), // status bar
            ])
            .split(area);

        Self {
            table_area: chunks[0],
            status_area: chunks[1],
        }
    }
}

/// Centered rectangle with fixed dimensions, clamped to the available area.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}
