//! Custom Ratatui widget that renders a [`RecordTable`] as aligned columns
//! with a header row showing the active sort marker.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, StatefulWidget, Widget},
};

use crate::core::record::Field;
use crate::core::table::{HeaderCell, RecordTable};

use super::theme::Theme;

const COLUMN_GAP: &str = "  ";

// ───────────────────────────────────────── state ─────────────

/// Persistent state for the table widget (selected row, scroll offset).
#[derive(Debug, Default)]
pub struct TableWidgetState {
    /// Index into the current row order that is highlighted.
    pub selected: usize,
    /// First visible row.
    pub offset: usize,
}

impl TableWidgetState {
    pub fn select_next(&mut self, max: usize) {
        if max > 0 && self.selected < max - 1 {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Keep the selected row inside a viewport of `height` rows.
    pub fn clamp_scroll(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + height {
            self.offset = self.selected - height + 1;
        }
    }
}

// ───────────────────────────────────────── widget ────────────

/// The table widget itself — created fresh each frame.
pub struct RecordTableWidget<'a> {
    table: &'a RecordTable,
    block: Option<Block<'a>>,
}

impl<'a> RecordTableWidget<'a> {
    pub fn new(table: &'a RecordTable) -> Self {
        Self { table, block: None }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Display width of each column: the widest of header label (with its
    /// marker) and every cell.
    pub fn column_widths(&self) -> [usize; 4] {
        let mut widths = [0; 4];
        for cell in self.table.header() {
            // Reserve room for the arrow so columns don't jump while sorting.
            widths[cell.field.index()] = text_width(cell.field.name()) + 2;
        }
        for row in self.table.rows() {
            for field in Field::ALL {
                let w = text_width(&row.cell_text(field));
                widths[field.index()] = widths[field.index()].max(w);
            }
        }
        widths
    }
}

fn text_width(s: &str) -> usize {
    Span::raw(s).width()
}

fn header_label(cell: &HeaderCell) -> String {
    match cell.marker {
        Some(marker) => format!("{} {}", cell.field.name(), marker.arrow()),
        None => cell.field.name().to_string(),
    }
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text_width(text));
    format!("{text}{}", " ".repeat(fill))
}

impl<'a> StatefulWidget for RecordTableWidget<'a> {
    type State = TableWidgetState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let inner = if let Some(ref block) = self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };
        if inner.height == 0 {
            return;
        }

        let widths = self.column_widths();
        let line_width = inner.width;

        // ── header ─────────────────────────────────────────────
        let mut spans = Vec::new();
        for cell in self.table.header() {
            let style = if cell.marker.is_some() {
                Theme::sorted_header_style()
            } else {
                Theme::header_style()
            };
            spans.push(Span::styled(
                pad(&header_label(cell), widths[cell.field.index()]),
                style,
            ));
            spans.push(Span::raw(COLUMN_GAP));
        }
        buf.set_line(inner.x, inner.y, &Line::from(spans), line_width);

        // ── rows ───────────────────────────────────────────────
        let body_height = (inner.height - 1) as usize;
        let rows = self.table.rows();
        if !rows.is_empty() && state.selected >= rows.len() {
            state.selected = rows.len() - 1;
        }
        state.clamp_scroll(body_height);

        let visible = rows.iter().enumerate().skip(state.offset).take(body_height);
        for (i, (row_idx, row)) in visible.enumerate() {
            let y = inner.y + 1 + i as u16;
            let is_selected = row_idx == state.selected;

            let mut spans = Vec::new();
            for field in Field::ALL {
                let style = if is_selected {
                    Theme::selected_style()
                } else if field == Field::Imdb {
                    Theme::rating_style()
                } else {
                    Theme::cell_style()
                };
                spans.push(Span::styled(
                    pad(&row.cell_text(field), widths[field.index()]),
                    style,
                ));
                let gap_style = if is_selected { Theme::selected_style() } else { Theme::cell_style() };
                spans.push(Span::styled(COLUMN_GAP, gap_style));
            }
            buf.set_line(inner.x, y, &Line::from(spans), line_width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::Record;

    fn table() -> RecordTable {
        RecordTable::new(vec![
            Record::new(1, "B", 2000, 5.0),
            Record::new(2, "A", 1999, 9.5),
            Record::new(3, "Ёлка", 2010, 6.4),
        ])
    }

    fn render(table: &RecordTable, state: &mut TableWidgetState, width: u16, height: u16) -> Vec<String> {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        RecordTableWidget::new(table).render(area, &mut buf, state);
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn renders_header_and_formatted_rows() {
        let mut state = TableWidgetState::default();
        let lines = render(&table(), &mut state, 50, 5);
        assert!(lines[0].starts_with("id"));
        for label in ["title", "year", "imdb"] {
            assert!(lines[0].contains(label), "{:?}", lines[0]);
        }
        assert!(lines[1].starts_with("#1"));
        assert!(lines[1].contains("(2000)"));
        assert!(lines[2].contains("imdb: 9.50"));
        assert!(lines[3].contains("Ёлка"));
    }

    #[test]
    fn sorted_column_shows_arrow() {
        let mut t = table();
        t.sort_descending(Field::Year);
        let mut state = TableWidgetState::default();
        let lines = render(&t, &mut state, 50, 5);
        assert!(lines[0].contains("year ▼"));
        assert!(!lines[0].contains('▲'));
        assert!(lines[1].starts_with("#3"));

        t.clear_sort_markers();
        let lines = render(&t, &mut state, 50, 5);
        assert!(!lines[0].contains('▼'));
    }

    #[test]
    fn scrolls_to_keep_selection_visible() {
        let mut state = TableWidgetState { selected: 2, offset: 0 };
        // Header plus two body lines.
        let lines = render(&table(), &mut state, 50, 3);
        assert_eq!(state.offset, 1);
        assert!(lines[1].starts_with("#2"));
        assert!(lines[2].starts_with("#3"));
    }

    #[test]
    fn selection_is_clamped_to_row_count() {
        let mut state = TableWidgetState { selected: 10, offset: 0 };
        render(&table(), &mut state, 50, 5);
        assert_eq!(state.selected, 2);
    }

    #[test]
    fn column_widths_reserve_marker_space() {
        let t = table();
        let widths = RecordTableWidget::new(&t).column_widths();
        assert_eq!(widths[Field::Id.index()], 4); // "id ▲"
        assert_eq!(widths[Field::Imdb.index()], 10); // "imdb: 9.50"
    }
}
