//! The sortable record table.
//!
//! A [`RecordTable`] owns one [`Row`] per input record plus a header cell per
//! [`Field`].  Sorting permutes the existing rows in place; rows are never
//! rebuilt, so a [`RowId`] keeps pointing at the same record across sorts.
//! The active sort is visible only through the header markers.

use super::collate;
use super::record::{Field, Record, SortDirection};
use crate::error::TableError;

// ───────────────────────────────────────── rows ──────────────

/// Stable row identity — the record's position in the input list.
pub type RowId = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: RowId,
    pub record: Record,
}

impl Row {
    /// Display text of one cell.
    pub fn cell_text(&self, field: Field) -> String {
        let r = &self.record;
        match field {
            Field::Id => format!("#{}", r.id),
            Field::Title => r.title.clone(),
            Field::Year => format!("({})", r.year),
            Field::Imdb => format!("imdb: {:.2}", r.imdb),
        }
    }

    /// Raw value of one field, as stored in the row's `data-*` tags.
    pub fn data_value(&self, field: Field) -> String {
        let r = &self.record;
        match field {
            Field::Id => r.id.to_string(),
            Field::Title => r.title.clone(),
            Field::Year => r.year.to_string(),
            Field::Imdb => r.imdb.to_string(),
        }
    }
}

// ───────────────────────────────────────── header ────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMarker {
    Up,
    Down,
}

impl SortMarker {
    pub fn class_name(self) -> &'static str {
        match self {
            SortMarker::Up => "sorted-up",
            SortMarker::Down => "sorted-down",
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortMarker::Up => "▲",
            SortMarker::Down => "▼",
        }
    }

    pub fn direction(self) -> SortDirection {
        match self {
            SortMarker::Up => SortDirection::Ascending,
            SortMarker::Down => SortDirection::Descending,
        }
    }
}

impl From<SortDirection> for SortMarker {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Ascending => SortMarker::Up,
            SortDirection::Descending => SortMarker::Down,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub field: Field,
    pub marker: Option<SortMarker>,
}

// ───────────────────────────────────────── table ─────────────

#[derive(Debug, Clone)]
pub struct RecordTable {
    header: Vec<HeaderCell>,
    rows: Vec<Row>,
}

impl RecordTable {
    /// Build the header plus one row per record, in input order.
    pub fn new(records: Vec<Record>) -> Self {
        let header = Field::ALL
            .into_iter()
            .map(|field| HeaderCell { field, marker: None })
            .collect();
        let rows = records
            .into_iter()
            .enumerate()
            .map(|(id, record)| Row { id, record })
            .collect();
        Self { header, rows }
    }

    pub fn from_json(json: &str) -> Result<Self, TableError> {
        Ok(Self::new(super::record::parse_records(json)?))
    }

    pub fn header(&self) -> &[HeaderCell] {
        &self.header
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn sort_ascending(&mut self, field: Field) {
        self.reorder(field, SortDirection::Ascending);
    }

    pub fn sort_descending(&mut self, field: Field) {
        self.reorder(field, SortDirection::Descending);
    }

    /// Stable in-place sort: rows with equal keys keep their relative order
    /// in either direction.
    fn reorder(&mut self, field: Field, direction: SortDirection) {
        self.clear_sort_markers();

        match direction {
            SortDirection::Ascending => self
                .rows
                .sort_by(|a, b| collate::compare_by(field, &a.record, &b.record)),
            SortDirection::Descending => self
                .rows
                .sort_by(|a, b| collate::compare_by(field, &b.record, &a.record)),
        }

        for cell in self.header.iter_mut().filter(|c| c.field == field) {
            cell.marker = Some(direction.into());
        }
        tracing::debug!(%field, ?direction, rows = self.rows.len(), "sorted table");
    }

    pub fn clear_sort_markers(&mut self) {
        for cell in &mut self.header {
            cell.marker = None;
        }
    }

    /// The marked column and its direction, if any sort has been applied
    /// since the markers were last cleared.
    pub fn active_sort(&self) -> Option<(Field, SortDirection)> {
        self.header
            .iter()
            .find_map(|cell| cell.marker.map(|m| (cell.field, m.direction())))
    }
}
