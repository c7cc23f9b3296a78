//! HTML rendering of a [`RecordTable`].
//!
//! Produces a standalone `<table>` fragment; where it is mounted is up to the
//! caller.  Values go through askama's HTML escaper.

use askama::Template;

use super::record::Field;
use super::table::RecordTable;
use crate::error::TableError;

struct HeaderView {
    class: String,
    label: &'static str,
}

struct RowView {
    data: Vec<(&'static str, String)>,
    cells: Vec<(&'static str, String)>,
}

#[derive(Template)]
#[template(
    ext = "html",
    source = r#"<table class="table">
  <tr class="rowTitle">
{%- for th in header %}
    <th class="{{ th.class }}">{{ th.label }}</th>
{%- endfor %}
  </tr>
{%- for row in rows %}
  <tr class="rowItem"{% for (name, value) in row.data %} data-{{ name }}="{{ value }}"{% endfor %}>
{%- for (name, text) in row.cells %}
    <td class="{{ name }}">{{ text }}</td>
{%- endfor %}
  </tr>
{%- endfor %}
</table>
"#
)]
struct TableTemplate {
    header: Vec<HeaderView>,
    rows: Vec<RowView>,
}

/// Render the table in its current order with its current sort markers.
pub fn render_html(table: &RecordTable) -> Result<String, TableError> {
    let header = table
        .header()
        .iter()
        .map(|cell| HeaderView {
            class: match cell.marker {
                Some(marker) => format!("{} {}", cell.field.name(), marker.class_name()),
                None => cell.field.name().to_string(),
            },
            label: cell.field.name(),
        })
        .collect();

    let rows = table
        .rows()
        .iter()
        .map(|row| RowView {
            data: Field::ALL
                .into_iter()
                .map(|field| (field.name(), row.data_value(field)))
                .collect(),
            cells: Field::ALL
                .into_iter()
                .map(|field| (field.name(), row.cell_text(field)))
                .collect(),
        })
        .collect();

    let html = TableTemplate { header, rows }.render()?;
    tracing::debug!(rows = table.len(), bytes = html.len(), "rendered html");
    Ok(html)
}
