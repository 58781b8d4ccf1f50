//! HTML table output

use crate::model::Table;

/// Shown instead of a table when there are no rows
pub const NO_DATA_HTML: &str = "<p>No data to display</p>";

const TABLE_STYLE: &str = "border-collapse: collapse; width: 100%; max-width: 100%; overflow-x: auto;";
const HEADER_ROW_STYLE: &str = "background-color: #f2f2f2;";
const HEADER_CELL_STYLE: &str = "border: 1px solid #ddd; padding: 8px; text-align: left;";
const CELL_STYLE: &str = "border: 1px solid #ddd; padding: 8px;";

/// Render a table as an HTML fragment for the data container.
///
/// Column names and cell text are escaped; nulls become empty cells.
pub fn render_table(table: &Table) -> String {
    if table.is_empty() {
        return NO_DATA_HTML.to_string();
    }

    let mut html = String::with_capacity(64 * (table.row_count() + 1) * table.column_count().max(1));
    html.push_str(&format!("<table style=\"{}\">", TABLE_STYLE));

    // Header
    html.push_str("<thead>");
    html.push_str(&format!("<tr style=\"{}\">", HEADER_ROW_STYLE));
    for name in table.column_names() {
        html.push_str(&format!(
            "<th style=\"{}\">{}</th>",
            HEADER_CELL_STYLE,
            html_escape(name)
        ));
    }
    html.push_str("</tr></thead>");

    // Rows
    html.push_str("<tbody>");
    for row in &table.rows {
        html.push_str("<tr>");
        for cell in &row.cells {
            html.push_str(&format!(
                "<td style=\"{}\">{}</td>",
                CELL_STYLE,
                html_escape(cell.display())
            ));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");

    html
}

fn html_escape(s: impl AsRef<str>) -> String {
    s.as_ref()
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
