//! Page shell served at `/`

use anyhow::{Context, Result};
use serde::Serialize;
use tera::Tera;

use crate::export::ExportFormat;

const PAGE_TEMPLATE: &str = include_str!("../../templates/index.html");

#[derive(Serialize)]
struct ExportButton {
    tag: &'static str,
    label: &'static str,
    color: &'static str,
}

fn button_color(format: ExportFormat) -> &'static str {
    match format {
        ExportFormat::Csv => "#FF9800",
        ExportFormat::Spreadsheet => "#2E7D32",
        ExportFormat::Columnar => "#7B1FA2",
    }
}

/// Render the single-page UI
pub fn render_page() -> Result<String> {
    let buttons: Vec<ExportButton> = ExportFormat::ALL
        .iter()
        .map(|&format| ExportButton {
            tag: format.tag(),
            label: format.label(),
            color: button_color(format),
        })
        .collect();

    let mut context = tera::Context::new();
    context.insert("title", "Excel Data Viewer");
    context.insert("buttons", &buttons);

    Tera::one_off(PAGE_TEMPLATE, &context, false).context("Failed to render page template")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_has_controls() {
        let page = render_page().unwrap();
        assert!(page.contains("<title>Excel Data Viewer</title>"));
        assert!(page.contains("id=\"sync-button\""));
        assert!(page.contains("id=\"data-container\""));
        assert!(page.contains("id=\"compatibility-warning\""));
        for format in ExportFormat::ALL {
            assert!(page.contains(&format!("id=\"export-{}\"", format.tag())));
            assert!(page.contains(&format!("exportData('{}')", format.tag())));
        }
        assert_eq!(page.matches("class=\"export-button\"").count(), 3);
    }
}
