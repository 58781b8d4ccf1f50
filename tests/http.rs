use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use tower::ServiceExt;

use sheetview::parser::{Parser, ParquetParser};
use sheetview::server::{router, AppState, LoadResponse};
use sheetview::Config;

fn app() -> Router {
    let state = AppState::new(Config::default()).unwrap();
    router(Arc::new(state))
}

fn workbook(rows: &[&[Option<&str>]]) -> Vec<u8> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let Some(value) = cell else { continue };
            match value.parse::<f64>() {
                Ok(n) => sheet.write_number(r as u32, c as u16, n).unwrap(),
                Err(_) => sheet.write_string(r as u32, c as u16, *value).unwrap(),
            };
        }
    }
    workbook.save_to_buffer().unwrap()
}

fn sample_workbook() -> Vec<u8> {
    workbook(&[
        &[Some("name"), Some("qty")],
        &[Some("apple"), Some("1")],
        &[Some("pear"), Some("2")],
        &[Some("plum"), Some("3")],
    ])
}

async fn post(app: &Router, uri: &str, body: String) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn upload(app: &Router, bytes: &[u8], file_name: &str) -> Value {
    let body = json!({ "file_data": STANDARD.encode(bytes), "file_name": file_name });
    let response = post(app, "/load_excel", body.to_string()).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

async fn export(app: &Router, format: &str) -> Response {
    post(app, "/export_data", json!({ "format": format }).to_string()).await
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn header_value<'a>(response: &'a Response, name: header::HeaderName) -> &'a str {
    response.headers().get(name).unwrap().to_str().unwrap()
}

#[tokio::test]
async fn test_index_serves_page() {
    let app = app();
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(header_value(&response, header::CONTENT_TYPE).starts_with("text/html"));
    let page = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(page.contains("<title>Excel Data Viewer</title>"));
    assert!(page.contains("exportData('parquet')"));
}

#[tokio::test]
async fn test_upload_reports_shape() {
    let app = app();
    let result = upload(&app, &sample_workbook(), "a.xlsx").await;

    let loaded: LoadResponse = serde_json::from_value(result).unwrap();
    assert!(loaded.success);
    assert_eq!(loaded.rows, 3);
    assert_eq!(loaded.columns, 2);
    assert_eq!(loaded.html.matches("<th ").count(), 2);
    assert_eq!(loaded.html.matches("<tr>").count(), 3);
    assert!(loaded.html.contains(">pear</td>"));
}

#[tokio::test]
async fn test_export_parquet_attachment() {
    let app = app();
    upload(&app, &sample_workbook(), "a.xlsx").await;

    let response = export(&app, "parquet").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_value(&response, header::CONTENT_TYPE),
        "application/octet-stream"
    );
    assert_eq!(
        header_value(&response, header::CONTENT_DISPOSITION),
        "attachment; filename=\"a_exported.parquet\""
    );

    let bytes = body_bytes(response).await;
    assert!(bytes.starts_with(b"PAR1"));
    let table = ParquetParser.parse_bytes(&bytes).unwrap();
    assert_eq!(table.row_count(), 3);
    assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["name", "qty"]);
}

#[tokio::test]
async fn test_export_excel_attachment() {
    let app = app();
    upload(&app, &sample_workbook(), "report.xls.xlsx").await;

    let response = export(&app, "excel").await;
    assert_eq!(
        header_value(&response, header::CONTENT_TYPE),
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert_eq!(
        header_value(&response, header::CONTENT_DISPOSITION),
        "attachment; filename=\"report.xls_exported.xlsx\""
    );
    assert!(body_bytes(response).await.starts_with(b"PK"));
}

#[tokio::test]
async fn test_control_characters_in_file_name() {
    let app = app();
    let result = upload(&app, &sample_workbook(), "a\u{1}b\u{7f}.xlsx").await;
    assert_eq!(result["success"], json!(true));

    let response = export(&app, "csv").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_value(&response, header::CONTENT_DISPOSITION),
        "attachment; filename=\"a_b__exported.csv\""
    );
    assert!(body_bytes(response).await.starts_with(b"name,qty\n"));
}

#[tokio::test]
async fn test_export_before_upload() {
    let app = app();
    let response = export(&app, "csv").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "No data loaded. Please load an Excel file first." })
    );
}

#[tokio::test]
async fn test_export_unknown_format() {
    let app = app();
    upload(&app, &sample_workbook(), "a.xlsx").await;

    let response = export(&app, "json").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Unsupported export format: json" })
    );
}

#[tokio::test]
async fn test_export_defaults_to_csv() {
    let app = app();
    upload(&app, &sample_workbook(), "a.xlsx").await;

    let response = post(&app, "/export_data", "{}".to_string()).await;
    assert_eq!(header_value(&response, header::CONTENT_TYPE), "text/csv");
    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert_eq!(text, "name,qty\napple,1\npear,2\nplum,3\n");
}

#[tokio::test]
async fn test_empty_workbook_shows_no_data() {
    let app = app();
    let result = upload(&app, &workbook(&[]), "empty.xlsx").await;

    assert_eq!(result["success"], json!(true));
    assert_eq!(result["rows"], json!(0));
    assert_eq!(result["html"], json!("<p>No data to display</p>"));
}

#[tokio::test]
async fn test_missing_cells_render_empty() {
    let app = app();
    let bytes = workbook(&[
        &[Some("a"), Some("b")],
        &[Some("x"), None],
        &[Some("y"), Some("z")],
    ]);
    let result = upload(&app, &bytes, "gaps.xlsx").await;

    let html = result["html"].as_str().unwrap();
    assert!(html.contains("<td style=\"border: 1px solid #ddd; padding: 8px;\"></td>"));
    assert!(!html.contains("None"));
}

#[tokio::test]
async fn test_exported_csv_loads_back() {
    let app = app();
    upload(&app, &sample_workbook(), "a.xlsx").await;
    let csv = body_bytes(export(&app, "csv").await).await;

    let result = upload(&app, &csv, "a_exported.csv").await;
    assert_eq!(result["rows"], json!(3));
    assert_eq!(result["columns"], json!(2));

    // The session now names the CSV, so the next export follows it
    let response = export(&app, "xlsx").await;
    assert_eq!(
        header_value(&response, header::CONTENT_DISPOSITION),
        "attachment; filename=\"a_exported_exported.xlsx\""
    );
}

#[tokio::test]
async fn test_undecodable_upload_reports_both_errors() {
    let app = app();
    let result = upload(&app, b"definitely not a workbook", "bad.xlsx").await;

    let error = result["error"].as_str().unwrap();
    assert!(error.starts_with("Error reading Excel file: "));
    assert!(error.contains(" | Fallback error: "));
    assert!(result.get("success").is_none());
}

#[tokio::test]
async fn test_failed_upload_keeps_previous_table() {
    let app = app();
    upload(&app, &sample_workbook(), "a.xlsx").await;
    upload(&app, b"garbage", "b.xlsx").await;

    let response = export(&app, "csv").await;
    assert_eq!(
        header_value(&response, header::CONTENT_DISPOSITION),
        "attachment; filename=\"a_exported.csv\""
    );
}

#[tokio::test]
async fn test_missing_fields() {
    let app = app();
    let response = post(&app, "/load_excel", json!({ "file_name": "a.xlsx" }).to_string()).await;
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Missing file data or filename" })
    );

    let response = post(&app, "/load_excel", json!({ "file_data": "", "file_name": "a.xlsx" }).to_string()).await;
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Missing file data or filename" })
    );
}

#[tokio::test]
async fn test_invalid_base64() {
    let app = app();
    let body = json!({ "file_data": "@@not base64@@", "file_name": "a.xlsx" });
    let result = body_json(post(&app, "/load_excel", body.to_string()).await).await;

    assert!(result["error"].as_str().unwrap().starts_with("Invalid file data: "));
}

#[tokio::test]
async fn test_malformed_body() {
    let app = app();
    let response = post(&app, "/load_excel", "{not json".to_string()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let result = body_json(response).await;
    assert!(result["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid request body: "));
}
