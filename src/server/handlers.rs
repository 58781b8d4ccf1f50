//! Request handlers for the page, upload and export endpoints

use std::sync::{Arc, PoisonError, RwLockReadGuard, RwLockWriteGuard};

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue},
    response::{Html, IntoResponse, Response},
    Json,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::export::{export_table, ExportFormat};
use crate::output::render_table;
use crate::parser::read_with_fallback;

use super::session::Session;
use super::SharedState;

/// Body of `POST /load_excel`
#[derive(Debug, Deserialize)]
pub struct LoadRequest {
    pub file_data: Option<String>,
    pub file_name: Option<String>,
}

/// Successful reply to `POST /load_excel`
#[derive(Debug, Serialize, Deserialize)]
pub struct LoadResponse {
    pub html: String,
    pub rows: usize,
    pub columns: usize,
    pub success: bool,
}

/// Body of `POST /export_data`
#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub format: Option<String>,
}

pub async fn index(State(state): State<SharedState>) -> Html<String> {
    Html(state.page.clone())
}

pub async fn load_excel(
    State(state): State<SharedState>,
    payload: Result<Json<LoadRequest>, JsonRejection>,
) -> Result<Json<LoadResponse>, AppError> {
    let Json(request) = payload.map_err(invalid_body)?;

    let (file_data, file_name) = match (request.file_data, request.file_name) {
        (Some(data), Some(name)) if !data.is_empty() && !name.is_empty() => (data, name),
        _ => {
            return Err(AppError::InvalidRequest(
                "Missing file data or filename".to_string(),
            ))
        }
    };

    let bytes = STANDARD
        .decode(file_data.trim())
        .map_err(|e| AppError::InvalidRequest(format!("Invalid file data: {}", e)))?;

    let size = bytes.len();
    let worker = Arc::clone(&state);
    let name = file_name.clone();
    let (table, html) = tokio::task::spawn_blocking(move || {
        let parser = worker.parsers.for_file_name(&name);
        let table = read_with_fallback(parser, &bytes, &name)?;
        let html = render_table(&table);
        Ok::<_, AppError>((table, html))
    })
    .await
    .map_err(|e| AppError::Worker(e.to_string()))??;

    let response = LoadResponse {
        html,
        rows: table.row_count(),
        columns: table.column_count(),
        success: true,
    };

    write_session(&state).replace(table, file_name.as_str());
    log::info!(
        "Loaded {} ({} rows, {} columns, {} bytes)",
        file_name,
        response.rows,
        response.columns,
        size
    );

    Ok(Json(response))
}

pub async fn export_data(
    State(state): State<SharedState>,
    payload: Result<Json<ExportRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload.map_err(invalid_body)?;

    let (table, source_name) = read_session(&state).current()?;

    let format: ExportFormat = request.format.as_deref().unwrap_or("csv").parse()?;

    let default_base = state.config.default_base_name.clone();
    let file = tokio::task::spawn_blocking(move || {
        export_table(&table, format, source_name.as_deref(), &default_base)
    })
    .await
    .map_err(|e| AppError::Worker(e.to_string()))?
    .map_err(|e| AppError::Export(format!("{:#}", e)))?;

    log::info!("Exported {} ({} bytes)", file.file_name, file.bytes.len());

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(file.content_type)),
            (header::CONTENT_DISPOSITION, attachment(&file.file_name)?),
        ],
        file.bytes,
    )
        .into_response())
}

/// `attachment; filename="..."` with quotes, backslashes and control
/// characters replaced
fn attachment(file_name: &str) -> Result<HeaderValue, AppError> {
    let safe: String = file_name
        .chars()
        .map(|c| if c.is_control() || c == '"' || c == '\\' { '_' } else { c })
        .collect();

    HeaderValue::from_str(&format!("attachment; filename=\"{}\"", safe))
        .map_err(|e| AppError::Export(format!("Invalid file name {:?}: {}", file_name, e)))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        log::warn!("Request failed ({}): {}", self.kind(), self);
        Json(serde_json::json!({ "error": self.to_string() })).into_response()
    }
}

fn invalid_body(rejection: JsonRejection) -> AppError {
    AppError::InvalidRequest(format!("Invalid request body: {}", rejection.body_text()))
}

fn read_session(state: &SharedState) -> RwLockReadGuard<'_, Session> {
    state.session.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_session(state: &SharedState) -> RwLockWriteGuard<'_, Session> {
    state.session.write().unwrap_or_else(PoisonError::into_inner)
}
