//! HTTP surface: page shell, upload and export endpoints

mod handlers;
mod page;
mod session;

use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;

use crate::config::Config;
use crate::parser::ParserFactory;

pub use handlers::{ExportRequest, LoadRequest, LoadResponse};
pub use page::render_page;
pub use session::Session;

/// State handed to every request handler
pub struct AppState {
    pub config: Config,
    pub session: RwLock<Session>,
    pub parsers: ParserFactory,
    page: String,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            config,
            session: RwLock::new(Session::new()),
            parsers: ParserFactory::new(),
            page: render_page()?,
        })
    }
}

/// Build the application router
pub fn router(state: SharedState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::index))
        .route("/load_excel", post(handlers::load_excel))
        .route("/export_data", post(handlers::export_data))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Bind the configured address and serve until the process is stopped
pub async fn serve(config: Config) -> Result<()> {
    let addr = config.socket_addr()?;
    let state = Arc::new(AppState::new(config)?);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    log::info!("Listening on http://{}", addr);

    axum::serve(listener, router(state))
        .await
        .context("Server error")?;
    Ok(())
}
