#![cfg(feature = "web")]
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::path::Path as FsPath;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::aggregate::{ChartSpec, chart_for};
use crate::config::Config;
use crate::crossfilter::{Event, StoredState, interact};
use crate::downloader;
use crate::error::DashboardError;
use crate::graph::{self, GraphOptions};
use crate::loader::{CsvSource, SalesSource};
use crate::record::Dimension;
use crate::session::{self, SessionToken};

pub struct AppState {
    source: CsvSource,
    graph: GraphOptions,
}

impl AppState {
    pub fn new(source: CsvSource) -> Self {
        AppState {
            source,
            graph: GraphOptions::default(),
        }
    }
}

#[derive(Deserialize)]
struct InteractRequest {
    event: Event,
    #[serde(default)]
    stored: Option<StoredState>,
}

#[derive(Serialize)]
struct InteractResponse {
    status: String,
    session: SessionToken,
    charts: Vec<ChartSpec>,
    stored: StoredState,
    empty: bool,
    reloaded: bool,
}

#[derive(Deserialize)]
struct StoredRequest {
    stored: StoredState,
}

pub fn router(state: Arc<AppState>, assets_dir: impl AsRef<FsPath>) -> Router {
    Router::new()
        .route("/", get(serve_dashboard))
        .route("/health", get(health))
        .route("/api/interact", post(handle_interact))
        .route("/api/reset", post(handle_reset))
        .route("/api/export/csv", post(export_csv))
        .route("/api/export/xlsx", post(export_xlsx))
        .route("/api/chart/:dimension", post(chart_image))
        .nest_service("/assets", ServeDir::new(assets_dir.as_ref()))
        .with_state(state)
}

pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let source = CsvSource::new(&config.data);

    // Only a warning: every interaction reloads and reports its own failure.
    match source.load() {
        Ok(records) => log::info!(
            "Sales data at {} has {} records",
            config.data.display(),
            records.len()
        ),
        Err(e) => log::warn!("{}", e),
    }

    let app = router(Arc::new(AppState::new(source)), &config.assets_dir);

    let listener = TcpListener::bind(config.address()).await?;
    log::info!("Dashboard listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Page load: a new session starts here
async fn serve_dashboard(jar: CookieJar) -> (CookieJar, Html<String>) {
    let token = SessionToken::issue();
    log::info!("Session {} created", token);

    let template = include_str!("./static/dashboard.html").replace(
        "</head>",
        &format!(
            "    <script>const SESSION_TOKEN = \"{}\";</script>\n</head>",
            token
        ),
    );

    (session::with_token(jar, token), Html(template))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "source": state.source.path().display().to_string(),
        "source_present": state.source.path().is_file(),
    }))
}

async fn handle_interact(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    jar: CookieJar,
    body: Result<Json<InteractRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<InteractResponse>), DashboardError> {
    let Json(request) = body.map_err(|e| DashboardError::invalid_payload(e.body_text()))?;

    let token = match (&request.event, session::request_token(&headers, &jar)) {
        (Event::ResetActivated, Some(previous)) => rotate(previous),
        (_, Some(token)) => token,
        (_, None) => SessionToken::issue(),
    };

    respond(&state, jar, token, &request.event, request.stored)
}

/// Reset control: replaces the session token and reloads from source
async fn handle_reset(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, Json<InteractResponse>), DashboardError> {
    let token = session::request_token(&headers, &jar)
        .map(rotate)
        .unwrap_or_else(SessionToken::issue);

    respond(&state, jar, token, &Event::ResetActivated, None)
}

fn rotate(previous: SessionToken) -> SessionToken {
    let next = previous.reset();
    log::info!("Session {} reset to {}", previous, next);
    next
}

fn respond(
    state: &AppState,
    jar: CookieJar,
    token: SessionToken,
    event: &Event,
    stored: Option<StoredState>,
) -> Result<(CookieJar, Json<InteractResponse>), DashboardError> {
    let interaction = interact(&state.source, token, event, stored)?;

    Ok((
        session::with_token(jar, token),
        Json(InteractResponse {
            status: "ok".to_string(),
            session: token,
            empty: interaction.is_empty(),
            reloaded: interaction.reloaded,
            charts: interaction.charts,
            stored: interaction.stored,
        }),
    ))
}

async fn export_csv(
    body: Result<Json<StoredRequest>, JsonRejection>,
) -> Result<Response, DashboardError> {
    let Json(request) = body.map_err(|e| DashboardError::invalid_payload(e.body_text()))?;
    let csv = downloader::to_csv(&request.stored.records)?;

    Ok(attachment(
        "text/csv; charset=utf-8",
        "working_dataset.csv",
        csv.into_bytes(),
    ))
}

async fn export_xlsx(
    body: Result<Json<StoredRequest>, JsonRejection>,
) -> Result<Response, DashboardError> {
    let Json(request) = body.map_err(|e| DashboardError::invalid_payload(e.body_text()))?;
    let xlsx = downloader::to_xlsx(&request.stored.records)?;

    Ok(attachment(
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "working_dataset.xlsx",
        xlsx,
    ))
}

async fn chart_image(
    State(state): State<Arc<AppState>>,
    Path(dimension): Path<String>,
    body: Result<Json<StoredRequest>, JsonRejection>,
) -> Result<Response, DashboardError> {
    let dimension = Dimension::parse(&dimension).ok_or_else(|| {
        DashboardError::invalid_payload(format!("unknown chart '{}'", dimension))
    })?;
    let Json(request) = body.map_err(|e| DashboardError::invalid_payload(e.body_text()))?;

    let chart = chart_for(&request.stored.records, dimension);
    let png = graph::render_png(&chart, &state.graph)?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

fn attachment(content_type: &'static str, filename: &str, body: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}
