//! The page, the generate endpoint and the live log WebSocket.
//!
//! `POST /api/v1/generate` blocks until the crew is done. While it runs,
//! every re-render of the log panel is pushed to all sockets connected to
//! `/api/v1/logs`.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::ws::{Message as WsMessage, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::{get, post};
use chrono::{DateTime, Utc};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::RunError;
use crate::runner::{PipelineRunner, RunOutcome};
use crate::sink::LiveRegion;

const INDEX_HTML: &str = include_str!("../static/index.html");
const APP_JS: &str = include_str!("../static/app.js");

/// Shared by every handler.
pub struct AppState {
    pub runner: PipelineRunner,
    pub region: Arc<LiveRegion>,
    started: Instant,
}

impl AppState {
    /// `region` must be the one `runner` renders into.
    pub fn new(runner: PipelineRunner, region: Arc<LiveRegion>) -> Self {
        Self {
            runner,
            region,
            started: Instant::now(),
        }
    }
}

// ── Axum router ────────────────────────────────────────────────────────

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/app.js", get(app_js))
        .route("/api/v1/health", get(api_health))
        .route("/api/v1/logs", get(ws_logs))
        .route("/api/v1/generate", post(api_generate))
        .layer(axum::extract::DefaultBodyLimit::max(16 * 1024))
        .with_state(state)
        .layer(axum::middleware::from_fn(security_headers))
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn app_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        APP_JS,
    )
}

// ── REST API ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    #[serde(default)]
    topic: String,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    topic: String,
    markdown: String,
    /// Rendered preview.
    html: String,
    /// Escaped markdown source.
    raw_html: String,
    log: String,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
}

impl From<RunOutcome> for GenerateResponse {
    fn from(outcome: RunOutcome) -> Self {
        Self {
            topic: outcome.topic.to_string(),
            html: outcome.artifact.preview_html(),
            raw_html: outcome.artifact.raw_html(),
            markdown: outcome.artifact.into_markdown(),
            log: outcome.log,
            started_at: outcome.started_at,
            finished_at: outcome.finished_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    state: String,
    model: String,
    log_window: usize,
    uptime_secs: u64,
}

impl IntoResponse for RunError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, body) = match self {
            RunError::Validation(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                serde_json::json!({ "warning": message }),
            ),
            RunError::Busy => (StatusCode::CONFLICT, serde_json::json!({ "error": message })),
            RunError::Orchestration(_) => {
                (StatusCode::BAD_GATEWAY, serde_json::json!({ "error": message }))
            }
        };
        (status, Json(body)).into_response()
    }
}

async fn api_generate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateRequest>,
) -> Response {
    // Run detached so a client that goes away mid-run doesn't cancel it.
    let run = tokio::spawn(async move { state.runner.submit(&req.topic).await });
    match run.await {
        Ok(Ok(outcome)) => Json(GenerateResponse::from(outcome)).into_response(),
        Ok(Err(e)) => e.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Run task panicked");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "internal error" })),
            )
                .into_response()
        }
    }
}

async fn api_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        state: state.runner.state().to_string(),
        model: state.runner.engine_name().to_string(),
        log_window: state.runner.window(),
        uptime_secs: state.started.elapsed().as_secs(),
    })
}

// ── Live log socket ────────────────────────────────────────────────────

async fn ws_logs(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let rx = state.region.subscribe();
    ws.on_upgrade(move |socket| stream_logs(socket, rx))
}

/// Send the current panel, then every re-render, until either side goes away.
async fn stream_logs(socket: WebSocket, mut panel: watch::Receiver<String>) {
    let (mut tx, mut rx) = socket.split();

    let current = panel.borrow_and_update().clone();
    if tx.send(WsMessage::Text(current.into())).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            changed = panel.changed() => {
                if changed.is_err() {
                    break;
                }
                let html = panel.borrow_and_update().clone();
                if tx.send(WsMessage::Text(html.into())).await.is_err() {
                    tracing::debug!("Log socket send failed, closing");
                    break;
                }
            }
            frame = rx.next() => {
                match frame {
                    Some(Ok(WsMessage::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }
    let _ = tx.send(WsMessage::Close(None)).await;
}

// ── Security headers ───────────────────────────────────────────────────

async fn security_headers(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    let mut resp = next.run(req).await;
    let headers = resp.headers_mut();
    headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        "Referrer-Policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        "Content-Security-Policy",
        HeaderValue::from_static(
            "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; connect-src 'self' ws: wss:; frame-ancestors 'none'; base-uri 'self'; form-action 'self'",
        ),
    );
    resp
}
