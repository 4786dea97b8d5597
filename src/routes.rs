use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
};
use http::{HeaderName, HeaderValue, Method};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::ResolveError;
use crate::models::ResolvedVerse;
use crate::services::providers::{ProviderRequest, RemoteMode};
use crate::services::remote::RemoteVerses;
use crate::services::resolver::VerseResolver;
use crate::services::selection::SelectionMode;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
const VERSION_HEADER: &str = "x-oneseed-version";

#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<VerseResolver>,
    pub remote: Arc<RemoteVerses>,
}

/// Build the service. When `corpus_dir` is set the raw corpus files are
/// also published under `/bible`.
pub fn router(state: AppState, corpus_dir: Option<PathBuf>) -> Router {
    let mut app = Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/api/verse", get(local_verse))
        .route("/api/votd", get(remote_verse))
        .route("/api/diag", get(diag))
        .with_state(state);

    if let Some(dir) = corpus_dir {
        app = app.nest_service("/bible", ServeDir::new(dir));
    }

    // Version stamping sits outside CORS so preflight answers carry it too.
    app.layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::OPTIONS])
                .allow_headers(AllowHeaders::any()),
        )
        .layer(middleware::map_response(stamp_version))
}

async fn stamp_version(mut response: Response) -> Response {
    response.headers_mut().insert(
        HeaderName::from_static(VERSION_HEADER),
        HeaderValue::from_static(VERSION),
    );
    response
}

impl IntoResponse for ResolveError {
    fn into_response(self) -> Response {
        let status = match self {
            ResolveError::ManifestUnavailable(_) | ResolveError::ChapterFetchFailed { .. } => {
                StatusCode::BAD_GATEWAY
            }
            ResolveError::CorpusIntegrityError(_)
            | ResolveError::InvalidCorpus { .. }
            | ResolveError::IndexOutOfRange { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!("Verse resolution failed: {}", self);
        error_body(status, self.to_string())
    }
}

fn error_body(status: StatusCode, message: String) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

fn bad_request(message: impl Into<String>) -> Response {
    error_body(StatusCode::BAD_REQUEST, message.into())
}

#[derive(Debug, Deserialize)]
struct VerseQuery {
    mode: Option<String>,
    seed: Option<i64>,
}

fn parse_selection(query: &VerseQuery) -> Result<SelectionMode, Response> {
    match query.mode.as_deref() {
        None | Some("random") => Ok(SelectionMode::Random),
        Some("votd") | Some("daily") => Ok(SelectionMode::Daily),
        Some("seeded") => query
            .seed
            .map(SelectionMode::Seeded)
            .ok_or_else(|| bad_request("mode=seeded requires a seed")),
        Some(other) => Err(bad_request(format!("unknown mode: {other}"))),
    }
}

async fn local_verse(
    State(state): State<AppState>,
    Query(query): Query<VerseQuery>,
) -> Result<Json<ResolvedVerse>, Response> {
    let mode = parse_selection(&query)?;
    let verse = state
        .resolver
        .resolve(mode)
        .await
        .map_err(IntoResponse::into_response)?;
    Ok(Json(verse))
}

#[derive(Debug, Deserialize)]
struct RemoteQuery {
    mode: Option<String>,
    #[serde(rename = "ref")]
    reference: Option<String>,
    fresh: Option<String>,
}

#[derive(Debug, Serialize)]
struct Attempt {
    provider: &'static str,
    error: String,
}

#[derive(Debug, Serialize)]
struct RemoteVerseBody {
    #[serde(flatten)]
    verse: ResolvedVerse,
    placeholder: bool,
    attempts: Vec<Attempt>,
}

async fn remote_verse(
    State(state): State<AppState>,
    Query(query): Query<RemoteQuery>,
) -> Result<Json<RemoteVerseBody>, Response> {
    let mode = match query.mode.as_deref() {
        None | Some("votd") => RemoteMode::Votd,
        Some("random") => RemoteMode::Random,
        Some(other) => return Err(bad_request(format!("unknown mode: {other}"))),
    };
    let request = ProviderRequest {
        mode,
        reference: query.reference.filter(|r| !r.trim().is_empty()),
    };
    let fresh = matches!(query.fresh.as_deref(), Some("1") | Some("true"));

    let outcome = state.remote.fetch(&request, fresh).await;
    let attempts = outcome
        .failures()
        .iter()
        .map(|f| Attempt {
            provider: f.provider,
            error: f.error.to_string(),
        })
        .collect();

    Ok(Json(RemoteVerseBody {
        placeholder: outcome.is_placeholder(),
        attempts,
        verse: outcome.into_verse(),
    }))
}

async fn diag() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "ok": true,
        "diag": "alive",
        "now": chrono::Utc::now().to_rfc3339(),
        "version": VERSION,
    }))
}

async fn health_check() -> &'static str {
    "OK"
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let body = match state.resolver.resolve(SelectionMode::Daily).await {
        Ok(verse) => format!(
            r#"<blockquote>{}</blockquote>
        <p class="reference">{} ({})</p>"#,
            html_escape::encode_text(&verse.text),
            html_escape::encode_text(&verse.reference),
            html_escape::encode_text(&verse.translation),
        ),
        Err(e) => format!(
            r#"<p class="error">Today's verse is unavailable: {}</p>"#,
            html_escape::encode_text(&e.to_string())
        ),
    };

    Html(format!(
        r#"<!DOCTYPE html>
    <html>
    <head>
        <title>OneSeed</title>
        <meta charset="utf-8">
        <style>
            body {{ font-family: Georgia, serif; margin: 40px; max-width: 40em; }}
            blockquote {{ font-size: 1.4em; margin: 20px 0; }}
            .reference {{ color: #555; }}
            .endpoint {{ background-color: #f5f5f5; padding: 10px; margin: 10px 0; border-radius: 4px; font-family: monospace; }}
        </style>
    </head>
    <body>
        <h1>Verse of the Day</h1>
        {body}

        <h2>Endpoints</h2>
        <div class="endpoint">GET /api/verse?mode=random|votd|seeded&amp;seed=N</div>
        <div class="endpoint">GET /api/votd?mode=votd|random&amp;ref=John%203:16&amp;fresh=1</div>
        <div class="endpoint">GET /api/diag</div>
        <div class="endpoint">GET /health</div>
    </body>
    </html>
    "#
    ))
}
