//! HTTP server for the trade balance dashboard.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                              |
//! |--------|-------------------|------------------------------------------|
//! | GET    | `/health`         | Health check                             |
//! | GET    | `/api/countries`  | Selectable reporting countries + report  |
//! | POST   | `/api/map`        | Aggregates, points and Plotly figure     |
//! | GET    | `/api/logs`       | SSE stream for real-time logs            |
//!
//! The dataset is loaded on the first request that needs it and shared
//! afterwards. File reads run on the blocking pool.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, path::Path, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};

use super::logs::{log_error, LOG_BROADCASTER};
use super::types::{error_response, CountriesResponse, MapRequest, MapResponse};
use crate::cache::DatasetCache;
use crate::config::AppConfig;
use crate::error::{PipelineError, ServerError, ServerResult};
use crate::transform::pipeline::build_map_cached;

type ApiError = (StatusCode, Json<Value>);

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<DatasetCache>,
}

impl AppState {
    pub fn new(cache: DatasetCache) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Pipeline(PipelineError::Selection(_)) | ServerError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ServerError::Pipeline(_) | ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn reject(err: ServerError) -> ApiError {
    log_error(err.to_string());
    (err.status_code(), Json(error_response(&err.to_string())))
}

/// Routes plus CORS. With a static directory the built frontend answers
/// every unmatched path; without one `/` is a health check.
pub fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    let api = Router::new()
        .route("/health", get(health))
        .route("/api/countries", get(countries))
        .route("/api/map", post(map))
        .route("/api/logs", get(sse_logs));

    let app = match static_dir {
        Some(dir) => {
            let index = ServeFile::new(dir.join("index.html"));
            api.fallback_service(ServeDir::new(dir).fallback(index))
        }
        None => api.route("/", get(health)),
    };

    app.layer(cors).with_state(state)
}

/// Bind and serve until the process stops.
pub async fn start_server(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::new(DatasetCache::new(config.data_source()));
    let app = build_router(state, config.static_dir.as_deref());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    println!("🚀 petmap server running on http://localhost:{}", config.port);
    println!("   Data: {} (sheet {})", config.data_path.display(), config.sheet);
    println!("   GET  /api/countries - Reporting countries");
    println!("   POST /api/map       - Trade balance map");
    println!("   GET  /api/logs      - SSE log stream");
    println!("   GET  /health        - Health check");
    if let Some(ref dir) = config.static_dir {
        println!("   Frontend served from {}", dir.display());
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "petmap",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "countries": "GET /api/countries",
            "map": "POST /api/map",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// Run a blocking closure on the blocking pool.
async fn blocking<T, F>(f: F) -> ServerResult<T>
where
    F: FnOnce() -> ServerResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?
}

async fn countries(State(state): State<AppState>) -> Result<Json<CountriesResponse>, ApiError> {
    let cache = state.cache.clone();
    let dataset = blocking(move || Ok(cache.get()?)).await.map_err(reject)?;

    Ok(Json(CountriesResponse {
        countries: dataset.countries().to_vec(),
        report: dataset.report().clone(),
    }))
}

async fn map(
    State(state): State<AppState>,
    request: Result<Json<MapRequest>, JsonRejection>,
) -> Result<Json<MapResponse>, ApiError> {
    let Json(request) = request.map_err(|e| reject(ServerError::BadRequest(e.body_text())))?;

    let cache = state.cache.clone();
    let view = blocking(move || Ok(build_map_cached(&cache, &request.countries)?))
        .await
        .map_err(reject)?;

    Ok(Json(MapResponse::from(view)))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    // lagged receivers skip what they missed
    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let entry = result.ok()?;
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
