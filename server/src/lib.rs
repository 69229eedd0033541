use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::{get, post}, Json, Router};
use ircore::persist::{open_retriever, IndexPaths};
use ircore::{DocId, QueryMode, Retriever};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default)]
    pub mode: QueryMode,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub mode: QueryMode,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub path: Option<String>,
}

#[derive(Clone)]
pub struct ServerConfig {
    pub index_dir: PathBuf,
    pub stoplist: PathBuf,
    pub admin_token: Option<String>,
}

impl ServerConfig {
    /// Admin token from `ADMIN_TOKEN`.
    pub fn from_env(index_dir: impl Into<PathBuf>, stoplist: impl Into<PathBuf>) -> Self {
        Self {
            index_dir: index_dir.into(),
            stoplist: stoplist.into(),
            admin_token: std::env::var("ADMIN_TOKEN").ok(),
        }
    }
}

/// Shared handle to the live retriever. Queries clone the inner `Arc` and
/// release the lock; a reload builds a new retriever and swaps it in whole.
#[derive(Clone)]
pub struct AppState {
    pub paths: IndexPaths,
    pub stoplist: PathBuf,
    pub engine: Arc<RwLock<Arc<Retriever>>>,
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn engine(&self) -> Arc<Retriever> {
        self.engine.read().clone()
    }
}

pub fn build_app(config: ServerConfig) -> Result<Router> {
    let paths = IndexPaths::new(&config.index_dir);
    let retriever = open_retriever(&paths, &config.stoplist)?;
    let app_state = AppState {
        paths,
        stoplist: config.stoplist,
        engine: Arc::new(RwLock::new(Arc::new(retriever))),
        admin_token: config.admin_token,
    };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/reload", post(reload_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let start = std::time::Instant::now();
    let mode = params.mode;

    let engine = state.engine();
    let ids = engine.search(&params.q, mode);
    let results: Vec<SearchHit> = ids
        .iter()
        .map(|&doc_id| SearchHit { doc_id, path: engine.resolve(doc_id).map(str::to_string) })
        .collect();

    let elapsed = start.elapsed();
    tracing::debug!(query = %params.q, %mode, hits = results.len(), "search");
    Ok(Json(SearchResponse {
        query: params.q,
        mode,
        took_s: elapsed.as_secs_f64(),
        total_hits: results.len(),
        results,
    }))
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<DocId>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let engine = state.engine();
    let path = engine
        .resolve(doc_id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("no document {doc_id}")))?;
    let mut obj = serde_json::json!({
        "doc_id": doc_id,
        "path": path,
    });
    if let Ok(text) = std::fs::read_to_string(path) {
        obj["text"] = serde_json::Value::String(text);
    }
    Ok(Json(obj))
}

/// Load the index directory again and publish it in one swap.
async fn reload_handler(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let paths = state.paths.clone();
    let stoplist = state.stoplist.clone();
    let loaded = tokio::task::spawn_blocking(move || open_retriever(&paths, &stoplist))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let (terms, docs) = (loaded.index().len(), loaded.docs().len());
    *state.engine.write() = Arc::new(loaded);
    tracing::info!(terms, docs, "index reloaded");
    Ok(Json(serde_json::json!({ "terms": terms, "docs": docs })))
}

fn authorize(state: &AppState, headers: &axum::http::HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
