use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use product_match_engine::{
    error::MatchEngineError,
    unknown::{UnknownProduct, UnknownStats},
    EngineConfig, MatchEngine, RankedCandidate, ResolveOutcome, SqliteCatalog, SqliteUnknownLog,
    UnknownLog,
};

#[derive(Clone)]
struct AppState {
    engine: Arc<MatchEngine>,
    catalog: Arc<SqliteCatalog>,
    unknowns: Arc<SqliteUnknownLog>,
}

#[derive(Debug, Deserialize)]
struct ResolveRequest {
    text: String,
    #[serde(default = "default_true")]
    record_unknown: bool,
}

#[derive(Debug, Deserialize)]
struct RankRequest {
    text: String,
    #[serde(default = "default_limit")]
    limit: usize,
}

#[derive(Debug, Deserialize)]
struct UnknownsQuery {
    #[serde(default = "default_unknowns_limit")]
    limit: usize,
}

fn default_true() -> bool { true }
fn default_limit() -> usize { 5 }
fn default_unknowns_limit() -> usize { 20 }

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Debug, Serialize)]
struct RankResponse {
    ranked: Vec<RankedCandidate>,
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    products: u64,
    unknowns: UnknownStats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var("CONFIG_PATH").ok();
    let config = EngineConfig::load(config_path.as_deref().map(std::path::Path::new))?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("product_match_server=debug,{}", config.log_filter).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🚀 Starting Product Match Server");
    tracing::info!("📦 Database: {}", config.database);
    tracing::info!("🔌 Port: {}", config.server.port);

    let catalog = Arc::new(SqliteCatalog::new(&config.database).await?);
    let unknowns = Arc::new(SqliteUnknownLog::new(&config.database).await?);
    let engine = MatchEngine::with_weights(catalog.clone(), config.weights)?;

    let state = AppState {
        engine: Arc::new(engine),
        catalog,
        unknowns,
    };

    // Build router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/resolve", post(resolve_handler))
        .route("/v1/rank", post(rank_handler))
        .route("/v1/unknowns", get(unknowns_handler))
        .route("/v1/stats", get(stats_handler))
        .layer(CorsLayer::permissive())
        .with_state(state);

    // Start server
    let addr = config.bind_addr();
    tracing::info!("🛒 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: product_match_engine::VERSION.to_string(),
    })
}

async fn resolve_handler(
    State(state): State<AppState>,
    Json(req): Json<ResolveRequest>,
) -> Result<Json<ResolveOutcome>, AppError> {
    tracing::debug!("Resolve request: {:?}", req);

    let outcome = state.engine.resolve(&req.text).await;

    if let ResolveOutcome::Unknown { original_text } = &outcome {
        if req.record_unknown {
            state.unknowns.record(original_text).await?;
        }
    }

    Ok(Json(outcome))
}

async fn rank_handler(
    State(state): State<AppState>,
    Json(req): Json<RankRequest>,
) -> Result<Json<RankResponse>, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::BadRequest("text must not be blank".to_string()));
    }

    let mut ranked = state.engine.rank_query(&req.text).await;
    ranked.truncate(req.limit);

    Ok(Json(RankResponse { ranked }))
}

async fn unknowns_handler(
    State(state): State<AppState>,
    Query(query): Query<UnknownsQuery>,
) -> Result<Json<Vec<UnknownProduct>>, AppError> {
    Ok(Json(state.unknowns.list(query.limit).await?))
}

async fn stats_handler(
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, AppError> {
    Ok(Json(StatsResponse {
        products: state.catalog.count().await?,
        unknowns: state.unknowns.stats().await?,
    }))
}

// Error handling
enum AppError {
    BadRequest(String),
    Engine(MatchEngineError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Engine(MatchEngineError::InvalidQuery(message)) => {
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::Engine(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };

        tracing::error!("❌ Error: {} - {}", status, message);

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<MatchEngineError> for AppError {
    fn from(err: MatchEngineError) -> Self {
        AppError::Engine(err)
    }
}
