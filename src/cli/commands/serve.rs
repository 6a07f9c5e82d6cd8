//! HTTP backend.
//!
//! Serves the health check and the question-answering endpoint.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::{QueryOutcome, QueryRequest, QueryService};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Shared application state.
pub struct AppState {
    pub service: QueryService,
    pub service_name: String,
}

/// Build the router with permissive CORS.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/get_answer", post(get_answer))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP backend.
pub async fn run_serve(
    host: Option<String>,
    port: Option<u16>,
    proxy_url: Option<String>,
    mut settings: Settings,
) -> anyhow::Result<()> {
    if let Some(proxy_url) = proxy_url {
        settings.transcript.proxy_url = Some(proxy_url);
    }

    let api_key = match preflight::check(Operation::Serve, &settings) {
        Ok(key) => key.unwrap_or_default(),
        Err(e) => {
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    };

    let service = QueryService::from_settings(&settings, &api_key)?;

    let state = Arc::new(AppState {
        service,
        service_name: settings.server.service_name.clone(),
    });

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header(&format!("{} API Server", settings.server.service_name));
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /");
    Output::kv("Answer", "POST /get_answer");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    info!("Serving on {}", addr);
    axum::serve(listener, build_router(state)).await?;

    Ok(())
}

// === Handlers ===

async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "message": format!("{} backend is live!", state.service_name)
    }))
}

async fn get_answer(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> impl IntoResponse {
    info!(
        "Received request: video_id={:?} language={:?}",
        req.video_id, req.language
    );

    match state.service.answer(&req).await {
        outcome @ (QueryOutcome::Answered(_) | QueryOutcome::TranscriptUnavailable(_, _)) => {
            (StatusCode::OK, Json(outcome.into_inner()))
        }
        QueryOutcome::GenerationFailed(response, _) => (StatusCode::BAD_GATEWAY, Json(response)),
    }
}
