//! HTTP surface: axum router over the shared services.

pub mod routes;
pub mod state;

pub use state::AppState;

use anyhow::{Context, Result};
use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let proxy_routes = Router::new()
        .route("/congress/member/:id", get(routes::proxy_member))
        .route("/fec/candidates/search", get(routes::proxy_candidate_search))
        .route(
            "/fec/candidate/:candidate_id/totals",
            get(routes::proxy_candidate_totals),
        )
        .route(
            "/fec/candidate/:candidate_id/committees",
            get(routes::proxy_candidate_committees),
        )
        .route(
            "/fec/committee/:committee_id/schedule_a",
            get(routes::proxy_committee_schedule_a),
        )
        .route("/fec/schedules/*slug", get(routes::proxy_schedules));

    let api_routes = Router::new()
        .route("/congress", get(routes::congress))
        .route("/member/stats", get(routes::member_stats))
        .route("/member/finances", get(routes::member_finances))
        .route("/donations", get(routes::donations))
        .route("/white-house", get(routes::white_house_handler))
        .route("/state/:abbr", get(routes::state_detail))
        .nest("/proxy", proxy_routes);

    let cors = cors_layer(&state.config.server.cors_origins);

    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60))
}

/// Bind and serve until Ctrl-C.
pub async fn serve(state: Arc<AppState>) -> Result<()> {
    let address = format!("{}:{}", state.config.server.host, state.config.server.port);
    let app = router(state);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to {}", address))?;
    info!("Listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
