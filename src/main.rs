// src/main.rs

use std::env;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

mod config;
mod db;
mod engine;
mod models;
mod oracle;
mod routes;
mod store;

use config::Config;
use engine::Core;
use store::{memory::MemoryRepository, postgres::PgRepository, Repository};

#[derive(Clone)]
pub struct AppState {
    pub core: Core,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();

    let repo: Arc<dyn Repository> = match env::var("DATABASE_URL") {
        Ok(url) => Arc::new(PgRepository::new(db::connect(&url).await?)),
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, falling back to in-memory store");
            Arc::new(MemoryRepository::new())
        }
    };

    let state = AppState {
        core: Core::new(repo, config)?,
    };

    // Very permissive CORS for local dev (tighten for prod)
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // health
        .route("/health", get(routes::health::health))
        // teams
        .route("/api/v1/teams", get(routes::teams::list_teams))
        .route("/api/v1/teams/:id", get(routes::teams::get_team))
        // schedules
        .route(
            "/api/v1/teams/:id/schedule",
            post(routes::schedules::generate_schedule)
                .get(routes::schedules::get_schedule)
                .delete(routes::schedules::delete_schedule),
        )
        .route(
            "/api/v1/teams/:id/schedule/emergency",
            post(routes::schedules::emergency_schedule),
        )
        // validation & repair
        .route(
            "/api/v1/teams/:id/validate",
            post(routes::validation::validate_schedule),
        )
        .route("/api/v1/teams/:id/fix", post(routes::validation::fix_schedule))
        // reporting
        .route("/api/v1/teams/:id/analytics", get(routes::usage::team_analytics))
        .route("/api/v1/usage/:user_id", get(routes::usage::usage_report))
        // state & middleware
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Port (axum 0.7 style)
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("API listening on http://{addr}");

    axum::serve(listener, api.into_make_service()).await?;
    Ok(())
}
