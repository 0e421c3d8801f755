mod config;

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use bloom_api::middleware::require_auth;
use bloom_api::{AppStateInner, auth, comments, forum, pages, resources};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bloom=debug,bloom_api=debug,bloom_core=debug,bloom_db=info,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let db = Arc::new(bloom_db::Database::open(&config.db_path)?);
    let state = AppStateInner::new(db, config.jwt_secret.clone());

    // Routes
    let public_routes = Router::new()
        .route("/", get(pages::home))
        .route("/search", get(pages::search))
        .route("/resources", get(resources::list_resources).post(resources::submit_resource))
        .route("/resources/{id}", get(resources::get_resource))
        .route("/forum", get(forum::list_forum_posts).post(forum::submit_forum_post))
        .route("/forum/{id}", get(forum::get_forum_post))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/comments", post(comments::submit_comment))
        .route("/resources/{id}", delete(resources::delete_resource))
        .route("/forum/{id}", delete(forum::delete_forum_post))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = config.addr()?;
    info!("Bloom server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
