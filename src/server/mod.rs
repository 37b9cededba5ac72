//! HTTP server
//!
//! Wires the gate into an axum pipeline: a middleware evaluates the gate for
//! every response, the login endpoint unlocks pages for a session, and the
//! admin API manages protected-page records. Everything else is served from
//! the configured content directory.

pub mod admin;
pub mod login;
pub mod middleware;

use crate::alias::AliasResolver;
use crate::auth::PermissionCheck;
use crate::config::AppConfig;
use crate::gate::AccessGate;
use crate::session::SessionUnlocks;
use crate::store::PageStore;
use axum::Router;
use axum::routing::get;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared state for all handlers and the gate middleware.
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<AccessGate>,
    pub store: Arc<dyn PageStore>,
    pub sessions: Arc<dyn SessionUnlocks>,
    pub aliases: Arc<dyn AliasResolver>,
    pub permissions: Arc<dyn PermissionCheck>,
    pub config: Arc<AppConfig>,
}

/// The visitor's session id, resolved by the gate middleware and attached to
/// the request for downstream handlers.
#[derive(Debug, Clone)]
pub struct SessionId(pub String);

/// Build the application router.
///
/// The gate middleware wraps every route, including the admin API: admin
/// requests carry the admin bearer token, which holds the bypass capability,
/// so they pass the gate without special-casing.
pub fn build_router(state: AppState) -> Router {
    let login_path = state.config.protection.login_path.clone();

    let admin_routes = Router::new()
        .route(
            "/admin/pages",
            get(admin::list_pages).post(admin::create_page),
        )
        .route(
            "/admin/pages/{pid}",
            axum::routing::put(admin::update_page).delete(admin::delete_page),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            admin::require_admin,
        ));

    Router::new()
        .route(
            &login_path,
            get(login::login_form).post(login::login_submit),
        )
        .merge(admin_routes)
        .fallback_service(ServeDir::new(&state.config.server.content_dir))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::protect_pages,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn run_server(state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        state.config.server.host, state.config.server.port
    )
    .parse()?;

    let app = build_router(state);
    let listener = TcpListener::bind(addr).await?;
    info!("Serving gated site at http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install ctrl-c handler");
    } else {
        info!("Received shutdown signal");
    }
}
