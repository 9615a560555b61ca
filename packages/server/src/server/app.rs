//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::get,
    Router,
};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::kernel::ServerDeps;
use crate::server::routes::{
    access_denied_handler, db_restore_handler, health_handler, index_handler, login_form,
    login_submit, logout_handler, send_email_confirmation_handler, validate_get, validate_post,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub deps: Arc<ServerDeps>,
}

/// Build the Axum application router.
///
/// Sessions are cookie-backed and per-browser (expire on session end);
/// every protected route goes through the access guard inside its handler.
pub fn build_app(deps: ServerDeps) -> Router {
    let state = AppState {
        db_pool: deps.db_pool.clone(),
        deps: Arc::new(deps),
    };

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_expiry(Expiry::OnSessionEnd);

    Router::new()
        .route("/", get(index_handler))
        .route("/db_restore", get(db_restore_handler))
        .route("/login", get(login_form).post(login_submit))
        .route("/send_email_confirmation", get(send_email_confirmation_handler))
        .route("/validate/:id/:token", get(validate_get).post(validate_post))
        .route("/accessdenied", get(access_denied_handler))
        .route("/logout", get(logout_handler))
        .route("/health", get(health_handler))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(state))
}
