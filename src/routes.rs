//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET|POST /`, `/index`, `/index.html` - Landing page (public)
//! - `GET|POST /login.html`                - Login form and submission (public, rate limited)
//! - `GET  /logout`                        - End the session (public)
//! - `GET  /<page>.html`                   - Static template pages (some need a session)
//! - `GET  /health`                        - Health check (public)
//! - `/static/*`                           - Static assets
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Panic guard** - A panicking handler answers with the 500 page
//! - **Sessions** - Signed session cookie with in-memory store
//! - **CSRF cookie** - Signed double-submit token for the login form
//! - **Login guard** - Redirects anonymous users away from protected pages
//! - **Rate limiting** - Per-IP token bucket on the login form
//! - **Path normalization** - Trailing slash handling

use crate::api::handlers::health_handler;
use crate::api::middleware::{rate_limit, tracing};
use crate::error::panic_response;
use crate::state::AppState;
use crate::web;
use crate::web::csrf::CsrfCookie;
use crate::web::handlers::not_found_handler;
use crate::web::middleware::web_auth;
use crate::web::session::{self, SessionSettings};
use axum::routing::get;
use axum::{Extension, Router, middleware};
use tower::Layer;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::services::ServeDir;

/// Options shaping the router beyond the shared state.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub session: SessionSettings,
    /// Rate-limit the login form.
    pub login_rate_limit: bool,
    /// When `true`, rate limiting reads client IP from `X-Forwarded-For` /
    /// `X-Real-IP` instead of the peer socket address; enable only when the
    /// service runs behind a trusted reverse proxy.
    pub behind_proxy: bool,
    pub static_dir: String,
}

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState, options: &RouterOptions) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(build_router(state, options))
}

/// Builds the router without path normalization.
///
/// Rate limiting keys on the peer address, so with `login_rate_limit` the
/// router must be served with connect info (see [`crate::server::run`]).
pub fn build_router(state: AppState, options: &RouterOptions) -> Router {
    let protected = web::routes::protected_routes()
        .route_layer(middleware::from_fn(web_auth::layer));

    let login = match (options.login_rate_limit, options.behind_proxy) {
        (false, _) => web::routes::login_routes(),
        (true, false) => web::routes::login_routes().layer(rate_limit::login_layer()),
        (true, true) => {
            web::routes::login_routes().layer(rate_limit::login_layer_behind_proxy())
        }
    };

    let router = Router::new()
        .merge(protected)
        .merge(login)
        .merge(web::routes::public_routes())
        .route("/health", get(health_handler))
        .nest_service("/static", ServeDir::new(&options.static_dir))
        .fallback(not_found_handler)
        .with_state(state)
        .layer(Extension(CsrfCookie::new(
            options.session.signing_key(),
            options.session.secure,
        )));

    session::with_sessions(router, &options.session)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(tracing::layer())
}
