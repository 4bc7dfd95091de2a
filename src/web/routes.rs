//! Web UI route configuration.

use crate::state::AppState;
use crate::web::handlers::pages::{protected_page_routes, public_page_routes};
use crate::web::handlers::{
    index_handler, login_page_handler, login_submit_handler, logout_handler,
};
use axum::{Router, routing::get};

/// Pages requiring a logged-in session.
///
/// Protected via [`crate::web::middleware::web_auth`] (session cookie).
///
/// # Endpoints
///
/// - `GET /agile_board.html`, `/article.html`, `/layouts.html`
pub fn protected_routes() -> Router<AppState> {
    protected_page_routes()
}

/// Login form routes, kept apart so they can be rate limited.
///
/// # Endpoints
///
/// - `GET /login.html` - Login form
/// - `POST /login.html` - Login submission
pub fn login_routes() -> Router<AppState> {
    Router::new().route(
        "/login.html",
        get(login_page_handler).post(login_submit_handler),
    )
}

/// Public routes without authentication.
///
/// # Endpoints
///
/// - `GET|POST /`, `/index`, `/index.html` - Landing page
/// - `GET /logout` - End the session
/// - `GET /<page>.html` - Static template pages
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index_handler).post(index_handler))
        .route("/index", get(index_handler).post(index_handler))
        .route("/index.html", get(index_handler).post(index_handler))
        .route("/logout", get(logout_handler))
        .merge(public_page_routes())
}
