//! Landing page handler.

use askama::Template;
use axum::response::Html;
use tower_sessions::Session;

use crate::error::AppError;
use crate::web::handlers::render;
use crate::web::session;

/// Template for the landing page.
///
/// Renders `templates/index.html` with the display name of the logged-in
/// user (if any) and pending flash messages.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    username: Option<String>,
    flashes: Vec<String>,
}

/// Renders the landing page.
///
/// # Endpoint
///
/// `GET|POST /`, `/index`, `/index.html`
pub async fn index_handler(session: Session) -> Result<Html<String>, AppError> {
    let username = session::current_user(&session)
        .await?
        .map(|user| user.display_name);
    let flashes = session::take_flashes(&session).await?;

    render(&IndexTemplate { username, flashes })
}
