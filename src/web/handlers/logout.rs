//! Logout handler.

use axum::response::Redirect;
use tower_sessions::Session;

use crate::error::AppError;
use crate::web::session;

/// Ends the session and returns to the landing page.
///
/// # Endpoint
///
/// `GET /logout`
///
/// Always clears the session, whether or not a user was logged in.
pub async fn logout_handler(session: Session) -> Result<Redirect, AppError> {
    if let Some(user) = session::current_user(&session).await? {
        tracing::info!(user = %user.display_name, "User logged out");
    }
    session::sign_out(&session).await?;
    Ok(Redirect::to("/index"))
}
