//! Fallback handler for unknown paths.

use axum::http::Uri;

use crate::error::AppError;

/// Renders the 404 page for any path without a route.
pub async fn not_found_handler(uri: Uri) -> AppError {
    AppError::not_found(uri.path())
}
