use askama::Template;
use askama_web::WebTemplate;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::any::Any;

#[derive(Template, WebTemplate)]
#[template(path = "404.html")]
struct NotFoundTemplate {
    path: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "500.html")]
struct InternalErrorTemplate {}

/// Errors surfaced by web handlers, rendered as HTML error pages.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Page not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(e: tower_sessions::session::Error) -> Self {
        AppError::internal(format!("session store: {e}"))
    }
}

impl From<askama::Error> for AppError {
    fn from(e: askama::Error) -> Self {
        AppError::internal(format!("template render: {e}"))
    }
}

/// Turns a handler panic into the 500 page.
///
/// Used with `tower_http::catch_panic::CatchPanicLayer::custom`.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());

    AppError::internal(format!("handler panicked: {message}")).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(path) => {
                (StatusCode::NOT_FOUND, NotFoundTemplate { path }).into_response()
            }
            AppError::Internal(message) => {
                tracing::error!(error = %message, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, InternalErrorTemplate {}).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status() {
        let response = AppError::not_found("/nope.html").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_status() {
        let response = AppError::internal("boom").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_panic_response_renders_error_page() {
        let response = panic_response(Box::new("secret detail"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = panic_response(Box::new(String::from("owned")));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_message_not_rendered() {
        let page = InternalErrorTemplate {}.render().unwrap();
        assert!(!page.contains("boom"));
    }
}
