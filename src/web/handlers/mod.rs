//! HTML template rendering handlers for the web UI.

mod errors;
mod index;
mod login;
mod logout;
pub mod pages;

pub use errors::not_found_handler;
pub use index::index_handler;
pub use login::{
    INVALID_CREDENTIALS_MESSAGE, LOGGED_IN_MESSAGE, LoginForm, SESSION_EXPIRED_MESSAGE,
    login_page_handler, login_submit_handler,
};
pub use logout::logout_handler;

use askama::Template;
use axum::response::Html;

use crate::error::AppError;

/// Renders `template`; a render failure becomes the 500 page.
pub(crate) fn render(template: &impl Template) -> Result<Html<String>, AppError> {
    Ok(Html(template.render()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::fmt;

    struct Unprintable;

    impl fmt::Display for Unprintable {
        fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[derive(Template)]
    #[template(source = "<p>{{ value }}</p>", ext = "html")]
    struct Broken {
        value: Unprintable,
    }

    #[derive(Template)]
    #[template(source = "<p>{{ value }}</p>", ext = "html")]
    struct Fine {
        value: &'static str,
    }

    #[test]
    fn test_render_ok() {
        let html = render(&Fine { value: "hello" }).unwrap();
        assert_eq!(html.0, "<p>hello</p>");
    }

    #[tokio::test]
    async fn test_render_failure_shows_error_page() {
        let err = render(&Broken { value: Unprintable }).unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("Internal server error"));
    }
}
