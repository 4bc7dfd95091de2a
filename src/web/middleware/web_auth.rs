//! Session-based login guard for protected pages.

use axum::{
    extract::Request,
    http::Uri,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::web::session;

/// Path of the login page anonymous visitors are sent to.
pub const LOGIN_PATH: &str = "/login.html";

/// Lets the request through only when the session holds a logged-in user.
///
/// # Authentication Flow
///
/// 1. Read the session record via [`session::current_user`]
/// 2. If present, continue to the handler
/// 3. If absent, redirect to `/login.html?next=<original path>`
///
/// Unlike an API guard returning `401 Unauthorized`, this redirects to the
/// login page, which sends the user back to `next` after logging in.
///
/// # Example
///
/// ```rust,ignore
/// use axum::{Router, routing::get, middleware};
/// use crate::web::middleware::web_auth;
///
/// let protected = Router::new()
///     .route("/agile_board.html", get(agile_board))
///     .route_layer(middleware::from_fn(web_auth::layer));
/// ```
///
/// # Errors
///
/// Returns the 500 page if the session store fails.
pub async fn layer(session: Session, req: Request, next: Next) -> Result<Response, Response> {
    match session::current_user(&session).await {
        Ok(Some(_)) => Ok(next.run(req).await),
        Ok(None) => Err(Redirect::to(&login_redirect(req.uri())).into_response()),
        Err(e) => Err(e.into_response()),
    }
}

/// Builds the login URL that returns the user to `uri` afterwards.
pub fn login_redirect(uri: &Uri) -> String {
    let target = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
    format!("{LOGIN_PATH}?next={encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_redirect_encodes_path() {
        let uri: Uri = "/agile_board.html".parse().unwrap();
        assert_eq!(login_redirect(&uri), "/login.html?next=%2Fagile_board.html");
    }

    #[test]
    fn test_login_redirect_keeps_query() {
        let uri: Uri = "/article.html?id=3&x=y".parse().unwrap();
        assert_eq!(
            login_redirect(&uri),
            "/login.html?next=%2Farticle.html%3Fid%3D3%26x%3Dy"
        );
    }
}
