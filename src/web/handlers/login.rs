//! Login page handlers.

use askama::Template;
use axum::{
    Extension, Form,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_cookies::Cookies;
use tower_sessions::Session;
use validator::{Validate, ValidationErrors};

use crate::domain::entities::{Credentials, SessionUser};
use crate::domain::gateway::AuthOutcome;
use crate::error::AppError;
use crate::state::AppState;
use crate::web::middleware::web_auth::LOGIN_PATH;
use crate::web::csrf::CsrfCookie;
use crate::web::handlers::render;
use crate::web::session;

/// Shown for every failed login, whatever the cause.
pub const INVALID_CREDENTIALS_MESSAGE: &str =
    "Sorry! Your password or username is invalid. Kindly try again..";

/// Shown when the CSRF token is missing or stale.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please try again.";

/// Flashed on the landing page after a successful login.
pub const LOGGED_IN_MESSAGE: &str = "Logged in successfully.";

/// Where users land after login when no `next` is given.
pub const DEFAULT_LANDING: &str = "/index";

/// Login form fields.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(
        length(min = 1, message = "This field is required."),
        email(message = "Invalid email address.")
    )]
    pub username: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub password: String,

    #[serde(default)]
    pub csrf_token: String,
}

/// Query parameters of the login page.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

impl LoginQuery {
    /// Returns `next` if it is a same-site relative path.
    pub fn safe_next(&self) -> Option<&str> {
        self.next.as_deref().filter(|next| is_safe_next(next))
    }
}

/// Template for the login page.
///
/// Renders `templates/login.html` with:
/// - Username and password inputs
/// - Hidden CSRF token
/// - Field errors and the failure message, if any
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    action: String,
    csrf_token: String,
    username: String,
    username_error: Option<String>,
    password_error: Option<String>,
    error: Option<String>,
}

impl LoginTemplate {
    fn new(csrf_token: String, query: &LoginQuery) -> Self {
        let action = match query.safe_next() {
            Some(next) => {
                let encoded: String =
                    url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
                format!("{LOGIN_PATH}?next={encoded}")
            }
            None => LOGIN_PATH.to_string(),
        };

        Self {
            action,
            csrf_token,
            username: String::new(),
            username_error: None,
            password_error: None,
            error: None,
        }
    }
}

/// Renders the login form.
///
/// # Endpoint
///
/// `GET /login.html`
///
/// Sets the CSRF cookie but never touches the session.
pub async fn login_page_handler(
    cookies: Cookies,
    Extension(csrf): Extension<CsrfCookie>,
    Query(query): Query<LoginQuery>,
) -> Result<Html<String>, AppError> {
    render(&LoginTemplate::new(csrf.issue(&cookies), &query))
}

/// Processes a login submission.
///
/// # Endpoint
///
/// `POST /login.html[?next=/path]`
///
/// # Flow
///
/// 1. Reject a missing or stale CSRF token (400, form re-rendered)
/// 2. Validate fields; on failure re-render with field messages
/// 3. Ask the accounting service exactly once
/// 4. On success rotate the session, store the display name and redirect to
///    `next` (if safe) or `/index`; the welcome flash is queued only for
///    `/index`, the one page that shows flashes
/// 5. Otherwise re-render with the generic failure message
///
/// Steps 1 and 2 never contact the accounting service, and only step 4
/// writes to the session.
pub async fn login_submit_handler(
    State(state): State<AppState>,
    session: Session,
    cookies: Cookies,
    Extension(csrf): Extension<CsrfCookie>,
    Query(query): Query<LoginQuery>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if !csrf.verify(&cookies, &form.csrf_token) {
        tracing::warn!("Login form submitted with a missing or stale CSRF token");
        let mut page = LoginTemplate::new(csrf.issue(&cookies), &query);
        page.username = form.username;
        page.error = Some(SESSION_EXPIRED_MESSAGE.to_string());
        return Ok((StatusCode::BAD_REQUEST, render(&page)?).into_response());
    }

    if let Err(errors) = form.validate() {
        let mut page = LoginTemplate::new(csrf.issue(&cookies), &query);
        page.username_error = field_message(&errors, "username");
        page.password_error = field_message(&errors, "password");
        page.username = form.username;
        return Ok(render(&page)?.into_response());
    }

    let credentials = Credentials::new(form.username, form.password, &*state.company);

    let authorized = match state.auth_service.authenticate(&credentials).await {
        Ok(AuthOutcome::Authorized) => true,
        Ok(AuthOutcome::Unauthorized { status }) => {
            tracing::info!(
                user = %credentials.username,
                status = status.as_deref().unwrap_or("<missing>"),
                "Login rejected by accounting service"
            );
            false
        }
        Err(e) => {
            tracing::warn!(
                user = %credentials.username,
                kind = e.kind(),
                error = %e,
                "Login failed: accounting service exchange error"
            );
            false
        }
    };

    if !authorized {
        let mut page = LoginTemplate::new(csrf.issue(&cookies), &query);
        page.username = credentials.username;
        page.error = Some(INVALID_CREDENTIALS_MESSAGE.to_string());
        return Ok(render(&page)?.into_response());
    }

    let user = SessionUser::from(&credentials);
    tracing::info!(user = %user.display_name, "User logged in");

    session::sign_in(&session, user).await?;
    csrf.clear(&cookies);

    let target = query.safe_next().unwrap_or(DEFAULT_LANDING);
    if target == DEFAULT_LANDING {
        session::flash(&session, LOGGED_IN_MESSAGE).await?;
    }
    Ok(Redirect::to(target).into_response())
}

/// Returns the first validation message for `field`.
fn field_message(errors: &ValidationErrors, field: &str) -> Option<String> {
    errors
        .field_errors()
        .get(field)
        .and_then(|list| list.first())
        .map(|error| match &error.message {
            Some(message) => message.to_string(),
            None => error.code.to_string(),
        })
}

/// A redirect target is safe when it is a path on this site.
///
/// Rejects absolute URLs, protocol-relative `//host` and backslash variants
/// browsers treat as `//`.
fn is_safe_next(next: &str) -> bool {
    next.starts_with('/')
        && !next.starts_with("//")
        && !next.contains('\\')
        && !next.chars().any(char::is_control)
}
