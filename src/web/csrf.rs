//! CSRF protection for the login form.
//!
//! Double-submit tokens: whenever the form renders, a random token goes into a
//! signed, HTTP-only cookie scoped to the login page and into a hidden form
//! field. A submission is accepted only if the field echoes the cookie. The
//! token never touches the session store, so rendering the form for an
//! anonymous visitor leaves no server-side state behind.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::Rng;
use tower_cookies::cookie::{Key, SameSite};
use tower_cookies::{Cookie, Cookies};

use crate::web::middleware::web_auth::LOGIN_PATH;

/// Name of the cookie holding the token.
pub const CSRF_COOKIE: &str = "tempus_csrf";

/// Name of the hidden form field carrying the token.
pub const CSRF_FIELD: &str = "csrf_token";

/// Issues and checks login form tokens.
///
/// Shared with handlers as an [`axum::Extension`].
#[derive(Clone)]
pub struct CsrfCookie {
    key: Key,
    secure: bool,
}

impl CsrfCookie {
    /// `key` signs the cookie; `secure` sets its `Secure` attribute.
    pub fn new(key: Key, secure: bool) -> Self {
        Self { key, secure }
    }

    /// Generates a new token, sets it as the signed cookie and returns it.
    pub fn issue(&self, cookies: &Cookies) -> String {
        let token = generate_token();

        let cookie = Cookie::build((CSRF_COOKIE, token.clone()))
            .path(LOGIN_PATH)
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .build();
        cookies.signed(&self.key).add(cookie);

        token
    }

    /// Checks `submitted` against the token in the signed cookie.
    ///
    /// Returns `false` when the cookie is missing, its signature does not
    /// verify, or the values differ.
    pub fn verify(&self, cookies: &Cookies, submitted: &str) -> bool {
        cookies
            .signed(&self.key)
            .get(CSRF_COOKIE)
            .is_some_and(|cookie| {
                !submitted.is_empty()
                    && constant_time_eq(cookie.value().as_bytes(), submitted.as_bytes())
            })
    }

    /// Drops the token cookie once the form has served its purpose.
    pub fn clear(&self, cookies: &Cookies) {
        cookies.remove(Cookie::build(CSRF_COOKIE).path(LOGIN_PATH).build());
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
