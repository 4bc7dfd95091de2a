//! Login credentials submitted through the login form.

use std::fmt;

/// Credentials for one login attempt against the accounting service.
///
/// Lives only for the duration of a single request and is never persisted.
/// The `company` field is deployment configuration, not user input.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub company: String,
}

impl Credentials {
    /// Creates a new credentials tuple.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        company: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            company: company.into(),
        }
    }

    /// Returns the name shown to the user once logged in.
    ///
    /// This is the local part of an email-like username (everything before the
    /// first `@`), or the whole username when it contains no `@`.
    pub fn display_name(&self) -> &str {
        display_name_of(&self.username)
    }
}

// Keeps the password out of logs and panic messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .field("company", &self.company)
            .finish()
    }
}

/// Returns the local part of an email-like identifier.
pub fn display_name_of(username: &str) -> &str {
    username.split('@').next().unwrap_or(username)
}
