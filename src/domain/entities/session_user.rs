//! Session record for a logged-in user.

use serde::{Deserialize, Serialize};

use super::credentials::Credentials;

/// Server-side session state for an authenticated user.
///
/// Created only after the accounting service confirms the credentials and
/// removed on logout. Lives as long as the browser session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub display_name: String,
}

impl SessionUser {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
        }
    }
}

impl From<&Credentials> for SessionUser {
    fn from(credentials: &Credentials) -> Self {
        Self::new(credentials.display_name())
    }
}
