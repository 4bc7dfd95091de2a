use std::sync::Arc;

use crate::application::services::AuthService;

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    /// Company identifier sent with every login; deployment configuration.
    pub company: Arc<str>,
}

impl AppState {
    pub fn new(auth_service: Arc<AuthService>, company: impl Into<Arc<str>>) -> Self {
        Self {
            auth_service,
            company: company.into(),
        }
    }
}
