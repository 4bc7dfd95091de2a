//! # Tempus Fugit
//!
//! A server-rendered timesheet portal built with Axum and Askama. Users log in
//! with their OpenAir credentials; the login is checked against the OpenAir
//! XML API and remembered in a cookie-backed session.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Credentials, session record, OpenAir wire format, transport trait
//! - **Application Layer** ([`application`]) - The authentication service
//! - **Infrastructure Layer** ([`infrastructure`]) - HTTP transport to the accounting service
//! - **API Layer** ([`api`]) - Health endpoint and shared middleware
//! - **Web Layer** ([`web`]) - Pages, login flow, sessions
//!
//! ## Quick Start
//!
//! ```bash
//! export OPENAIR_API_KEY="..."
//! export SESSION_SECRET="$(openssl rand -hex 32)"
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;

pub mod config;
pub mod server;

pub mod routes;
pub mod web;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for the admin CLI
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::AuthService;
    pub use crate::domain::entities::{Credentials, SessionUser};
    pub use crate::domain::gateway::{AccountingTransport, AuthOutcome, GatewayError};
    pub use crate::domain::openair::{ApplicationIdentity, TaskQuery};
    pub use crate::error::AppError;
    pub use crate::routes::{RouterOptions, app_router, build_router};
    pub use crate::state::AppState;
}
