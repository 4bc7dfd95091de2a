//! Application layer services implementing business logic.
//!
//! Services consume domain traits and provide a clean API for HTTP handlers
//! and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::auth_service::AuthService`] - Login against the accounting service

pub mod services;
