//! Web layer for the browser UI.
//!
//! Serves the landing page, the login flow and the static template pages.
//! Uses Askama templates for server-side rendering.
//!
//! # Modules
//!
//! - [`handlers`] - Template rendering handlers
//! - [`middleware`] - Login guard
//! - [`routes`] - Route configuration
//! - [`session`] - Session layer and session record helpers
//! - [`csrf`] - CSRF tokens for the login form

pub mod csrf;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod session;
