//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer and by
//! `tower-sessions`.
//!
//! # Modules
//!
//! - [`http_transport`] - reqwest-based transport for the accounting service
//! - [`session_store`] - in-memory session store with expired-record purging

pub mod http_transport;
pub mod session_store;

pub use http_transport::HttpTransport;
pub use session_store::ExpiringMemoryStore;
