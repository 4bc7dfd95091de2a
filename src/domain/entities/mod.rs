//! Core domain entities.
//!
//! Entities are plain data structures without I/O.
//!
//! # Entity Types
//!
//! - [`Credentials`] - Username, password and company for one login attempt
//! - [`SessionUser`] - The session record stored after a successful login

pub mod credentials;
pub mod session_user;

pub use credentials::{Credentials, display_name_of};
pub use session_user::SessionUser;
