//! Domain layer containing business entities and the accounting service contract.
//!
//! # Architecture
//!
//! - [`entities`] - Credentials and the session record
//! - [`gateway`] - Transport trait, auth outcome and gateway errors
//! - [`openair`] - Request document encoding and reply parsing
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure or presentation layers
//! - The transport trait is implemented by the infrastructure layer
//! - The login flow is orchestrated in [`crate::application::services`]

pub mod entities;
pub mod gateway;
pub mod openair;
