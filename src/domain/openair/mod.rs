//! Wire format of the OpenAir XML API.
//!
//! - [`request`] - builds the outbound request document
//! - [`response`] - parses replies into a generic value tree

pub mod request;
pub mod response;

pub use request::{ApplicationIdentity, ReadCommand, ReadFilter, RequestDocument, TaskQuery};
pub use response::{auth_status, parse_tree};
