//! API layer - the transport adapter for the backend REST service
//!
//! The API actor receives backend commands and sends back typed results.

pub mod actor;
pub mod client;
pub mod error;

pub use actor::ApiActor;
pub use client::ApiClient;
pub use error::ApiError;
