//! # Apidesk
//!
//! A terminal admin console for API artifacts stored behind a REST backend:
//! Postman-style collections, individual requests and OpenAPI specs.
//!
//! ## Features
//! - Browse, edit, save and delete all three entity kinds
//! - Key-value editing for headers, query params and form bodies
//! - Payload editing per body mode (raw, formdata, urlencoded)
//! - Clone and create requests, with optional collection association
//! - Import/export of collections and OpenAPI specs
//! - Backend health check
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (Ratatui) - synchronous
//! - App Layer (one generic synchronizer per entity kind)
//! - API Layer (Tokio + reqwest transport adapter)

pub mod api;
pub mod app;
pub mod config;
pub mod constants;
pub mod kv;
pub mod messages;
pub mod models;
pub mod ui;

// Re-export commonly used types
pub use api::{ApiActor, ApiClient, ApiError};
pub use app::{AppActor, AppState};
pub use config::Config;
pub use kv::{KvColumn, KvEditor, KvRow};
pub use messages::{ApiCommand, ApiResult, RenderState, UiEvent};
pub use models::{
    ApiRequest, BodyModel, Collection, FormField, HealthStatus, HttpMethod, NewRequest,
    OpenApiSpec, Resource, ResourceKind,
};
