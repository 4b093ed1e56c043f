//! App layer - central state management and command processing
//!
//! The App actor receives UI events and API results, updates the per-kind
//! synchronizer state, and emits API commands and render state.

pub mod actor;
pub mod commands;
pub mod state;

pub use actor::AppActor;
pub use state::AppState;
