// State management module
// Holds the shared handles every request handler needs

/// Shared handler state
pub mod app_state;

pub use app_state::AppState;
