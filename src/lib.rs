//! Camera Upload Server Library
//!
//! This library exposes modules for testing and external use.
//! The main binary is in `src/main.rs`.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
/// Application state management
///
/// Holds the image service and static asset locations shared by handlers.
pub mod state;
pub mod storage;
