//! HTTP API surface.

pub mod routes;
pub mod tasks;

pub use routes::{app, serve, AppState};
