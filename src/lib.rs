//! Account Kit bearer-token authentication for axum services.
//!
//! The reusable part lives in [`services::accountkit`]; the rest is the
//! HTTP shell that mounts it behind `/api/v1`.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
