//! # api-adapters
//!
//! Server-rendered pages over the services. Templates are always compiled;
//! the axum router comes with the `web-axum` feature.

pub mod views;

#[cfg(feature = "web-axum")]
pub mod http;

#[cfg(feature = "web-axum")]
pub use http::{router, AppState, FeedSettings, SESSION_COOKIE};
