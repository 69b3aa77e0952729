//! # HTTP surface
//!
//! Route table, shared state and middleware for the axum server.

mod error;
mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use services::{PageAccess, ThreadService, UserService};
use storage_adapters::PageCache;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

pub use error::ApiError;
pub use handlers::SESSION_COOKIE;

/// Page sizes used by the listing pages.
#[derive(Debug, Clone, Copy)]
pub struct FeedSettings {
    pub page_size: u32,
    pub users_page_size: u32,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            page_size: 30,
            users_page_size: 20,
        }
    }
}

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub threads: Arc<ThreadService>,
    pub access: Arc<PageAccess>,
    pub cache: Arc<PageCache>,
    pub feed: FeedSettings,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/search", get(handlers::search))
        .route("/activity", get(handlers::activity))
        .route("/onboarding", post(handlers::onboard))
        .route(
            "/profile/edit",
            get(handlers::edit_profile).post(handlers::save_profile),
        )
        .route("/profile/{id}", get(handlers::profile))
        .route("/threads", post(handlers::create_thread))
        .route("/threads/{id}", get(handlers::thread))
        .route("/threads/{id}/comments", post(handlers::comment))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
