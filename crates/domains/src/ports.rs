//! # Core Traits (Ports)
//!
//! Adapters implement these; services only ever hold `Arc<dyn Port>`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    AuthorSummary, Credentials, Principal, ProfileUpdate, SortOrder, Thread, User, UserFilter,
};

/// Persistence contract for user documents.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert-or-update keyed by identity id. Sets `onboarded` on every call
    /// and keeps the original `created_at` on update.
    async fn upsert_profile(&self, profile: &ProfileUpdate) -> Result<User>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;

    /// Author projections for the given ids. Unknown ids are skipped.
    async fn find_summaries(&self, ids: &[String]) -> Result<Vec<AuthorSummary>>;

    /// Users matching `filter`, ordered by `created_at` then id.
    async fn search(
        &self,
        filter: &UserFilter,
        sort: SortOrder,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<User>>;

    async fn count(&self, filter: &UserFilter) -> Result<u64>;
}

/// Persistence contract for thread documents.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ThreadRepository: Send + Sync {
    async fn insert(&self, thread: &Thread) -> Result<()>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Thread>>;

    /// Every thread written by `author_id`, oldest first.
    async fn find_by_author(&self, author_id: &str) -> Result<Vec<Thread>>;

    /// Direct replies to any of `parent_ids`, oldest first.
    async fn find_children(&self, parent_ids: &[Uuid]) -> Result<Vec<Thread>>;

    /// Direct replies to any of `parent_ids` not written by `author_id`,
    /// newest first.
    async fn find_replies_from_others(
        &self,
        parent_ids: &[Uuid],
        author_id: &str,
    ) -> Result<Vec<Thread>>;

    /// Threads without a parent, newest first.
    async fn find_top_level(&self, offset: u64, limit: u64) -> Result<Vec<Thread>>;

    async fn count_top_level(&self) -> Result<u64>;
}

/// Resolves the caller of the current request.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait IdentityGateway: Send + Sync {
    /// `Ok(None)` when the request is anonymous or its credentials are
    /// not acceptable.
    async fn current_principal(&self, credentials: &Credentials) -> Result<Option<Principal>>;
}

/// Path-keyed invalidation of rendered views.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait ViewInvalidator: Send + Sync {
    fn revalidate(&self, path: &str);
}
