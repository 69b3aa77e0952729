//! # Domain Models
//!
//! Users are keyed by the opaque identity id handed out by the identity
//! provider. Threads use UUID v4 ids.
//!
//! Relationships are never stored as arrays: a user's threads are the
//! threads whose `author_id` points at them, and a thread's children are the
//! threads whose `parent_id` points at it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identity id issued by the identity provider
    pub id: String,
    /// Always stored lowercase
    pub username: String,
    pub name: String,
    pub bio: String,
    /// Avatar image reference (URL or storage key)
    pub image: String,
    pub onboarded: bool,
    pub created_at: DateTime<Utc>,
}

/// The minimal author projection attached to populated threads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: String,
    pub name: String,
    pub image: String,
}

impl From<&User> for AuthorSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            image: user.image.clone(),
        }
    }
}

/// Fields written by a profile save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub user_id: String,
    pub username: String,
    pub name: String,
    pub bio: String,
    pub image: String,
}

impl ProfileUpdate {
    /// Returns a copy with the username lowercased, as stored.
    pub fn normalized(mut self) -> Self {
        self.username = self.username.to_lowercase();
        self
    }
}

/// A post. Top-level when `parent_id` is `None`, a reply otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: Uuid,
    pub text: String,
    pub author_id: String,
    pub parent_id: Option<Uuid>,
    pub community_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Thread {
    pub fn top_level(text: String, author_id: String, community_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            author_id,
            parent_id: None,
            community_id,
            created_at: Utc::now(),
        }
    }

    pub fn reply(parent: &Thread, text: String, author_id: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            author_id,
            parent_id: Some(parent.id),
            community_id: parent.community_id.clone(),
            created_at: Utc::now(),
        }
    }

    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// Sort direction over `created_at`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[serde(alias = "ascending", alias = "1")]
    Asc,
    #[default]
    #[serde(alias = "descending", alias = "-1")]
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Selection over the user collection shared by listing and counting.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserFilter {
    /// Never returned, usually the caller
    pub exclude_id: String,
    /// Case-insensitive substring matched against username OR name
    pub search: Option<String>,
}

/// One page of an offset-paginated listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub is_next: bool,
}

/// A populated thread whose own replies are left as unexpanded ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadNode {
    #[serde(flatten)]
    pub thread: Thread,
    pub author: AuthorSummary,
    pub children: Vec<Uuid>,
}

/// One of a user's threads with its direct replies expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserThread {
    #[serde(flatten)]
    pub thread: Thread,
    pub children: Vec<ThreadNode>,
}

/// A user together with their threads, expanded two levels deep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserPosts {
    #[serde(flatten)]
    pub user: User,
    pub threads: Vec<UserThread>,
}

/// A feed entry: the thread, its author and its direct replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadCard {
    #[serde(flatten)]
    pub thread: Thread,
    pub author: AuthorSummary,
    pub children: Vec<ThreadNode>,
}

/// A thread page: replies and replies-of-replies, all with authors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadDetail {
    #[serde(flatten)]
    pub thread: Thread,
    pub author: AuthorSummary,
    pub children: Vec<ThreadCard>,
}

/// The authenticated identity behind a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
}

/// Whatever the request carried that may identify the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub bearer: Option<String>,
}
