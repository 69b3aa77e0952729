//! Shared fixtures: real services over an in-memory SQLite database, and an
//! identity gateway that trusts the bearer token as the principal id.

use std::sync::Arc;

use async_trait::async_trait;
use domains::{
    Credentials, IdentityGateway, Principal, Result, Thread, ThreadRepository, User,
    UserRepository, ViewInvalidator,
};
use services::{
    AddCommentParams, CreateThreadParams, PageAccess, ThreadService, UpdateUserParams, UserService,
};
use storage_adapters::{sqlite::Database, PageCache};
use uuid::Uuid;

/// Treats the bearer token itself as the principal id.
pub struct TokenIdentity;

#[async_trait]
impl IdentityGateway for TokenIdentity {
    async fn current_principal(&self, credentials: &Credentials) -> Result<Option<Principal>> {
        Ok(credentials
            .bearer
            .clone()
            .map(|id| Principal { id }))
    }
}

pub struct Harness {
    pub db: Database,
    pub user_repo: Arc<dyn UserRepository>,
    pub thread_repo: Arc<dyn ThreadRepository>,
    pub cache: Arc<PageCache>,
    pub users: Arc<UserService>,
    pub threads: Arc<ThreadService>,
    pub access: Arc<PageAccess>,
}

impl Harness {
    pub async fn new() -> Self {
        let db = Database::connect("sqlite::memory:", 1)
            .await
            .expect("in-memory database");
        let user_repo: Arc<dyn UserRepository> = Arc::new(db.users());
        let thread_repo: Arc<dyn ThreadRepository> = Arc::new(db.threads());
        let cache = Arc::new(PageCache::new());
        let views: Arc<dyn ViewInvalidator> = cache.clone();

        Self {
            users: Arc::new(UserService::new(
                user_repo.clone(),
                thread_repo.clone(),
                views.clone(),
            )),
            threads: Arc::new(ThreadService::new(
                user_repo.clone(),
                thread_repo.clone(),
                views,
            )),
            access: Arc::new(PageAccess::new(Arc::new(TokenIdentity), user_repo.clone())),
            db,
            user_repo,
            thread_repo,
            cache,
        }
    }

    pub async fn onboard(&self, id: &str, username: &str, name: &str) -> User {
        self.users
            .update_user(UpdateUserParams {
                username: username.into(),
                name: name.into(),
                bio: String::new(),
                image: format!("/img/{id}.png"),
                user_id: id.into(),
                path: services::ONBOARDING_PATH.into(),
            })
            .await
            .expect("onboard user")
    }

    pub async fn post(&self, author: &str, text: &str) -> Thread {
        self.threads
            .create_thread(CreateThreadParams {
                text: text.into(),
                author: author.into(),
                community_id: None,
                path: "/".into(),
            })
            .await
            .expect("create thread")
    }

    pub async fn reply(&self, parent: Uuid, author: &str, text: &str) -> Thread {
        self.threads
            .add_comment_to_thread(AddCommentParams {
                thread_id: parent,
                text: text.into(),
                user_id: author.into(),
                path: format!("/threads/{parent}"),
            })
            .await
            .expect("add comment")
    }

    #[cfg(feature = "web-axum")]
    pub fn app(&self) -> axum::Router {
        api_adapters::router(api_adapters::AppState {
            users: self.users.clone(),
            threads: self.threads.clone(),
            access: self.access.clone(),
            cache: self.cache.clone(),
            feed: api_adapters::FeedSettings::default(),
        })
    }
}
