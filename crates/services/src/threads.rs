//! # ThreadService
//!
//! Posting, replying, the paginated home feed and the single-thread view.

use std::sync::Arc;

use domains::{
    DomainError, Page, Thread, ThreadCard, ThreadDetail, ThreadRepository, UserRepository,
    ViewInvalidator,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{OperationExt, Result};
use crate::pagination::{has_next, PageParams};
use crate::population::Populator;

#[derive(Debug, Clone)]
pub struct CreateThreadParams {
    pub text: String,
    pub author: String,
    pub community_id: Option<String>,
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct AddCommentParams {
    pub thread_id: Uuid,
    pub text: String,
    pub user_id: String,
    pub path: String,
}

pub struct ThreadService {
    users: Arc<dyn UserRepository>,
    threads: Arc<dyn ThreadRepository>,
    views: Arc<dyn ViewInvalidator>,
}

impl ThreadService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        threads: Arc<dyn ThreadRepository>,
        views: Arc<dyn ViewInvalidator>,
    ) -> Self {
        Self { users, threads, views }
    }

    fn populator(&self) -> Populator<'_> {
        Populator {
            users: self.users.as_ref(),
            threads: self.threads.as_ref(),
        }
    }

    async fn require_author(&self, user_id: &str) -> std::result::Result<(), DomainError> {
        match self.users.find_by_id(user_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("User", user_id)),
        }
    }

    #[instrument(skip(self, params), fields(author = %params.author, path = %params.path))]
    pub async fn create_thread(&self, params: CreateThreadParams) -> Result<Thread> {
        const OP: &str = "create thread";

        let text = validate_text(&params.text).during(OP)?;
        self.require_author(&params.author).await.during(OP)?;

        let thread = Thread::top_level(text, params.author, params.community_id);
        self.threads.insert(&thread).await.during(OP)?;
        info!(thread_id = %thread.id, "thread created");

        self.views.revalidate(&params.path);
        Ok(thread)
    }

    #[instrument(skip(self, params), fields(thread_id = %params.thread_id, user_id = %params.user_id))]
    pub async fn add_comment_to_thread(&self, params: AddCommentParams) -> Result<Thread> {
        const OP: &str = "add comment to thread";

        let text = validate_text(&params.text).during(OP)?;
        let parent = self
            .threads
            .find_by_id(params.thread_id)
            .await
            .during(OP)?
            .ok_or_else(|| DomainError::not_found("Thread", params.thread_id.to_string()))
            .during(OP)?;
        self.require_author(&params.user_id).await.during(OP)?;

        let reply = Thread::reply(&parent, text, params.user_id);
        self.threads.insert(&reply).await.during(OP)?;
        info!(reply_id = %reply.id, "comment added");

        self.views.revalidate(&params.path);
        Ok(reply)
    }

    /// Top-level threads, newest first, with authors and direct replies.
    #[instrument(skip(self))]
    pub async fn fetch_posts(&self, page_number: u32, page_size: u32) -> Result<Page<ThreadCard>> {
        const OP: &str = "fetch posts";

        let page = PageParams::new(page_number, page_size).during(OP)?;
        let total = self.threads.count_top_level().await.during(OP)?;
        let threads = self
            .threads
            .find_top_level(page.skip(), page.limit())
            .await
            .during(OP)?;
        let is_next = has_next(total, page.skip(), threads.len());
        let items = self.populator().cards(threads).await.during(OP)?;

        Ok(Page { items, is_next })
    }

    /// The thread, its replies and their replies, each with its author.
    #[instrument(skip(self))]
    pub async fn fetch_thread_by_id(&self, thread_id: Uuid) -> Result<Option<ThreadDetail>> {
        const OP: &str = "fetch thread";

        let Some(thread) = self.threads.find_by_id(thread_id).await.during(OP)? else {
            return Ok(None);
        };

        let populator = self.populator();
        let author = populator
            .authors(std::slice::from_ref(&thread))
            .await
            .during(OP)?
            .remove(&thread.author_id)
            .ok_or_else(|| DomainError::not_found("User", thread.author_id.clone()))
            .during(OP)?;
        let replies = self
            .threads
            .find_children(&[thread.id])
            .await
            .during(OP)?;
        let children = populator.cards(replies).await.during(OP)?;

        Ok(Some(ThreadDetail { thread, author, children }))
    }
}

fn validate_text(text: &str) -> std::result::Result<String, DomainError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("thread text is required"));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::{ErrorKind, MockThreadRepository, MockUserRepository, MockViewInvalidator, User};
    use mockall::predicate::eq;

    fn author(id: &str) -> User {
        User {
            id: id.into(),
            username: id.into(),
            name: id.into(),
            bio: String::new(),
            image: String::new(),
            onboarded: true,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_thread_stores_trimmed_text_and_revalidates_path() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .with(eq("u1"))
            .returning(|id| Ok(Some(author(id))));
        let mut threads = MockThreadRepository::new();
        threads
            .expect_insert()
            .withf(|t| t.text == "hello" && t.author_id == "u1" && t.parent_id.is_none())
            .times(1)
            .returning(|_| Ok(()));
        let mut views = MockViewInvalidator::new();
        views.expect_revalidate().with(eq("/")).times(1).return_const(());

        let service = ThreadService::new(Arc::new(users), Arc::new(threads), Arc::new(views));
        let thread = service
            .create_thread(CreateThreadParams {
                text: "  hello ".into(),
                author: "u1".into(),
                community_id: None,
                path: "/".into(),
            })
            .await
            .unwrap();
        assert_eq!(thread.text, "hello");
    }

    #[tokio::test]
    async fn comment_on_missing_thread_is_not_found() {
        let mut threads = MockThreadRepository::new();
        threads.expect_find_by_id().returning(|_| Ok(None));
        threads.expect_insert().never();
        let mut views = MockViewInvalidator::new();
        views.expect_revalidate().never();

        let service = ThreadService::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(threads),
            Arc::new(views),
        );
        let err = service
            .add_comment_to_thread(AddCommentParams {
                thread_id: Uuid::new_v4(),
                text: "reply".into(),
                user_id: "u1".into(),
                path: "/threads/x".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.operation, "add comment to thread");
    }

    #[tokio::test]
    async fn fetch_posts_rejects_page_zero() {
        let service = ThreadService::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(MockThreadRepository::new()),
            Arc::new(MockViewInvalidator::new()),
        );
        let err = service.fetch_posts(0, 30).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    }
}
