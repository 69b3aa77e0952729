//! # UserService
//!
//! Profile writes, user lookups, the user directory and the activity feed.

use std::sync::Arc;

use domains::{
    DomainError, Page, ProfileUpdate, SortOrder, ThreadNode, ThreadRepository, User, UserFilter,
    UserPosts, UserRepository, UserThread, ViewInvalidator,
};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::{OperationExt, Result};
use crate::pagination::{has_next, PageParams, DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE};
use crate::population::{group_nodes, Populator};

/// The only route whose profile saves invalidate a cached view.
pub const PROFILE_EDIT_PATH: &str = "/profile/edit";

#[derive(Debug, Clone)]
pub struct UpdateUserParams {
    pub username: String,
    pub name: String,
    pub bio: String,
    pub image: String,
    pub user_id: String,
    /// Route the save was submitted from
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct FetchUsersParams {
    /// Excluded from the results
    pub user_id: String,
    pub search_string: String,
    pub page_number: u32,
    pub page_size: u32,
    pub sort_by: SortOrder,
}

impl FetchUsersParams {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            search_string: String::new(),
            page_number: DEFAULT_PAGE_NUMBER,
            page_size: DEFAULT_PAGE_SIZE,
            sort_by: SortOrder::Desc,
        }
    }
}

pub struct UserService {
    users: Arc<dyn UserRepository>,
    threads: Arc<dyn ThreadRepository>,
    views: Arc<dyn ViewInvalidator>,
}

impl UserService {
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

    /// Creates or updates the profile for `user_id` and marks it onboarded.
    #[instrument(skip(self, params), fields(user_id = %params.user_id, path = %params.path))]
    pub async fn update_user(&self, params: UpdateUserParams) -> Result<User> {
        const OP: &str = "create/update user";

        validate_profile(&params).during(OP)?;

        let profile = ProfileUpdate {
            user_id: params.user_id,
            username: params.username,
            name: params.name,
            bio: params.bio,
            image: params.image,
        }
        .normalized();

        let user = self.users.upsert_profile(&profile).await.during(OP)?;
        info!(username = %user.username, "profile saved");

        if params.path == PROFILE_EDIT_PATH {
            self.views.revalidate(&params.path);
        }

        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn fetch_user(&self, user_id: &str) -> Result<Option<User>> {
        self.users.find_by_id(user_id).await.during("fetch user")
    }

    /// The user with their threads, each thread's direct replies and each
    /// reply's author. Replies of replies stay as ids.
    #[instrument(skip(self))]
    pub async fn fetch_user_posts(&self, user_id: &str) -> Result<Option<UserPosts>> {
        const OP: &str = "fetch user threads";

        let Some(user) = self.users.find_by_id(user_id).await.during(OP)? else {
            return Ok(None);
        };

        let authored = self.threads.find_by_author(&user.id).await.during(OP)?;
        let populator = self.populator();
        let replies = populator.children_of(&authored).await.during(OP)?;
        let replies = populator
            .nodes(replies.into_values().flatten().collect())
            .await
            .during(OP)?;
        let mut replies = group_nodes(replies);

        let threads = authored
            .into_iter()
            .map(|thread| {
                let children = replies.remove(&thread.id).unwrap_or_default();
                UserThread { thread, children }
            })
            .collect();

        Ok(Some(UserPosts { user, threads }))
    }

    /// One page of other users, optionally filtered by a case-insensitive
    /// substring of username or name.
    #[instrument(skip(self, params), fields(user_id = %params.user_id, page = params.page_number))]
    pub async fn fetch_users(&self, params: FetchUsersParams) -> Result<Page<User>> {
        const OP: &str = "fetch users";

        let page = PageParams::new(params.page_number, params.page_size).during(OP)?;
        let search = if params.search_string.trim().is_empty() {
            None
        } else {
            Some(params.search_string)
        };
        let filter = UserFilter {
            exclude_id: params.user_id,
            search,
        };

        let total = self.users.count(&filter).await.during(OP)?;
        let items = self
            .users
            .search(&filter, params.sort_by, page.skip(), page.limit())
            .await
            .during(OP)?;
        let is_next = has_next(total, page.skip(), items.len());
        debug!(total, returned = items.len(), is_next, "users page");

        Ok(Page { items, is_next })
    }

    /// Replies other people left on the user's threads, newest first.
    #[instrument(skip(self))]
    pub async fn get_activity(&self, user_id: &str) -> Result<Vec<ThreadNode>> {
        const OP: &str = "fetch user activity";

        let authored = self.threads.find_by_author(user_id).await.during(OP)?;
        let parent_ids: Vec<Uuid> = authored.iter().map(|t| t.id).collect();
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }

        let replies = self
            .threads
            .find_replies_from_others(&parent_ids, user_id)
            .await
            .during(OP)?;
        self.populator().nodes(replies).await.during(OP)
    }
}

fn validate_profile(params: &UpdateUserParams) -> std::result::Result<(), DomainError> {
    if params.user_id.trim().is_empty() {
        return Err(DomainError::validation("user id is required"));
    }
    if params.username.trim().is_empty() {
        return Err(DomainError::validation("username is required"));
    }
    if params.name.trim().is_empty() {
        return Err(DomainError::validation("name is required"));
    }
    Ok(())
}
