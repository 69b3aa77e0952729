//! Page handlers. Each signed-in page goes through the access gate first,
//! then a single service call, then a template.

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::{
        header::{AUTHORIZATION, COOKIE},
        HeaderMap,
    },
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use domains::{Credentials, SortOrder, User};
use serde::Deserialize;
use services::{
    Access, AddCommentParams, CreateThreadParams, FetchUsersParams, UpdateUserParams,
    PROFILE_EDIT_PATH,
};
use tracing::debug;
use uuid::Uuid;

use super::{ApiError, AppState};
use crate::views::{ActivityPage, EditProfilePage, HomePage, ProfilePage, SearchPage, ThreadPage};

type Result<T> = std::result::Result<T, ApiError>;

/// Cookie carrying the same JWT for browser navigation.
pub const SESSION_COOKIE: &str = "session";

/// The bearer token from the `Authorization` header, or failing that from
/// the session cookie.
pub(super) fn credentials(headers: &HeaderMap) -> Credentials {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .or_else(|| session_cookie(headers))
        .map(str::to_string);
    Credentials { bearer }
}

fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.trim().trim_matches('"'))
        .filter(|token| !token.is_empty())
}

async fn viewer(state: &AppState, headers: &HeaderMap) -> Result<User> {
    match state.access.authorize(&credentials(headers)).await? {
        Access::Granted { user, .. } => Ok(user),
        Access::Redirect(to) => Err(ApiError::Redirect(to)),
    }
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
    page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    username: String,
    name: String,
    #[serde(default)]
    bio: String,
    #[serde(default)]
    image: String,
}

#[derive(Debug, Deserialize)]
pub struct ThreadForm {
    text: String,
    community_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    text: String,
}

pub async fn home(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>> {
    let viewer = viewer(&state, &headers).await?;
    let page = query.page.unwrap_or(1);
    let posts = state.threads.fetch_posts(page, state.feed.page_size).await?;

    let html = HomePage {
        viewer: &viewer,
        cards: &posts.items,
        page,
        is_next: posts.is_next,
    }
    .render()?;
    Ok(Html(html))
}

pub async fn search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Result<Html<String>> {
    let viewer = viewer(&state, &headers).await?;
    let search_string = query.q.unwrap_or_default();
    let page = query.page.unwrap_or(1);

    let result = state
        .users
        .fetch_users(FetchUsersParams {
            user_id: viewer.id.clone(),
            search_string: search_string.clone(),
            page_number: page,
            page_size: state.feed.users_page_size,
            sort_by: SortOrder::Desc,
        })
        .await?;

    let html = SearchPage {
        viewer: &viewer,
        users: &result.items,
        query: &search_string,
        page,
        is_next: result.is_next,
    }
    .render()?;
    Ok(Html(html))
}

pub async fn activity(State(state): State<AppState>, headers: HeaderMap) -> Result<Html<String>> {
    let viewer = viewer(&state, &headers).await?;
    let items = state.users.get_activity(&viewer.id).await?;

    let html = ActivityPage {
        viewer: &viewer,
        items: &items,
    }
    .render()?;
    Ok(Html(html))
}

pub async fn profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Html<String>> {
    let viewer = viewer(&state, &headers).await?;
    let posts = state
        .users
        .fetch_user_posts(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user {id}")))?;

    let html = ProfilePage {
        viewer: &viewer,
        posts: &posts,
    }
    .render()?;
    Ok(Html(html))
}

/// Served from the page cache until the profile is saved again.
pub async fn edit_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Html<String>> {
    let viewer = viewer(&state, &headers).await?;
    if let Some(html) = state.cache.get(PROFILE_EDIT_PATH, &viewer.id) {
        debug!("profile edit served from cache");
        return Ok(Html(html));
    }

    let html = EditProfilePage { viewer: &viewer }.render()?;
    state.cache.put(PROFILE_EDIT_PATH, &viewer.id, html.clone());
    Ok(Html(html))
}

pub async fn save_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ProfileForm>,
) -> Result<Response> {
    save(&state, &headers, form, PROFILE_EDIT_PATH).await
}

pub async fn onboard(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ProfileForm>,
) -> Result<Response> {
    save(&state, &headers, form, services::ONBOARDING_PATH).await
}

/// Profile writes only need an authenticated caller; onboarding happens
/// before any profile exists.
async fn save(
    state: &AppState,
    headers: &HeaderMap,
    form: ProfileForm,
    path: &str,
) -> Result<Response> {
    let principal = state
        .access
        .principal(&credentials(headers))
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    state
        .users
        .update_user(UpdateUserParams {
            username: form.username,
            name: form.name,
            bio: form.bio,
            image: form.image,
            user_id: principal.id,
            path: path.to_string(),
        })
        .await?;

    Ok(Redirect::to("/").into_response())
}

pub async fn thread(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Html<String>> {
    let viewer = viewer(&state, &headers).await?;
    let detail = state
        .threads
        .fetch_thread_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("thread {id}")))?;

    let html = ThreadPage {
        viewer: &viewer,
        detail: &detail,
    }
    .render()?;
    Ok(Html(html))
}

pub async fn create_thread(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ThreadForm>,
) -> Result<Response> {
    let viewer = viewer(&state, &headers).await?;
    let thread = state
        .threads
        .create_thread(CreateThreadParams {
            text: form.text,
            author: viewer.id,
            community_id: form.community_id.filter(|c| !c.trim().is_empty()),
            path: "/".into(),
        })
        .await?;

    Ok(Redirect::to(&format!("/threads/{}", thread.id)).into_response())
}

pub async fn comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Form(form): Form<CommentForm>,
) -> Result<Response> {
    let viewer = viewer(&state, &headers).await?;
    let path = format!("/threads/{id}");
    state
        .threads
        .add_comment_to_thread(AddCommentParams {
            thread_id: id,
            text: form.text,
            user_id: viewer.id,
            path: path.clone(),
        })
        .await?;

    Ok(Redirect::to(&path).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_is_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(credentials(&headers).bearer.as_deref(), Some("abc.def"));
    }

    #[test]
    fn other_schemes_and_blank_tokens_are_ignored() {
        let mut headers = HeaderMap::new();
        assert!(credentials(&headers).bearer.is_none());
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        assert!(credentials(&headers).bearer.is_none());
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert!(credentials(&headers).bearer.is_none());
    }

    #[test]
    fn session_cookie_is_used_without_a_header() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; session=tok.en; x=1"));
        assert_eq!(credentials(&headers).bearer.as_deref(), Some("tok.en"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from.header"));
        assert_eq!(credentials(&headers).bearer.as_deref(), Some("from.header"));
    }

    #[test]
    fn unrelated_or_empty_cookies_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("sessionid=abc; session="));
        assert!(credentials(&headers).bearer.is_none());
    }
}
