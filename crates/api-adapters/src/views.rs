//! Askama page templates. Every page carries the signed-in `viewer` for
//! the shared navigation in `base.html`.

use askama::Template;
use domains::{ThreadCard, ThreadDetail, ThreadNode, User, UserPosts};

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomePage<'a> {
    pub viewer: &'a User,
    pub cards: &'a [ThreadCard],
    pub page: u32,
    pub is_next: bool,
}

#[derive(Template)]
#[template(path = "thread.html")]
pub struct ThreadPage<'a> {
    pub viewer: &'a User,
    pub detail: &'a ThreadDetail,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfilePage<'a> {
    pub viewer: &'a User,
    pub posts: &'a UserPosts,
}

#[derive(Template)]
#[template(path = "search.html")]
pub struct SearchPage<'a> {
    pub viewer: &'a User,
    pub users: &'a [User],
    pub query: &'a str,
    pub page: u32,
    pub is_next: bool,
}

#[derive(Template)]
#[template(path = "activity.html")]
pub struct ActivityPage<'a> {
    pub viewer: &'a User,
    pub items: &'a [ThreadNode],
}

#[derive(Template)]
#[template(path = "edit_profile.html")]
pub struct EditProfilePage<'a> {
    pub viewer: &'a User,
}
