use std::collections::HashSet;

use domains::{ErrorKind, SortOrder, User};
use integration_tests::Harness;
use services::{FetchUsersParams, UpdateUserParams, PROFILE_EDIT_PATH};

fn update(user_id: &str, username: &str, path: &str) -> UpdateUserParams {
    UpdateUserParams {
        username: username.into(),
        name: username.into(),
        bio: "hi".into(),
        image: "x".into(),
        user_id: user_id.into(),
        path: path.into(),
    }
}

fn is_sorted(users: &[User], sort: SortOrder) -> bool {
    users.windows(2).all(|pair| {
        let a = (pair[0].created_at, &pair[0].id);
        let b = (pair[1].created_at, &pair[1].id);
        match sort {
            SortOrder::Asc => a <= b,
            SortOrder::Desc => a >= b,
        }
    })
}

#[tokio::test]
async fn update_then_fetch_returns_lowercased_onboarded_user() {
    let h = Harness::new().await;
    h.users
        .update_user(update("u1", "Bob", PROFILE_EDIT_PATH))
        .await
        .unwrap();

    let user = h.users.fetch_user("u1").await.unwrap().unwrap();
    assert_eq!(user.username, "bob");
    assert_eq!(user.name, "Bob");
    assert!(user.onboarded);
}

#[tokio::test]
async fn fetch_user_absent_is_none() {
    let h = Harness::new().await;
    assert!(h.users.fetch_user("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn profile_edit_path_invalidates_cached_view_and_others_do_not() {
    let h = Harness::new().await;
    h.cache.put(PROFILE_EDIT_PATH, "u1", "<form>old</form>".into());

    h.users
        .update_user(update("u1", "Bob", "/other"))
        .await
        .unwrap();
    assert!(h.cache.get(PROFILE_EDIT_PATH, "u1").is_some());

    h.users
        .update_user(update("u1", "Bob", PROFILE_EDIT_PATH))
        .await
        .unwrap();
    assert!(h.cache.get(PROFILE_EDIT_PATH, "u1").is_none());
}

#[tokio::test]
async fn taken_username_is_a_wrapped_conflict() {
    let h = Harness::new().await;
    h.onboard("u1", "bob", "Bob").await;

    let err = h
        .users
        .update_user(update("u2", "BOB", "/onboarding"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConflictFailed);
    assert!(err.to_string().starts_with("failed to create/update user: "));
}

#[tokio::test]
async fn fetch_users_never_returns_the_caller() {
    let h = Harness::new().await;
    h.onboard("me", "bobcat", "Bob Cat").await;
    h.onboard("u2", "bobby", "Bobby").await;
    h.onboard("u3", "alice", "Alice").await;

    for search in ["", "bob", "cat", "BOB", "zzz"] {
        let mut params = FetchUsersParams::new("me");
        params.search_string = search.into();
        let page = h.users.fetch_users(params).await.unwrap();
        assert!(
            page.items.iter().all(|u| u.id != "me"),
            "caller leaked for search {search:?}"
        );
    }

    let mut params = FetchUsersParams::new("me");
    params.search_string = "bob".into();
    let page = h.users.fetch_users(params).await.unwrap();
    let ids: Vec<_> = page.items.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, ["u2"]);
}

#[tokio::test]
async fn search_ignores_case_beyond_ascii() {
    let h = Harness::new().await;
    h.onboard("me", "me", "Me").await;
    h.onboard("u1", "zed", "Émile Ørsted").await;

    for term in ["Émile", "émile", "Ørsted", "ørsted"] {
        let mut params = FetchUsersParams::new("me");
        params.search_string = term.into();
        let page = h.users.fetch_users(params).await.unwrap();
        let ids: Vec<_> = page.items.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, ["u1"], "search {term:?}");
    }
}

#[tokio::test]
async fn consecutive_pages_are_disjoint_and_ordered() {
    let h = Harness::new().await;
    h.onboard("me", "me", "Me").await;
    for i in 0..7 {
        h.onboard(&format!("u{i}"), &format!("user{i}"), &format!("User {i}"))
            .await;
    }

    for sort in [SortOrder::Desc, SortOrder::Asc] {
        let mut seen = HashSet::new();
        let mut all = Vec::new();
        for page_number in 1..=3 {
            let mut params = FetchUsersParams::new("me");
            params.page_number = page_number;
            params.page_size = 3;
            params.sort_by = sort;
            let page = h.users.fetch_users(params).await.unwrap();
            assert_eq!(page.is_next, page_number < 3);
            for user in page.items {
                assert!(seen.insert(user.id.clone()), "duplicate {}", user.id);
                all.push(user);
            }
        }
        assert_eq!(all.len(), 7);
        assert!(is_sorted(&all, sort));
    }
}

#[tokio::test]
async fn is_next_is_false_on_exact_boundary() {
    let h = Harness::new().await;
    h.onboard("me", "me", "Me").await;
    for i in 0..4 {
        h.onboard(&format!("u{i}"), &format!("user{i}"), "Someone").await;
    }

    let mut params = FetchUsersParams::new("me");
    params.page_size = 2;
    params.page_number = 2;
    let page = h.users.fetch_users(params.clone()).await.unwrap();
    assert_eq!(page.items.len(), 2);
    assert!(!page.is_next);

    params.page_number = 1;
    assert!(h.users.fetch_users(params.clone()).await.unwrap().is_next);

    params.page_number = 3;
    let past_end = h.users.fetch_users(params).await.unwrap();
    assert!(past_end.items.is_empty());
    assert!(!past_end.is_next);
}

#[tokio::test]
async fn activity_lists_replies_from_others_only() {
    let h = Harness::new().await;
    h.onboard("alice", "alice", "Alice").await;
    h.onboard("bob", "bob", "Bob").await;

    let root = h.post("alice", "my thread").await;
    let from_bob = h.reply(root.id, "bob", "nice one").await;
    h.reply(root.id, "alice", "thanks").await;
    // bob replying to his own reply is not alice's activity
    h.reply(from_bob.id, "bob", "also").await;

    let activity = h.users.get_activity("alice").await.unwrap();
    assert_eq!(activity.len(), 1);
    assert_eq!(activity[0].thread.id, from_bob.id);
    assert_eq!(activity[0].author.name, "Bob");
    assert!(activity.iter().all(|n| n.thread.author_id != "alice"));

    assert!(h.users.get_activity("bob").await.unwrap().is_empty());
}

#[tokio::test]
async fn activity_excludes_own_reply_to_own_reply() {
    let h = Harness::new().await;
    h.onboard("alice", "alice", "Alice").await;
    h.onboard("bob", "bob", "Bob").await;

    let root = h.post("bob", "bob's thread").await;
    let alice_reply = h.reply(root.id, "alice", "hello").await;
    // alice's reply is her thread too; her follow-up on it must not show up
    h.reply(alice_reply.id, "alice", "follow-up").await;
    let bob_answer = h.reply(alice_reply.id, "bob", "answer").await;

    let activity = h.users.get_activity("alice").await.unwrap();
    let ids: Vec<_> = activity.iter().map(|n| n.thread.id).collect();
    assert_eq!(ids, [bob_answer.id]);
}

#[tokio::test]
async fn fetch_user_posts_expands_exactly_two_levels() {
    let h = Harness::new().await;
    h.onboard("alice", "alice", "Alice").await;
    h.onboard("bob", "bob", "Bob").await;
    h.onboard("carol", "carol", "Carol").await;

    let root = h.post("alice", "level 0").await;
    let first = h.reply(root.id, "bob", "level 1").await;
    let second = h.reply(first.id, "carol", "level 2").await;
    let third = h.reply(second.id, "bob", "level 3").await;

    let posts = h.users.fetch_user_posts("alice").await.unwrap().unwrap();
    assert_eq!(posts.user.id, "alice");
    assert_eq!(posts.threads.len(), 1);

    let thread = &posts.threads[0];
    assert_eq!(thread.thread.id, root.id);
    assert_eq!(thread.children.len(), 1);

    let reply = &thread.children[0];
    assert_eq!(reply.thread.id, first.id);
    assert_eq!(reply.author.name, "Bob");
    assert_eq!(reply.author.image, "/img/bob.png");
    // level 2 is a bare reference, level 3 is not reachable at all
    assert_eq!(reply.children, vec![second.id]);
    assert!(!reply.children.contains(&third.id));
}

#[tokio::test]
async fn fetch_user_posts_for_unknown_user_is_none() {
    let h = Harness::new().await;
    assert!(h.users.fetch_user_posts("ghost").await.unwrap().is_none());
}

