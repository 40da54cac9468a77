mod common;

use axum::http::StatusCode;

use common::TestApp;
use warbler_api::session::FLASH_COOKIE;

/// Two users, `testuser1` following `testuser2`, each with one message.
struct Fixture {
    app: TestApp,
    u1: i64,
    u2: i64,
}

impl Fixture {
    fn new() -> Self {
        let app = TestApp::new();
        let u1 = app.add_user("testuser1");
        let u2 = app.add_user("testuser2");
        app.add_message(u1, "testuser1 says hi");
        app.add_message(u2, "testuser2 says hi");
        app.state.db.follow(u1, u2).unwrap();
        Self { app, u1, u2 }
    }
}

#[tokio::test]
async fn gated_pages_redirect_anonymous_users() {
    let Fixture { app, u1, .. } = Fixture::new();

    let gated = [
        format!("/users/{u1}/following"),
        format!("/users/{u1}/followers"),
        "/users/profile".to_string(),
        "/messages".to_string(),
        "/messages/new".to_string(),
    ];
    for uri in &gated {
        let res = app.get(uri, None).await;
        assert_eq!(res.status, StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(res.location(), Some("/"), "{uri}");
    }

    let res = app.post_form(&format!("/users/follow/{u1}"), "", None).await;
    assert_eq!(res.location(), Some("/"));

    let flash = res.cookie(FLASH_COOKIE).expect("unauthorized flash");
    let home = app.get("/", Some(&flash)).await;
    assert!(home.body.contains("Access unauthorized."));
}

#[tokio::test]
async fn users_index_lists_everyone() {
    let Fixture { app, .. } = Fixture::new();

    let res = app.get("/users", None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("@testuser1"));
    assert!(res.body.contains("@testuser2"));
}

#[tokio::test]
async fn users_index_filters_by_query() {
    let Fixture { app, .. } = Fixture::new();
    app.add_user("someone_else");

    let res = app.get("/users?q=testuser", None).await;
    assert!(res.body.contains("@testuser1"));
    assert!(res.body.contains("@testuser2"));
    assert!(!res.body.contains("@someone_else"));

    let res = app.get("/users?q=nobody", None).await;
    assert!(res.body.contains("Sorry, no users found"));

    let res = app.get("/users?q=TESTUSER", None).await;
    assert!(res.body.contains("Sorry, no users found"));
}

#[tokio::test]
async fn user_page_shows_messages_and_stats() {
    let Fixture { app, u1, .. } = Fixture::new();

    let res = app.get(&format!("/users/{u1}"), None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("@testuser1"));
    assert!(res.body.contains("testuser1 says hi"));
    assert!(!res.body.contains("testuser2 says hi"));
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let Fixture { app, u1, .. } = Fixture::new();
    let cookie = app.login_cookie(u1);

    assert_eq!(app.get("/users/999", None).await.status, StatusCode::NOT_FOUND);
    assert_eq!(
        app.get("/users/999/likes", None).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.get("/users/999/following", Some(&cookie)).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn non_numeric_user_ids_are_not_found() {
    let Fixture { app, u1, .. } = Fixture::new();
    let cookie = app.login_cookie(u1);

    let res = app.get("/users/abc", None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert!(res.headers["content-type"].to_str().unwrap().starts_with("text/html"));
    assert!(res.body.contains("404"));

    assert_eq!(
        app.get("/users/abc/likes", None).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.get("/users/abc/followers", Some(&cookie)).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.post_form("/users/follow/abc", "", Some(&cookie)).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.post_form("/users/stop-following/abc", "", Some(&cookie))
            .await
            .status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn likes_page_lists_liked_messages() {
    let Fixture { app, u1, u2 } = Fixture::new();
    let liked = app.add_message(u2, "worth a like");
    app.state.db.create_like(u1, liked).unwrap();

    let res = app.get(&format!("/users/{u1}/likes"), None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("worth a like"));
    assert!(!res.body.contains("testuser2 says hi"));
}

#[tokio::test]
async fn following_and_followers_pages() {
    let Fixture { app, u1, u2 } = Fixture::new();
    let cookie = app.login_cookie(u1);

    let res = app.get(&format!("/users/{u1}/following"), Some(&cookie)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains(r#"<p>@testuser2</p>"#));
    assert!(res.body.contains(&format!("/users/stop-following/{u2}")));

    let res = app.get(&format!("/users/{u2}/followers"), Some(&cookie)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains(r#"<p>@testuser1</p>"#));
}

#[tokio::test]
async fn follow_and_unfollow() {
    let Fixture { app, u1, u2 } = Fixture::new();
    let cookie = app.login_cookie(u2);

    let res = app
        .post_form(&format!("/users/follow/{u1}"), "", Some(&cookie))
        .await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location(), Some(format!("/users/{u2}/following").as_str()));
    assert!(app.state.db.is_following(u2, u1).unwrap());

    // Following twice is harmless.
    let res = app
        .post_form(&format!("/users/follow/{u1}"), "", Some(&cookie))
        .await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);

    let res = app
        .post_form(&format!("/users/stop-following/{u1}"), "", Some(&cookie))
        .await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert!(!app.state.db.is_following(u2, u1).unwrap());
}

#[tokio::test]
async fn follow_rejects_unknown_and_self() {
    let Fixture { app, u1, .. } = Fixture::new();
    let cookie = app.login_cookie(u1);

    let res = app.post_form("/users/follow/999", "", Some(&cookie)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app
        .post_form("/users/stop-following/999", "", Some(&cookie))
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app
        .post_form(&format!("/users/follow/{u1}"), "", Some(&cookie))
        .await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert!(!app.state.db.is_following(u1, u1).unwrap());
}

#[tokio::test]
async fn profile_form_is_prefilled() {
    let Fixture { app, u1, .. } = Fixture::new();

    let res = app.get("/users/profile", Some(&app.login_cookie(u1))).await;

    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains(r#"value="testuser1""#));
    assert!(res.body.contains(r#"value="testuser1@test.com""#));
}

#[tokio::test]
async fn profile_update_saves_changes() {
    let app = TestApp::new();
    let id = app.add_user_with_password("testuser1", "testuser");
    let cookie = app.login_cookie(id);

    let res = app
        .post_form(
            "/users/profile",
            "username=testuser1&email=changed%40test.com&location=Nowhere&bio=Hi+there&password=testuser",
            Some(&cookie),
        )
        .await;

    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location(), Some(format!("/users/{id}").as_str()));

    let user = app.state.db.get_user(id).unwrap().unwrap();
    assert_eq!(user.email, "changed@test.com");
    assert_eq!(user.location.as_deref(), Some("Nowhere"));
    assert_eq!(user.bio.as_deref(), Some("Hi there"));
}

#[tokio::test]
async fn profile_update_requires_fields() {
    let app = TestApp::new();
    let id = app.add_user_with_password("testuser1", "testuser");
    let cookie = app.login_cookie(id);

    let res = app
        .post_form(
            "/users/profile",
            "username=&email=testuser1%40test.com&password=testuser",
            Some(&cookie),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .post_form(
            "/users/profile",
            "username=testuser1&email=&password=testuser",
            Some(&cookie),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let user = app.state.db.get_user(id).unwrap().unwrap();
    assert_eq!(user.email, "testuser1@test.com");
}

#[tokio::test]
async fn profile_update_checks_password() {
    let app = TestApp::new();
    let id = app.add_user_with_password("testuser1", "testuser");
    let cookie = app.login_cookie(id);

    let res = app
        .post_form(
            "/users/profile",
            "username=renamed&email=testuser1%40test.com&password=wrongpass",
            Some(&cookie),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.contains("Failed to verify password!"));
    let user = app.state.db.get_user(id).unwrap().unwrap();
    assert_eq!(user.username, "testuser1");
}

#[tokio::test]
async fn profile_update_to_taken_username_flashes() {
    let app = TestApp::new();
    app.add_user("testuser1");
    let id = app.add_user_with_password("testuser2", "testuser");

    let res = app
        .post_form(
            "/users/profile",
            "username=testuser1&email=testuser2%40test.com&password=testuser",
            Some(&app.login_cookie(id)),
        )
        .await;

    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location(), Some("/"));
    let flash = res.cookie(FLASH_COOKIE).expect("failure flash");
    let home = app.get("/", Some(&flash)).await;
    assert!(home.body.contains("Failed to update testuser2"));
}

#[tokio::test]
async fn delete_user_removes_everything() {
    let Fixture { app, u1, u2 } = Fixture::new();
    let liked = app.add_message(u2, "liked by u1");
    app.state.db.create_like(u1, liked).unwrap();

    let res = app
        .post_form("/users/delete", "", Some(&app.login_cookie(u1)))
        .await;

    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location(), Some("/signup"));
    assert!(app.state.db.get_user(u1).unwrap().is_none());
    assert!(app.state.db.user_messages(u1, 10).unwrap().is_empty());
    assert!(app.state.db.followers(u2).unwrap().is_empty());
    assert!(app.state.db.likes_by_user(u1).unwrap().is_empty());

    // The other user's content is untouched.
    assert_eq!(app.state.db.user_messages(u2, 10).unwrap().len(), 2);
}
