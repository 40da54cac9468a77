mod common;

use axum::http::StatusCode;

use common::TestApp;
use warbler_api::session::{FLASH_COOKIE, SESSION_COOKIE};

#[tokio::test]
async fn signup_creates_user_and_logs_in() {
    let app = TestApp::new();

    let res = app
        .post_form(
            "/signup",
            "username=testuser1&email=success%40test.com&password=testuser",
            None,
        )
        .await;

    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location(), Some("/"));
    assert!(res.cookie(SESSION_COOKIE).is_some());

    let user = app
        .state
        .db
        .get_user_by_username("testuser1")
        .unwrap()
        .expect("user was created");
    assert_eq!(user.email, "success@test.com");
    assert_ne!(user.password, "testuser");
}

#[tokio::test]
async fn signup_with_taken_username_is_a_conflict() {
    let app = TestApp::new();
    app.add_user("testuser1");

    let res = app
        .post_form(
            "/signup",
            "username=testuser1&email=other%40test.com&password=testuser",
            None,
        )
        .await;

    assert_eq!(res.status, StatusCode::CONFLICT);
    assert!(res.body.contains("Username already taken"));
    assert!(res.cookie(SESSION_COOKIE).is_none());
}

#[tokio::test]
async fn signup_with_invalid_fields_rerenders_form() {
    let app = TestApp::new();

    let res = app
        .post_form("/signup", "username=&email=nope&password=abc", None)
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.contains("This field is required."));
    assert!(res.body.contains("Invalid email address."));
    assert!(res.body.contains("Field must be at least 6 characters long."));
}

#[tokio::test]
async fn login_with_valid_credentials() {
    let app = TestApp::new();
    app.add_user_with_password("testuser1", "testuser");

    let res = app
        .post_form("/login", "username=testuser1&password=testuser", None)
        .await;

    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location(), Some("/"));
    assert!(res.cookie(SESSION_COOKIE).is_some());

    let flash = res.cookie(FLASH_COOKIE).expect("welcome flash");
    let home = app.get("/", Some(&flash)).await;
    assert!(home.body.contains("Hello, testuser1!"));
}

#[tokio::test]
async fn login_with_bad_password_is_unauthorized() {
    let app = TestApp::new();
    app.add_user_with_password("testuser1", "testuser");

    let res = app
        .post_form("/login", "username=testuser1&password=wrongpass", None)
        .await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert!(res.body.contains("Invalid credentials."));
    assert!(res.cookie(SESSION_COOKIE).is_none());
}

#[tokio::test]
async fn login_for_unknown_user_is_unauthorized() {
    let app = TestApp::new();

    let res = app
        .post_form("/login", "username=ghost&password=testuser", None)
        .await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_clears_session() {
    let app = TestApp::new();
    let id = app.add_user("testuser1");
    let cookie = app.login_cookie(id);

    let res = app.get("/logout", Some(&cookie)).await;

    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location(), Some("/login"));
    assert_eq!(res.cookie(SESSION_COOKIE).as_deref(), Some("warbler_session="));
    assert!(res.cookie(FLASH_COOKIE).is_some());
}

#[tokio::test]
async fn forged_session_is_anonymous() {
    let app = TestApp::new();
    app.add_user("testuser1");

    let res = app.get("/", Some("warbler_session=not.a.jwt")).await;

    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("New to Warbler?"));
}

#[tokio::test]
async fn session_of_deleted_user_is_anonymous() {
    let app = TestApp::new();
    let id = app.add_user("testuser1");
    let cookie = app.login_cookie(id);
    app.state.db.delete_user(id).unwrap();

    let res = app.get("/messages/new", Some(&cookie)).await;

    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location(), Some("/"));
}

#[tokio::test]
async fn pages_are_never_cached() {
    let app = TestApp::new();

    let res = app.get("/login", None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.headers["cache-control"],
        "no-cache, no-store, must-revalidate"
    );
    assert_eq!(res.headers["pragma"], "no-cache");
    assert_eq!(res.headers["expires"], "0");
}
