#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use warbler_api::{AppState, AppStateInner, auth, session};
use warbler_db::Database;
use warbler_db::models::NewUser;
use warbler_types::models::{DEFAULT_HEADER_IMAGE_URL, DEFAULT_IMAGE_URL};

pub const SECRET: &str = "test-secret";

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    /// `name=value` pairs from every Set-Cookie header.
    pub fn cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .map(str::to_string)
            .collect()
    }

    pub fn cookie(&self, name: &str) -> Option<String> {
        let prefix = format!("{name}=");
        self.cookies().into_iter().find(|c| c.starts_with(&prefix))
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("response body is not JSON")
    }
}

impl TestApp {
    pub fn new() -> Self {
        let state: AppState = Arc::new(AppStateInner {
            db: Database::open_in_memory().expect("in-memory database"),
            secret_key: SECRET.into(),
            static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../static"),
        });
        let router = warbler_api::router(state.clone());
        Self { state, router }
    }

    /// A user whose password hash never verifies. Enough for most routes.
    pub fn add_user(&self, username: &str) -> i64 {
        self.insert_user(username, "not-a-real-hash")
    }

    /// A user who can actually log in with `password`.
    pub fn add_user_with_password(&self, username: &str, password: &str) -> i64 {
        let hash = auth::hash_password(password).expect("hash password");
        self.insert_user(username, &hash)
    }

    fn insert_user(&self, username: &str, password_hash: &str) -> i64 {
        let email = format!("{username}@test.com");
        self.state
            .db
            .create_user(&NewUser {
                username,
                email: &email,
                password_hash,
                image_url: DEFAULT_IMAGE_URL,
                header_image_url: DEFAULT_HEADER_IMAGE_URL,
            })
            .expect("create user")
            .id
    }

    pub fn add_message(&self, user_id: i64, text: &str) -> i64 {
        self.state
            .db
            .create_message(user_id, text)
            .expect("create message")
            .id
    }

    /// Cookie header value that logs in as `user_id`.
    pub fn login_cookie(&self, user_id: i64) -> String {
        let token = session::create_token(SECRET, user_id).expect("session token");
        format!("{}={token}", session::SESSION_COOKIE)
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, cookie, None).await
    }

    pub async fn post_form(&self, uri: &str, form: &str, cookie: Option<&str>) -> TestResponse {
        let body = Some(("application/x-www-form-urlencoded", form.to_string()));
        self.send(Method::POST, uri, cookie, body).await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        json: serde_json::Value,
        cookie: Option<&str>,
    ) -> TestResponse {
        let body = Some(("application/json", json.to_string()));
        self.send(Method::POST, uri, cookie, body).await
    }

    pub async fn delete(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.send(Method::DELETE, uri, cookie, None).await
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<(&str, String)>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some((content_type, body)) => builder
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(body)),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}
