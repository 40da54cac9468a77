use std::path::PathBuf;
use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
    Extension, Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use rand_core::OsRng;
use tracing::info;

use warbler_db::models::NewUser;
use warbler_db::{Database, DbError};
use warbler_types::models::{DEFAULT_HEADER_IMAGE_URL, User};

use crate::error::AppError;
use crate::forms::{FieldErrors, LoginForm, SignupForm};
use crate::middleware::Viewer;
use crate::session::{self, Flash};
use crate::views::{self, Layout};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    /// Signs session tokens.
    pub secret_key: String,
    pub static_dir: PathBuf,
}

/// Run a database call on the blocking pool.
pub async fn with_db<F, T>(state: &AppState, f: F) -> Result<T, AppError>
where
    F: FnOnce(&Database) -> warbler_db::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    let result = tokio::task::spawn_blocking(move || f(&state.db)).await?;
    Ok(result?)
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// The user named `username`, if `password` matches their hash.
pub async fn authenticate(
    state: &AppState,
    username: String,
    password: String,
) -> Result<Option<User>, AppError> {
    with_db(state, move |db| {
        let Some(row) = db.get_user_by_username(&username)? else {
            return Ok(None);
        };
        Ok(verify_password(&password, &row.password).then(|| row.into()))
    })
    .await
}

fn login_jar(jar: CookieJar, state: &AppState, user_id: i64) -> Result<CookieJar, AppError> {
    session::do_login(jar, &state.secret_key, user_id)
        .map_err(|e| AppError::Internal(format!("session token: {e}")))
}

pub async fn signup_form(Extension(viewer): Extension<Viewer>, jar: CookieJar) -> impl IntoResponse {
    let (jar, layout) = Layout::take(jar, viewer.0);
    (
        jar,
        views::auth::signup(&layout, &SignupForm::default(), &FieldErrors::default()),
    )
}

pub async fn signup(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    if let Err(errors) = form.validate() {
        let (jar, layout) = Layout::take(jar, viewer.0);
        return Ok((
            StatusCode::BAD_REQUEST,
            jar,
            views::auth::signup(&layout, &form, &errors),
        )
            .into_response());
    }

    let password = form.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;

    let new = form.clone();
    let created = with_db(&state, move |db| {
        db.create_user(&NewUser {
            username: &new.username,
            email: &new.email,
            password_hash: &password_hash,
            image_url: new.image_url_or_default(),
            header_image_url: DEFAULT_HEADER_IMAGE_URL,
        })
    })
    .await;

    let user = match created {
        Ok(user) => user,
        Err(AppError::Db(DbError::Conflict(_))) => {
            let (jar, layout) = Layout::take(jar, viewer.0);
            let layout = layout.flash(Flash::danger("Username already taken"));
            return Ok((
                StatusCode::CONFLICT,
                jar,
                views::auth::signup(&layout, &form, &FieldErrors::default()),
            )
                .into_response());
        }
        Err(e) => return Err(e),
    };

    info!("User {} signed up (id {})", user.username, user.id);
    let jar = login_jar(jar, &state, user.id)?;
    Ok((jar, Redirect::to("/")).into_response())
}

pub async fn login_form(Extension(viewer): Extension<Viewer>, jar: CookieJar) -> impl IntoResponse {
    let (jar, layout) = Layout::take(jar, viewer.0);
    (
        jar,
        views::auth::login(&layout, &LoginForm::default(), &FieldErrors::default()),
    )
}

pub async fn login(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if let Err(errors) = form.validate() {
        let (jar, layout) = Layout::take(jar, viewer.0);
        return Ok((
            StatusCode::BAD_REQUEST,
            jar,
            views::auth::login(&layout, &form, &errors),
        )
            .into_response());
    }

    match authenticate(&state, form.username.clone(), form.password.clone()).await? {
        Some(user) => {
            info!("User {} logged in", user.username);
            let jar = login_jar(jar, &state, user.id)?;
            let jar = session::push_flash(jar, Flash::success(format!("Hello, {}!", user.username)));
            Ok((jar, Redirect::to("/")).into_response())
        }
        None => {
            let (jar, layout) = Layout::take(jar, viewer.0);
            let layout = layout.flash(Flash::danger("Invalid credentials."));
            Ok((
                StatusCode::UNAUTHORIZED,
                jar,
                views::auth::login(&layout, &form, &FieldErrors::default()),
            )
                .into_response())
        }
    }
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (session::do_logout(jar), Redirect::to("/login"))
}
