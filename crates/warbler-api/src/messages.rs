use axum::{
    Extension, Form,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, warn};

use crate::auth::{AppState, with_db};
use crate::error::AppError;
use crate::forms::{FieldErrors, MessageForm};
use crate::middleware::{CurrentUser, Viewer};
use crate::session::{self, Flash};
use crate::views::{self, Layout, LikeContext};

/// Home feed size.
const FEED_LIMIT: u32 = 100;

/// Size of the site-wide "recent messages" listing.
const RECENT_LIMIT: u32 = 50;

/// Anonymous visitors get the landing page; logged-in users their feed.
pub async fn homepage(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let Some(user) = viewer.0 else {
        let (jar, layout) = Layout::take(jar, None);
        return Ok((jar, views::messages::home_anon(&layout)).into_response());
    };

    let user_id = user.id;
    let (messages, likes) = with_db(&state, move |db| {
        Ok((db.following_feed(user_id, FEED_LIMIT)?, db.likes_by_user(user_id)?))
    })
    .await?;

    let (jar, layout) = Layout::take(jar, Some(user));
    let likes = LikeContext::new(user_id, &likes);
    Ok((jar, views::messages::home(&layout, &messages, &likes)).into_response())
}

pub async fn list_messages(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let user_id = user.id;
    let (messages, likes) = with_db(&state, move |db| {
        Ok((db.recent_messages(RECENT_LIMIT)?, db.likes_by_user(user_id)?))
    })
    .await?;

    let (jar, layout) = Layout::take(jar, Some(user));
    let likes = LikeContext::new(user_id, &likes);
    Ok((jar, views::messages::recent(&layout, &messages, &likes)))
}

pub async fn new_message_form(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    jar: CookieJar,
) -> impl IntoResponse {
    let (jar, layout) = Layout::take(jar, Some(user));
    (
        jar,
        views::messages::new(&layout, &MessageForm::default(), &FieldErrors::default()),
    )
}

pub async fn create_message(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    jar: CookieJar,
    Form(form): Form<MessageForm>,
) -> Result<Response, AppError> {
    if let Err(errors) = form.validate() {
        let (jar, layout) = Layout::take(jar, Some(user));
        return Ok((
            StatusCode::BAD_REQUEST,
            jar,
            views::messages::new(&layout, &form, &errors),
        )
            .into_response());
    }

    let user_id = user.id;
    let text = form.text;
    let message = with_db(&state, move |db| db.create_message(user_id, &text)).await?;
    info!("User {} posted message {}", user_id, message.id);

    Ok(Redirect::to(&format!("/users/{user_id}")).into_response())
}

pub async fn show_message(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    path: Result<Path<i64>, PathRejection>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let Path(message_id) = path?;
    let message = with_db(&state, move |db| db.get_message(message_id))
        .await?
        .ok_or(AppError::NotFound)?;

    let (jar, layout) = Layout::take(jar, viewer.0);
    Ok((jar, views::messages::show(&layout, &message)))
}

/// Only the author may delete a message.
pub async fn delete_message(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    path: Result<Path<i64>, PathRejection>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let Path(message_id) = path?;
    let message = with_db(&state, move |db| db.get_message(message_id))
        .await?
        .ok_or(AppError::NotFound)?;

    if message.user_id != user.id {
        warn!(
            "User {} tried to delete message {} owned by {}",
            user.id, message.id, message.user_id
        );
        let jar = session::push_flash(jar, Flash::danger("Access unauthorized."));
        return Ok((jar, Redirect::to("/")).into_response());
    }

    with_db(&state, move |db| db.delete_message(message_id)).await?;
    info!("User {} deleted message {}", user.id, message_id);

    Ok(Redirect::to(&format!("/users/{}", user.id)).into_response())
}
