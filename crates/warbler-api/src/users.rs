use std::collections::HashSet;

use axum::{
    Extension, Form,
    extract::{Path, Query, State, rejection::PathRejection},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::{info, warn};

use warbler_db::DbError;
use warbler_types::models::User;

use crate::auth::{AppState, authenticate, with_db};
use crate::error::AppError;
use crate::forms::UserEditForm;
use crate::middleware::{CurrentUser, Viewer};
use crate::session::{self, Flash};
use crate::views::{self, Layout, ProfileHeader};

/// Messages shown on a profile page.
const PROFILE_MESSAGES: u32 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct UserSearch {
    pub q: Option<String>,
}

/// Everything the shared profile header needs, for `user_id` as seen by `viewer`.
async fn profile_header(
    state: &AppState,
    user_id: i64,
    viewer: Option<i64>,
) -> Result<ProfileHeader, AppError> {
    with_db(state, move |db| {
        let Some(user) = db.get_user(user_id)? else {
            return Ok(None);
        };
        let stats = db.user_stats(user_id)?;
        let viewer_follows = match viewer {
            Some(v) if v != user_id => db.is_following(v, user_id)?,
            _ => false,
        };
        Ok(Some(ProfileHeader {
            user: user.into(),
            stats,
            viewer_follows,
        }))
    })
    .await?
    .ok_or(AppError::NotFound)
}

/// Ids of the users `viewer` follows, for rendering follow buttons.
async fn following_ids(state: &AppState, viewer: i64) -> Result<HashSet<i64>, AppError> {
    let users = with_db(state, move |db| db.following(viewer)).await?;
    Ok(users.into_iter().map(|u| u.id).collect())
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Query(search): Query<UserSearch>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let term = search.q.map(|q| q.trim().to_string()).filter(|q| !q.is_empty());
    let query = term.clone();
    let users: Vec<User> = with_db(&state, move |db| db.list_users(query.as_deref()))
        .await?
        .into_iter()
        .map(User::from)
        .collect();

    let following = match &viewer.0 {
        Some(me) => following_ids(&state, me.id).await?,
        None => HashSet::new(),
    };

    let (jar, layout) = Layout::take(jar, viewer.0);
    Ok((
        jar,
        views::users::index(&layout, &users, &following, term.as_deref()),
    ))
}

pub async fn show_user(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    path: Result<Path<i64>, PathRejection>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let Path(user_id) = path?;
    let header = profile_header(&state, user_id, viewer.0.as_ref().map(|u| u.id)).await?;
    let messages = with_db(&state, move |db| db.user_messages(user_id, PROFILE_MESSAGES)).await?;

    let (jar, layout) = Layout::take(jar, viewer.0);
    Ok((jar, views::users::show(&layout, &header, &messages)))
}

pub async fn show_likes(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    path: Result<Path<i64>, PathRejection>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let Path(user_id) = path?;
    let header = profile_header(&state, user_id, viewer.0.as_ref().map(|u| u.id)).await?;
    let messages = with_db(&state, move |db| db.liked_messages(user_id)).await?;

    let (jar, layout) = Layout::take(jar, viewer.0);
    Ok((jar, views::users::likes(&layout, &header, &messages)))
}

pub async fn show_following(
    State(state): State<AppState>,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    path: Result<Path<i64>, PathRejection>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let Path(user_id) = path?;
    let header = profile_header(&state, user_id, Some(me.id)).await?;
    let users: Vec<User> = with_db(&state, move |db| db.following(user_id))
        .await?
        .into_iter()
        .map(User::from)
        .collect();
    let mine = following_ids(&state, me.id).await?;

    let (jar, layout) = Layout::take(jar, Some(me));
    Ok((
        jar,
        views::users::following(&layout, &header, &users, &mine),
    ))
}

pub async fn show_followers(
    State(state): State<AppState>,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    path: Result<Path<i64>, PathRejection>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let Path(user_id) = path?;
    let header = profile_header(&state, user_id, Some(me.id)).await?;
    let users: Vec<User> = with_db(&state, move |db| db.followers(user_id))
        .await?
        .into_iter()
        .map(User::from)
        .collect();
    let mine = following_ids(&state, me.id).await?;

    let (jar, layout) = Layout::take(jar, Some(me));
    Ok((
        jar,
        views::users::followers(&layout, &header, &users, &mine),
    ))
}

pub async fn add_follow(
    State(state): State<AppState>,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    path: Result<Path<i64>, PathRejection>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let Path(follow_id) = path?;
    let target = with_db(&state, move |db| db.get_user(follow_id))
        .await?
        .ok_or(AppError::NotFound)?;
    let redirect = Redirect::to(&format!("/users/{}/following", me.id));

    if target.id == me.id {
        let jar = session::push_flash(jar, Flash::danger("You cannot follow yourself."));
        return Ok((jar, redirect).into_response());
    }

    let me_id = me.id;
    with_db(&state, move |db| db.follow(me_id, follow_id)).await?;
    info!("User {} now follows {}", me_id, follow_id);

    Ok((jar, redirect).into_response())
}

pub async fn stop_following(
    State(state): State<AppState>,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(follow_id) = path?;
    with_db(&state, move |db| db.get_user(follow_id))
        .await?
        .ok_or(AppError::NotFound)?;

    let me_id = me.id;
    if with_db(&state, move |db| db.stop_following(me_id, follow_id)).await? {
        info!("User {} stopped following {}", me_id, follow_id);
    }

    Ok(Redirect::to(&format!("/users/{me_id}/following")).into_response())
}

pub async fn profile_form(
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    jar: CookieJar,
) -> impl IntoResponse {
    let form = UserEditForm::from_user(&me);
    let (jar, layout) = Layout::take(jar, Some(me));
    (
        jar,
        views::users::edit(&layout, &form, &Default::default()),
    )
}

/// Saves profile changes once the current password checks out.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    jar: CookieJar,
    Form(form): Form<UserEditForm>,
) -> Result<Response, AppError> {
    let mut errors = form.validate().err().unwrap_or_default();
    let mut flashes = Vec::new();

    if !form.password.is_empty()
        && authenticate(&state, me.username.clone(), form.password.clone())
            .await?
            .is_none()
    {
        flashes.push(Flash::danger("Failed to verify password!"));
        errors.add("password", "Incorrect password");
    }

    if !errors.is_empty() {
        let (jar, mut layout) = Layout::take(jar, Some(me));
        layout.flashes.extend(flashes);
        return Ok((
            StatusCode::BAD_REQUEST,
            jar,
            views::users::edit(&layout, &form, &errors),
        )
            .into_response());
    }

    let me_id = me.id;
    let update = form.to_update();
    match with_db(&state, move |db| db.update_user(me_id, &update)).await {
        Ok(_) => {
            info!("User {} updated their profile", me_id);
            Ok(Redirect::to(&format!("/users/{me_id}")).into_response())
        }
        Err(AppError::Db(DbError::Conflict(reason))) => {
            warn!("Profile update for user {} rejected: {}", me_id, reason);
            let jar = session::push_flash(
                jar,
                Flash::danger(format!("Failed to update {}", me.username)),
            );
            Ok((jar, Redirect::to("/")).into_response())
        }
        Err(e) => Err(e),
    }
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let jar = session::do_logout(jar);

    let me_id = me.id;
    with_db(&state, move |db| db.delete_user(me_id)).await?;
    info!("User {} ({}) deleted their account", me.username, me_id);

    Ok((jar, Redirect::to("/signup")).into_response())
}
