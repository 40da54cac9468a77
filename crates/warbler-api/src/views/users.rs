use std::collections::HashSet;

use axum::response::Html;

use warbler_types::models::{Message, User};

use crate::forms::{FieldErrors, UserEditForm};

use super::{Layout, ProfileHeader, escape, input, message_list, page, textarea};

fn follow_button(user_id: i64, following: bool) -> String {
    if following {
        format!(
            r#"<form method="POST" action="/users/stop-following/{user_id}"><button class="btn btn-primary btn-sm">Unfollow</button></form>"#
        )
    } else {
        format!(
            r#"<form method="POST" action="/users/follow/{user_id}"><button class="btn btn-outline-primary btn-sm">Follow</button></form>"#
        )
    }
}

/// Card for user listings. `following` holds the ids the viewer follows.
fn user_card(layout: &Layout, user: &User, following: &HashSet<i64>) -> String {
    let button = match &layout.viewer {
        Some(me) if me.id != user.id => follow_button(user.id, following.contains(&user.id)),
        _ => String::new(),
    };
    format!(
        r#"<div class="col-lg-4 col-md-6 col-12"><div class="card user-card"><div class="card-inner"><div class="image-wrapper"><img src="{header}" alt="" class="card-hero"></div><div class="card-contents"><a href="/users/{id}" class="card-link"><img src="{img}" alt="Image for {name}" class="card-image"><p>@{name}</p></a>{button}</div><p class="card-bio">{bio}</p></div></div></div>"#,
        id = user.id,
        header = escape(&user.header_image_url),
        img = escape(&user.image_url),
        name = escape(&user.username),
        bio = escape(user.bio.as_deref().unwrap_or_default()),
    )
}

fn user_grid(layout: &Layout, users: &[User], following: &HashSet<i64>) -> String {
    let cards: String = users.iter().map(|u| user_card(layout, u, following)).collect();
    format!(r#"<div class="row">{cards}</div>"#)
}

/// Hero banner, avatar, counters and the follow / edit controls.
fn profile_banner(layout: &Layout, header: &ProfileHeader) -> String {
    let user = &header.user;
    let stats = &header.stats;

    let controls = match &layout.viewer {
        Some(me) if me.id == user.id => String::from(
            r#"<a href="/users/profile" class="btn btn-outline-secondary">Edit Profile</a><form method="POST" action="/users/delete" class="form-inline"><button class="btn btn-outline-danger ml-2">Delete Profile</button></form>"#,
        ),
        Some(_) => follow_button(user.id, header.viewer_follows),
        None => String::new(),
    };

    format!(
        r#"<div id="warbler-hero" class="full-width"><img src="{header_img}" alt="Header image for {name}"></div><img src="{img}" alt="Image for {name}" id="profile-avatar"><div class="row full-width"><div class="container"><div class="row justify-content-end"><div class="col-9"><ul class="user-stats nav nav-pills"><li class="stat"><p class="small">Messages</p><h4><a href="/users/{id}">{messages}</a></h4></li><li class="stat"><p class="small">Following</p><h4><a href="/users/{id}/following">{following}</a></h4></li><li class="stat"><p class="small">Followers</p><h4><a href="/users/{id}/followers">{followers}</a></h4></li><li class="stat"><p class="small">Likes</p><h4><a href="/users/{id}/likes">{likes}</a></h4></li><div class="ml-auto">{controls}</div></ul></div></div></div></div><div class="row"><div class="col-sm-3"><h4 id="sidebar-username">@{name}</h4><p class="user-bio">{bio}</p><p class="user-location"><span class="fa fa-map-marker"></span>{location}</p></div><div class="col-sm-9">"#,
        id = user.id,
        header_img = escape(&user.header_image_url),
        img = escape(&user.image_url),
        name = escape(&user.username),
        bio = escape(user.bio.as_deref().unwrap_or_default()),
        location = escape(user.location.as_deref().unwrap_or_default()),
        messages = stats.messages,
        following = stats.following,
        followers = stats.followers,
        likes = stats.likes,
    )
}

/// A per-user page: banner, then `content` in the main column.
fn profile_page(layout: &Layout, header: &ProfileHeader, title: &str, content: &str) -> Html<String> {
    let body = format!(
        "{banner}{content}</div></div>",
        banner = profile_banner(layout, header),
    );
    page(layout, &format!("{title} | @{}", header.user.username), &body)
}

pub fn index(
    layout: &Layout,
    users: &[User],
    following: &HashSet<i64>,
    search: Option<&str>,
) -> Html<String> {
    let content = if users.is_empty() {
        format!(
            r#"<h3>Sorry, no users found{}</h3>"#,
            search
                .map(|q| format!(" matching &quot;{}&quot;", escape(q)))
                .unwrap_or_default()
        )
    } else {
        user_grid(layout, users, following)
    };
    page(layout, "Users", &content)
}

pub fn show(layout: &Layout, header: &ProfileHeader, messages: &[Message]) -> Html<String> {
    profile_page(layout, header, "Profile", &message_list(messages, None))
}

pub fn likes(layout: &Layout, header: &ProfileHeader, messages: &[Message]) -> Html<String> {
    profile_page(layout, header, "Likes", &message_list(messages, None))
}

pub fn following(
    layout: &Layout,
    header: &ProfileHeader,
    users: &[User],
    mine: &HashSet<i64>,
) -> Html<String> {
    profile_page(layout, header, "Following", &user_grid(layout, users, mine))
}

pub fn followers(
    layout: &Layout,
    header: &ProfileHeader,
    users: &[User],
    mine: &HashSet<i64>,
) -> Html<String> {
    profile_page(layout, header, "Followers", &user_grid(layout, users, mine))
}

pub fn edit(layout: &Layout, form: &UserEditForm, errors: &FieldErrors) -> Html<String> {
    let body = format!(
        r#"<div class="row justify-content-md-center"><div class="col-md-7 col-lg-5"><h2 class="join-message">Edit Your Profile.</h2><form method="POST" id="user_form">{username}{email}{image_url}{header_image_url}{location}{bio}<p>To confirm changes, enter your password:</p>{password}<div class="edit-btn-area"><button class="btn btn-success">Edit this user!</button><a href="/users/{id}" class="btn btn-outline-secondary">Cancel</a></div></form></div></div>"#,
        username = input("text", "username", "Username", &form.username, errors),
        email = input("email", "email", "E-mail", &form.email, errors),
        image_url = input("url", "image_url", "(Optional) Image URL", &form.image_url, errors),
        header_image_url = input(
            "url",
            "header_image_url",
            "(Optional) Background Image URL",
            &form.header_image_url,
            errors,
        ),
        location = input("text", "location", "Location", &form.location, errors),
        bio = textarea("bio", "Bio", &form.bio, 5, errors),
        password = input("password", "password", "Verify Password", "", errors),
        id = layout.viewer.as_ref().map_or(0, |u| u.id),
    );
    page(layout, "Edit profile", &body)
}
