//! Server-rendered HTML.
//!
//! Each page is a plain function returning `Html<String>`; `page` wraps the
//! body in the shared layout (navbar plus pending flash messages). Anything
//! user-supplied goes through `escape`.

pub mod auth;
pub mod messages;
pub mod users;

use std::collections::HashMap;
use std::fmt::Write;

use axum::response::Html;
use axum_extra::extract::cookie::CookieJar;

use warbler_db::models::UserStats;
use warbler_types::models::{Like, Message, User};

use crate::forms::FieldErrors;
use crate::session::{self, Flash};

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

/// Per-request layout data: who is looking, and which flashes to show.
#[derive(Debug, Default)]
pub struct Layout {
    pub viewer: Option<User>,
    pub flashes: Vec<Flash>,
}

impl Layout {
    /// Build a layout, consuming the pending flashes in `jar`.
    pub fn take(jar: CookieJar, viewer: Option<User>) -> (CookieJar, Self) {
        let (jar, flashes) = session::take_flashes(jar);
        (jar, Self { viewer, flashes })
    }

    /// Add a flash shown on this very page.
    pub fn flash(mut self, flash: Flash) -> Self {
        self.flashes.push(flash);
        self
    }
}

/// Which messages the viewer has liked, and under which like id.
#[derive(Debug, Default)]
pub struct LikeContext {
    pub viewer_id: i64,
    /// message id -> like id
    likes: HashMap<i64, i64>,
}

impl LikeContext {
    pub fn new(viewer_id: i64, likes: &[Like]) -> Self {
        Self {
            viewer_id,
            likes: likes.iter().map(|l| (l.message_id, l.id)).collect(),
        }
    }

    pub fn like_id(&self, message_id: i64) -> Option<i64> {
        self.likes.get(&message_id).copied()
    }
}

/// Data for the banner at the top of every per-user page.
#[derive(Debug)]
pub struct ProfileHeader {
    pub user: User,
    pub stats: UserStats,
    /// Whether the viewer follows this user. Always false for oneself.
    pub viewer_follows: bool,
}

fn navbar(viewer: Option<&User>) -> String {
    let mut nav = String::from(
        r#"<nav class="navbar navbar-expand"><div class="container-fluid"><a href="/" class="navbar-brand"><span>Warbler</span></a><ul class="nav navbar-nav navbar-right">"#,
    );
    match viewer {
        Some(user) => {
            let _ = write!(
                nav,
                r#"<li><form class="navbar-form" action="/users"><input name="q" class="form-control" placeholder="Search Warbler" id="search"><button class="btn btn-default">Search</button></form></li><li><a href="/users/{id}"><img src="{img}" alt="{name}"></a></li><li><a href="/messages">Recent</a></li><li><a href="/messages/new">New Message</a></li><li><a href="/logout">Log out</a></li>"#,
                id = user.id,
                img = escape(&user.image_url),
                name = escape(&user.username),
            );
        }
        None => {
            nav.push_str(r#"<li><a href="/signup">Sign up</a></li><li><a href="/login">Log in</a></li>"#);
        }
    }
    nav.push_str("</ul></div></nav>");
    nav
}

fn flash_list(flashes: &[Flash]) -> String {
    flashes
        .iter()
        .map(|f| {
            format!(
                r#"<div class="alert alert-{}">{}</div>"#,
                escape(&f.category),
                escape(&f.message)
            )
        })
        .collect()
}

/// Wrap `body` in the site layout.
pub fn page(layout: &Layout, title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>{title}</title>
<link rel="stylesheet" href="/static/stylesheets/style.css">
</head>
<body class="{body_class}">
{nav}
<div class="container">
{flashes}
{body}
</div>
<script src="/static/scripts/app.js"></script>
</body>
</html>"#,
        title = escape(title),
        body_class = if layout.viewer.is_some() { "" } else { "anon" },
        nav = navbar(layout.viewer.as_ref()),
        flashes = flash_list(&layout.flashes),
    ))
}

pub fn not_found(layout: &Layout) -> Html<String> {
    page(
        layout,
        "Not Found",
        r#"<div class="text-center"><h1>404</h1><p>Sorry, we can't find that page.</p><a href="/">Go home</a></div>"#,
    )
}

pub fn server_error(layout: &Layout) -> Html<String> {
    page(
        layout,
        "Error",
        r#"<div class="text-center"><h1>500</h1><p>Something went wrong on our end.</p></div>"#,
    )
}

// -- Shared partials --

fn field_errors(errors: &FieldErrors, field: &str) -> String {
    errors
        .get(field)
        .iter()
        .map(|e| format!(r#"<span class="text-danger">{}</span>"#, escape(e)))
        .collect()
}

/// `<input>` with its error list. Password inputs never echo their value.
fn input(kind: &str, name: &str, label: &str, value: &str, errors: &FieldErrors) -> String {
    let value = if kind == "password" { "" } else { value };
    format!(
        r#"<div class="form-group"><input class="form-control" id="{name}" name="{name}" type="{kind}" placeholder="{label}" value="{value}">{errors}</div>"#,
        label = escape(label),
        value = escape(value),
        errors = field_errors(errors, name),
    )
}

fn textarea(name: &str, label: &str, value: &str, rows: u32, errors: &FieldErrors) -> String {
    format!(
        r#"<div class="form-group"><textarea class="form-control" id="{name}" name="{name}" placeholder="{label}" rows="{rows}">{value}</textarea>{errors}</div>"#,
        label = escape(label),
        value = escape(value),
        errors = field_errors(errors, name),
    )
}

fn message_item(message: &Message, likes: Option<&LikeContext>) -> String {
    let mut item = format!(
        r#"<li class="list-group-item"><a href="/messages/{id}" class="message-link"></a><a href="/users/{uid}"><img src="{img}" alt="" class="timeline-image"></a><div class="message-area"><a href="/users/{uid}">@{name}</a> <span class="text-muted">{date}</span><p>{text}</p></div>"#,
        id = message.id,
        uid = message.user_id,
        img = escape(&message.author_image_url),
        name = escape(&message.author_username),
        date = message.timestamp.format("%d %B %Y"),
        text = escape(&message.text),
    );

    if let Some(ctx) = likes.filter(|ctx| ctx.viewer_id != message.user_id) {
        let (liked_attr, btn, icon) = match ctx.like_id(message.id) {
            Some(like_id) => (format!(r#" data-likes-id="{like_id}""#), "btn-primary", "fas"),
            None => (String::new(), "btn-secondary", "far"),
        };
        let _ = write!(
            item,
            r#"<form class="messages-form" data-message-id="{mid}" data-user-id="{uid}"{liked_attr}><button class="btn btn-sm {btn}"><i class="{icon} fa-thumbs-up"></i></button></form>"#,
            mid = message.id,
            uid = ctx.viewer_id,
        );
    }

    item.push_str("</li>");
    item
}

fn message_list(messages: &[Message], likes: Option<&LikeContext>) -> String {
    let items: String = messages.iter().map(|m| message_item(m, likes)).collect();
    format!(r#"<ul class="list-group" id="messages">{items}</ul>"#)
}
