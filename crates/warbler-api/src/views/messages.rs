use axum::response::Html;

use warbler_types::models::Message;

use crate::forms::{FieldErrors, MessageForm};

use super::{Layout, LikeContext, escape, message_list, page, textarea};

pub fn home_anon(layout: &Layout) -> Html<String> {
    page(
        layout,
        "Warbler",
        r#"<div class="home-hero"><h1>What's Happening?</h1><h4>New to Warbler?</h4><a href="/signup" class="btn btn-primary">Sign up now</a></div>"#,
    )
}

/// Logged-in home: the following feed beside a small profile card.
pub fn home(layout: &Layout, messages: &[Message], likes: &LikeContext) -> Html<String> {
    let aside = layout
        .viewer
        .as_ref()
        .map(|user| {
            format!(
                r#"<aside class="col-md-4 col-lg-3"><div class="card user-card"><a href="/users/{id}" class="card-link"><img src="{img}" alt="Image for {name}" class="card-image"><p>@{name}</p></a></div></aside>"#,
                id = user.id,
                img = escape(&user.image_url),
                name = escape(&user.username),
            )
        })
        .unwrap_or_default();

    let body = format!(
        r#"<div class="row">{aside}<div class="col-lg-6 col-md-8">{list}</div></div>"#,
        list = message_list(messages, Some(likes)),
    );
    page(layout, "Home", &body)
}

/// Newest messages site-wide.
pub fn recent(layout: &Layout, messages: &[Message], likes: &LikeContext) -> Html<String> {
    let body = format!(
        r#"<div class="row"><div class="col-lg-6 col-md-8"><h2>Recent messages</h2>{list}</div></div>"#,
        list = message_list(messages, Some(likes)),
    );
    page(layout, "Recent", &body)
}

pub fn new(layout: &Layout, form: &MessageForm, errors: &FieldErrors) -> Html<String> {
    let body = format!(
        r#"<div class="row justify-content-md-center"><div class="col-md-7 col-lg-5"><h2>Add a message</h2><form method="POST">{text}<button class="btn btn-outline-success btn-block">Add my message!</button></form></div></div>"#,
        text = textarea("text", "What's happening?", &form.text, 3, errors),
    );
    page(layout, "New message", &body)
}

pub fn show(layout: &Layout, message: &Message) -> Html<String> {
    let delete = match &layout.viewer {
        Some(user) if user.id == message.user_id => format!(
            r#"<form method="POST" action="/messages/{id}/delete"><button class="btn btn-outline-danger">Delete</button></form>"#,
            id = message.id,
        ),
        _ => String::new(),
    };

    let body = format!(
        r#"<div class="bg"></div><div class="row justify-content-center"><div class="col-md-6"><ul class="list-group no-hover" id="messages"><li class="list-group-item"><a href="/users/{uid}"><img src="{img}" alt="" class="timeline-image"></a><div class="message-area"><div class="message-heading"><a href="/users/{uid}">@{name}</a>{delete}</div><p class="single-message">{text}</p><span class="text-muted">{date}</span></div></li></ul></div></div>"#,
        uid = message.user_id,
        img = escape(&message.author_image_url),
        name = escape(&message.author_username),
        text = escape(&message.text),
        date = message.timestamp.format("%d %B %Y"),
    );
    page(layout, "Message", &body)
}
