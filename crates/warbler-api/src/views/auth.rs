use axum::response::Html;

use crate::forms::{FieldErrors, LoginForm, SignupForm};

use super::{Layout, input, page};

pub fn signup(layout: &Layout, form: &SignupForm, errors: &FieldErrors) -> Html<String> {
    let body = format!(
        r#"<div class="row justify-content-md-center"><div class="col-md-7 col-lg-5"><h2 class="join-message">Join Warbler today.</h2><form method="POST" id="user_form">{username}{email}{password}{image_url}<button class="btn btn-primary btn-lg btn-block">Sign me up!</button></form></div></div>"#,
        username = input("text", "username", "Username", &form.username, errors),
        email = input("email", "email", "E-mail", &form.email, errors),
        password = input("password", "password", "Password", "", errors),
        image_url = input("url", "image_url", "(Optional) Image URL", &form.image_url, errors),
    );
    page(layout, "Sign up", &body)
}

pub fn login(layout: &Layout, form: &LoginForm, errors: &FieldErrors) -> Html<String> {
    let body = format!(
        r#"<div class="row justify-content-md-center"><div class="col-md-7 col-lg-5"><h2 class="join-message">Welcome back.</h2><form method="POST" id="user_form">{username}{password}<button class="btn btn-primary btn-block btn-lg">Log in</button></form></div></div>"#,
        username = input("text", "username", "Username", &form.username, errors),
        password = input("password", "password", "Password", "", errors),
    );
    page(layout, "Log in", &body)
}
