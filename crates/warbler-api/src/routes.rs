use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::{self, AppState};
use crate::error;
use crate::likes;
use crate::messages;
use crate::middleware::{load_session, no_cache, require_api_login, require_login};
use crate::users;

/// The whole application: pages, the likes API and static assets.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(messages::homepage))
        .route("/signup", get(auth::signup_form).post(auth::signup))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/users", get(users::list_users))
        .route("/users/{user_id}", get(users::show_user))
        .route("/users/{user_id}/likes", get(users::show_likes))
        .route("/messages/{message_id}", get(messages::show_message));

    let protected_routes = Router::new()
        .route("/users/{user_id}/following", get(users::show_following))
        .route("/users/{user_id}/followers", get(users::show_followers))
        .route("/users/follow/{follow_id}", post(users::add_follow))
        .route("/users/stop-following/{follow_id}", post(users::stop_following))
        .route(
            "/users/profile",
            get(users::profile_form).post(users::update_profile),
        )
        .route("/users/delete", post(users::delete_user))
        .route("/messages", get(messages::list_messages))
        .route(
            "/messages/new",
            get(messages::new_message_form).post(messages::create_message),
        )
        .route("/messages/{message_id}/delete", post(messages::delete_message))
        .route_layer(middleware::from_fn(require_login));

    let api_routes = Router::new()
        .route("/api/likes", post(likes::create_like))
        .route("/api/likes/{like_id}", delete(likes::delete_like))
        .route_layer(middleware::from_fn(require_api_login));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(api_routes)
        .nest_service("/static", ServeDir::new(&state.static_dir))
        .fallback(error::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), load_session))
        .layer(middleware::map_response(no_cache))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
