use axum::{
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use warbler_types::models::User;

use crate::auth::{AppState, with_db};
use crate::error::{ApiError, AppError, ErrorPage};
use crate::session::{self, Flash};
use crate::views::Layout;

/// Whoever made the request, if logged in. Present on every request.
#[derive(Debug, Clone, Default)]
pub struct Viewer(pub Option<User>);

/// The logged-in user. Present only behind `require_login`/`require_api_login`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Resolve the session cookie to a `Viewer`. A stale or forged cookie, or
/// one for a deleted user, yields an anonymous viewer.
/// Error pages from further in are redrawn with the viewer's navbar.
pub async fn load_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = match session::session_user_id(&jar, &state.secret_key) {
        Some(id) => with_db(&state, move |db| db.get_user(id))
            .await?
            .map(User::from),
        None => None,
    };

    req.extensions_mut().insert(Viewer(user.clone()));
    let res = next.run(req).await;

    match (res.extensions().get::<ErrorPage>().copied(), user) {
        (Some(page), Some(user)) => Ok(page.render(&Layout {
            viewer: Some(user),
            flashes: Vec::new(),
        })),
        _ => Ok(res),
    }
}

fn current_user(req: &Request) -> Option<User> {
    req.extensions().get::<Viewer>().and_then(|v| v.0.clone())
}

/// Anonymous requests are bounced to `/` with "Access unauthorized.".
pub async fn require_login(jar: CookieJar, mut req: Request, next: Next) -> Response {
    match current_user(&req) {
        Some(user) => {
            req.extensions_mut().insert(CurrentUser(user));
            next.run(req).await
        }
        None => (
            session::push_flash(jar, Flash::danger("Access unauthorized.")),
            Redirect::to("/"),
        )
            .into_response(),
    }
}

/// JSON flavour of `require_login`: anonymous requests get a 401 body.
pub async fn require_api_login(mut req: Request, next: Next) -> Response {
    match current_user(&req) {
        Some(user) => {
            req.extensions_mut().insert(CurrentUser(user));
            next.run(req).await
        }
        None => ApiError::Unauthorized.into_response(),
    }
}

/// Pages depend on session state; keep browsers and proxies from caching them.
pub async fn no_cache(mut res: Response) -> Response {
    let headers = res.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    res
}
