//! Cookie-backed session state.
//!
//! The logged-in user lives in `warbler_session` as an HS256 JWT. Flash
//! messages ride in `warbler_flash` as base64 JSON until a page renders them.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const SESSION_COOKIE: &str = "warbler_session";
pub const FLASH_COOKIE: &str = "warbler_flash";

const SESSION_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id, as a string per JWT convention.
    pub sub: String,
    pub exp: usize,
}

pub fn create_token(secret: &str, user_id: i64) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(SESSION_DAYS)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// User id carried by a valid, unexpired token.
pub fn decode_token(secret: &str, token: &str) -> Option<i64> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| debug!("Rejected session token: {}", e))
    .ok()?;

    data.claims.sub.parse().ok()
}

/// User id of the session in `jar`, if any.
pub fn session_user_id(jar: &CookieJar, secret: &str) -> Option<i64> {
    let cookie = jar.get(SESSION_COOKIE)?;
    decode_token(secret, cookie.value())
}

pub fn do_login(
    jar: CookieJar,
    secret: &str,
    user_id: i64,
) -> Result<CookieJar, jsonwebtoken::errors::Error> {
    let token = create_token(secret, user_id)?;
    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    Ok(jar.add(cookie))
}

/// Drops the session cookie, flashing "Logged out!" if there was one.
pub fn do_logout(jar: CookieJar) -> CookieJar {
    if jar.get(SESSION_COOKIE).is_none() {
        return jar;
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    push_flash(jar, Flash::success("Logged out!"))
}

// -- Flash messages --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    /// Bootstrap alert flavour: "success", "danger", ...
    pub category: String,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            category: "success".into(),
            message: message.into(),
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            category: "danger".into(),
            message: message.into(),
        }
    }
}

fn read_flashes(jar: &CookieJar) -> Vec<Flash> {
    jar.get(FLASH_COOKIE)
        .and_then(|c| B64.decode(c.value()).ok())
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

/// Queue a flash for the next rendered page.
pub fn push_flash(jar: CookieJar, flash: Flash) -> CookieJar {
    let mut flashes = read_flashes(&jar);
    flashes.push(flash);

    let Ok(json) = serde_json::to_vec(&flashes) else {
        return jar;
    };
    let cookie = Cookie::build((FLASH_COOKIE, B64.encode(json)))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    jar.add(cookie)
}

/// Read and clear pending flashes.
pub fn take_flashes(jar: CookieJar) -> (CookieJar, Vec<Flash>) {
    if jar.get(FLASH_COOKIE).is_none() {
        return (jar, Vec::new());
    }
    let flashes = read_flashes(&jar);
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), flashes)
}
