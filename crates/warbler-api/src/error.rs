use axum::{
    Json,
    extract::rejection::PathRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{debug, error};

use warbler_db::DbError;
use warbler_types::api::MessageBody;

use crate::views;

/// Errors from HTML routes. Rendered as an error page.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,

    #[error("database error: {0}")]
    Db(#[from] DbError),

    #[error("spawn_blocking join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Ids in page URLs are integers; anything else names no page.
impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        debug!("Unmatched path parameter: {}", rejection.body_text());
        AppError::NotFound
    }
}

/// Marks a rendered error page so `load_session` can redraw it for the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPage {
    NotFound,
    ServerError,
}

impl ErrorPage {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorPage::NotFound => StatusCode::NOT_FOUND,
            ErrorPage::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn render(self, layout: &views::Layout) -> Response {
        let html = match self {
            ErrorPage::NotFound => views::not_found(layout),
            ErrorPage::ServerError => views::server_error(layout),
        };
        let mut res = (self.status(), html).into_response();
        res.extensions_mut().insert(self);
        res
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let page = match self {
            AppError::NotFound => ErrorPage::NotFound,
            err => {
                error!("InternalServerError: {}", err);
                ErrorPage::ServerError
            }
        };
        page.render(&views::Layout::default())
    }
}

/// Fallback for URLs no route matches.
pub async fn not_found() -> AppError {
    AppError::NotFound
}

/// Errors from the JSON likes API. Rendered as `{"message": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal server error")]
    Internal,
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::NotFound => ApiError::NotFound("Not found".into()),
            err => {
                error!("InternalServerError: {}", err);
                ApiError::Internal
            }
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        debug!("Unmatched path parameter: {}", rejection.body_text());
        ApiError::NotFound("Not found".into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Access unauthorized.".into()),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".into(),
            ),
        };
        (status, Json(MessageBody::new(message))).into_response()
    }
}
