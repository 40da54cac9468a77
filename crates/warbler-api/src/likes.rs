use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, warn};

use warbler_db::DbError;
use warbler_types::api::{CreateLikeRequest, LikeResponse, MessageBody};

use crate::auth::{AppState, with_db};
use crate::error::{ApiError, AppError};
use crate::middleware::CurrentUser;

/// POST /api/likes: record that the current user likes a message.
pub async fn create_like(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    payload: Result<Json<CreateLikeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let message_id = req
        .message_id
        .ok_or_else(|| ApiError::BadRequest("message_id is required".into()))?;

    if req.user_id.is_some_and(|id| id != user.id) {
        warn!("User {} tried to like on behalf of {:?}", user.id, req.user_id);
        return Err(ApiError::BadRequest(
            "Cannot create a like for another user".into(),
        ));
    }

    let user_id = user.id;
    let like = match with_db(&state, move |db| db.create_like(user_id, message_id)).await {
        Ok(like) => like,
        Err(AppError::Db(DbError::Conflict(reason))) => {
            warn!("Like ({}, {}) rejected: {}", user_id, message_id, reason);
            return Err(ApiError::BadRequest(
                "Failed to create a like association".into(),
            ));
        }
        Err(e) => return Err(e.into()),
    };
    info!("User {} liked message {} (like {})", user_id, message_id, like.id);

    Ok((StatusCode::CREATED, Json(LikeResponse { likes: like })))
}

/// DELETE /api/likes/{id}: remove one of the current user's likes.
pub async fn delete_like(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(like_id) = path?;
    let not_found = || ApiError::NotFound(format!("Likes({like_id}) not found"));

    let like = with_db(&state, move |db| db.get_like(like_id))
        .await?
        .ok_or_else(not_found)?;

    // Someone else's like is reported as missing.
    if like.user_id != user.id {
        return Err(not_found());
    }

    if !with_db(&state, move |db| db.delete_like(like_id)).await? {
        return Err(not_found());
    }
    info!("User {} removed like {}", user.id, like_id);

    Ok(Json(MessageBody::new("Deleted")))
}
