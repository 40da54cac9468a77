use serde::{Deserialize, Serialize};

use crate::models::Like;

// -- Likes --

/// Body of `POST /api/likes`. `user_id` defaults to the logged-in user and
/// must match it when given.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateLikeRequest {
    pub user_id: Option<i64>,
    pub message_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LikeResponse {
    pub likes: Like,
}

/// Plain `{"message": ...}` body used for API errors and confirmations.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
