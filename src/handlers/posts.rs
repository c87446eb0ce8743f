//! Post handlers

use crate::handlers::{is_json_content_type, NOT_JSON_MSG};
use crate::storage::db::Post;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::{error, info};

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    content: String,
    color: String,
    #[serde(rename = "ownerUserId")]
    owner_user_id: i64,
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Response, StatusCode> {
    if !is_json_content_type(&headers) {
        return Ok(Json(NOT_JSON_MSG).into_response());
    }

    let req: CreatePostRequest = serde_json::from_str(&body).map_err(|e| {
        error!("Malformed post creation body: {}", e);
        StatusCode::BAD_REQUEST
    })?;

    info!("Creating post for user {}", req.owner_user_id);

    // The owner id is taken as-is; no existence check against users
    state
        .db
        .create_post(&req.content, &req.color, req.owner_user_id)
        .await
        .map_err(|e| {
            error!("Database error creating post: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json("Post Created").into_response())
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Post>>, StatusCode> {
    let posts = state.db.list_posts().await.map_err(|e| {
        error!("Database error listing posts: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(posts))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Option<Post>>, StatusCode> {
    let post = state.db.get_post_by_id(id).await.map_err(|e| {
        error!("Database error fetching post {}: {}", id, e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(post))
}
