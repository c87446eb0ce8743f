//! User handlers

use crate::handlers::{is_json_content_type, NOT_JSON_MSG};
use crate::storage::db::{Post, User};
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
pub struct CreateUserRequest {
    username: String,
    password: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    username: String,
    password: String,
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Response, StatusCode> {
    if !is_json_content_type(&headers) {
        return Ok(Json(NOT_JSON_MSG).into_response());
    }

    let req: CreateUserRequest = serde_json::from_str(&body).map_err(|e| {
        error!("Malformed user creation body: {}", e);
        StatusCode::BAD_REQUEST
    })?;

    info!("Creating user: {}", req.username);

    let password_hash = state.passwords.hash(&req.password).map_err(|e| {
        error!("Password hashing error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    state
        .db
        .create_user(&req.username, &password_hash, req.email.as_deref())
        .await
        .map_err(|e| {
            error!("Database error creating user: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json("User Created").into_response())
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<User>>, StatusCode> {
    let users = state.db.list_users().await.map_err(|e| {
        error!("Database error listing users: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(users))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Option<User>>, StatusCode> {
    let user = state.db.get_user_by_id(id).await.map_err(|e| {
        error!("Database error fetching user {}: {}", id, e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(user))
}

pub async fn get_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Option<User>>, StatusCode> {
    let user = state.db.get_user_by_username(&username).await.map_err(|e| {
        error!("Database error fetching user {}: {}", username, e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(user))
}

pub async fn verify(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Response, StatusCode> {
    if !is_json_content_type(&headers) {
        return Ok(Json(NOT_JSON_MSG).into_response());
    }

    let req: VerifyRequest = serde_json::from_str(&body).map_err(|e| {
        error!("Malformed verification body: {}", e);
        StatusCode::BAD_REQUEST
    })?;

    info!("Verification attempt for: {}", req.username);

    let stored = state
        .db
        .get_password_hash(&req.username)
        .await
        .map_err(|e| {
            error!("Database error during verification: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let Some(stored) = stored else {
        return Ok(Json("User NOT Verified: Username").into_response());
    };

    if !state.passwords.verify(&req.password, &stored) {
        return Ok(Json("User NOT Verified: Password").into_response());
    }

    info!("Verification successful for: {}", req.username);

    Ok(Json("User Verified").into_response())
}

pub async fn posts_by_user_id(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Post>>, StatusCode> {
    let posts = state.db.list_posts_by_owner(user_id).await.map_err(|e| {
        error!("Database error listing posts for user {}: {}", user_id, e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(posts))
}

pub async fn posts_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Response, StatusCode> {
    let user_id = state.db.resolve_user_id(&username).await.map_err(|e| {
        error!("Database error resolving username {}: {}", username, e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let Some(user_id) = user_id else {
        return Ok((StatusCode::NOT_FOUND, Json("Unknown username")).into_response());
    };

    let posts = state.db.list_posts_by_owner(user_id).await.map_err(|e| {
        error!("Database error listing posts for {}: {}", username, e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(posts).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::PasswordService;
    use crate::storage::Database;
    use axum::http::{header, HeaderValue};
    use std::sync::Arc;

    async fn test_state(tag: &str) -> AppState {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("postboard_users_{}_{}.db", tag, nanos));
        AppState {
            db: Arc::new(Database::new(&path.to_string_lossy()).await.unwrap()),
            passwords: Arc::new(PasswordService::new()),
        }
    }

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_create_user_scenario() {
        let state = test_state("create").await;

        let response = create(
            State(state.clone()),
            json_headers(),
            r#"{"username":"alice","password":"secret1","email":null}"#.to_string(),
        )
        .await
        .unwrap();
        assert_eq!(body_string(response).await, "\"User Created\"");

        let Json(user) = get_by_username(State(state.clone()), Path("alice".to_string()))
            .await
            .unwrap();
        let user = user.unwrap();
        assert_eq!(user.username, "alice");
        assert_ne!(user.password, "secret1");
        assert!(!user.password.is_empty());
        assert_eq!(user.email, None);
        assert!(state.passwords.verify("secret1", &user.password));
    }

    #[tokio::test]
    async fn test_create_user_rejects_non_json() {
        let state = test_state("non_json").await;

        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        let response = create(
            State(state.clone()),
            headers,
            r#"{"username":"alice","password":"secret1"}"#.to_string(),
        )
        .await
        .unwrap();
        assert_eq!(
            body_string(response).await,
            "\"Error: Data must be sent as JSON.\""
        );

        // Storage was never touched
        assert!(state.db.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let state = test_state("malformed").await;

        let result = create(State(state.clone()), json_headers(), "{not json".to_string()).await;
        assert_eq!(result.err(), Some(StatusCode::BAD_REQUEST));
        assert!(state.db.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_verification_messages() {
        let state = test_state("verify").await;

        create(
            State(state.clone()),
            json_headers(),
            r#"{"username":"alice","password":"secret1"}"#.to_string(),
        )
        .await
        .unwrap();

        let response = verify(
            State(state.clone()),
            json_headers(),
            r#"{"username":"alice","password":"secret1"}"#.to_string(),
        )
        .await
        .unwrap();
        assert_eq!(body_string(response).await, "\"User Verified\"");

        let response = verify(
            State(state.clone()),
            json_headers(),
            r#"{"username":"alice","password":"wrong"}"#.to_string(),
        )
        .await
        .unwrap();
        assert_eq!(
            body_string(response).await,
            "\"User NOT Verified: Password\""
        );

        let response = verify(
            State(state.clone()),
            json_headers(),
            r#"{"username":"nobody","password":"anything"}"#.to_string(),
        )
        .await
        .unwrap();
        assert_eq!(
            body_string(response).await,
            "\"User NOT Verified: Username\""
        );
    }

    #[tokio::test]
    async fn test_get_missing_user_is_null() {
        let state = test_state("missing").await;

        let Json(user) = get_by_id(State(state.clone()), Path(42)).await.unwrap();
        assert!(user.is_none());

        let Json(user) = get_by_username(State(state), Path("nobody".to_string()))
            .await
            .unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_list_users_includes_stored_hash() {
        let state = test_state("list").await;

        create(
            State(state.clone()),
            json_headers(),
            r#"{"username":"alice","password":"secret1","email":"a@example.com"}"#.to_string(),
        )
        .await
        .unwrap();

        let Json(users) = list(State(state)).await.unwrap();
        assert_eq!(users.len(), 1);
        // Observed behavior preserved: the stored hash is serialized out
        assert!(users[0].password.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_posts_by_username_unknown_is_not_found() {
        let state = test_state("posts_unknown").await;

        let response = posts_by_username(State(state), Path("nobody".to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, "\"Unknown username\"");
    }

    #[tokio::test]
    async fn test_posts_by_username_known() {
        let state = test_state("posts_known").await;

        create(
            State(state.clone()),
            json_headers(),
            r#"{"username":"alice","password":"secret1"}"#.to_string(),
        )
        .await
        .unwrap();
        let user_id = state.db.resolve_user_id("alice").await.unwrap().unwrap();
        state.db.create_post("hello", "red", user_id).await.unwrap();

        let response = posts_by_username(State(state.clone()), Path("alice".to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let posts: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        let posts = posts.as_array().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0]["content"], "hello");

        // A user with no posts gets an empty list, not an error
        create(
            State(state.clone()),
            json_headers(),
            r#"{"username":"bob","password":"secret2"}"#.to_string(),
        )
        .await
        .unwrap();
        let response = posts_by_username(State(state), Path("bob".to_string()))
            .await
            .unwrap();
        assert_eq!(body_string(response).await, "[]");
    }
}
