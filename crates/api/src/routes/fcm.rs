//! Push token registration and test pushes.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use telechat_common::error::AppError;
use telechat_engine::payload::test_payload;

use crate::extract::ApiJson;
use crate::state::AppState;

const DEFAULT_TEST_TITLE: &str = "Test TeleChat";
const DEFAULT_TEST_BODY: &str = "Ceci est une notification de test.";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/fcm/register", post(register_token))
        .route("/api/fcm/test-push", post(test_push))
}

/// Request body for token registration.
#[derive(Debug, Deserialize)]
pub struct RegisterTokenRequest {
    pub user_id: String,
    pub fcm_token: String,
}

/// Request body for a test push.
#[derive(Debug, Deserialize)]
pub struct TestPushRequest {
    pub token: String,
    pub title: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct TestPushResponse {
    pub success: bool,
    pub message_id: String,
}

/// POST /api/fcm/register: Upsert the user's current push token.
async fn register_token(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterTokenRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    if req.user_id.trim().is_empty() || req.fcm_token.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "user_id and fcm_token are required".to_string(),
        ));
    }

    state
        .store
        .upsert_push_token(&req.user_id, &req.fcm_token)
        .await?;

    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/fcm/test-push: Send a synthetic data-only push to a raw token.
async fn test_push(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<TestPushRequest>,
) -> Result<Json<TestPushResponse>, AppError> {
    if req.token.trim().is_empty() {
        return Err(AppError::InvalidRequest("token is required".to_string()));
    }

    let title = req.title.as_deref().unwrap_or(DEFAULT_TEST_TITLE);
    let body = req.body.as_deref().unwrap_or(DEFAULT_TEST_BODY);

    let message_id = state
        .push
        .send(&req.token, &test_payload(title, body))
        .await
        .map_err(|e| AppError::Delivery(e.to_string()))?;

    tracing::info!(message_id = %message_id, "Test push sent");
    Ok(Json(TestPushResponse {
        success: true,
        message_id,
    }))
}
