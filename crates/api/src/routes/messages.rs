//! Message notification route.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use telechat_common::error::AppError;
use telechat_engine::{DispatchReport, MessageEvent};

use crate::extract::ApiJson;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/messages/send-notif", post(send_message_notification))
}

/// Request body describing a message that was just sent.
#[derive(Debug, Deserialize)]
pub struct SendNotifRequest {
    pub sender_id: String,
    pub chat_id: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct SentEntry {
    pub receiver_id: String,
    pub message_id: String,
}

#[derive(Debug, Serialize)]
pub struct SkippedEntry {
    pub receiver_id: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct SendNotifResponse {
    pub success: bool,
    pub chat_id: String,
    pub chat_type: String,
    pub sent: Vec<SentEntry>,
    pub skipped: Vec<SkippedEntry>,
}

impl From<DispatchReport> for SendNotifResponse {
    fn from(report: DispatchReport) -> Self {
        let sent = report
            .sent()
            .map(|(receiver_id, message_id)| SentEntry {
                receiver_id: receiver_id.to_string(),
                message_id: message_id.to_string(),
            })
            .collect();
        let skipped = report
            .skipped()
            .map(|(receiver_id, reason)| SkippedEntry {
                receiver_id: receiver_id.to_string(),
                reason: reason.to_string(),
            })
            .collect();

        Self {
            success: true,
            chat_id: report.chat_id,
            chat_type: report.chat_kind.to_string(),
            sent,
            skipped,
        }
    }
}

/// POST /api/messages/send-notif: Notify the other chat participants.
///
/// Succeeds even when every recipient was skipped; the per-recipient
/// outcome is in `sent` / `skipped`.
async fn send_message_notification(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SendNotifRequest>,
) -> Result<Json<SendNotifResponse>, AppError> {
    if req.sender_id.trim().is_empty() || req.chat_id.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "sender_id and chat_id are required".to_string(),
        ));
    }

    tracing::debug!(
        chat_id = %req.chat_id,
        sender_id = %req.sender_id,
        content_len = req.content.len(),
        "send-notif received"
    );

    let event = MessageEvent {
        sender_id: req.sender_id,
        chat_id: req.chat_id,
        content: req.content,
    };

    let report = state.dispatcher.dispatch(&event).await?;
    Ok(Json(report.into()))
}
