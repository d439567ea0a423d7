//! Firebase Cloud Messaging (HTTP v1) sender.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use crate::{PushData, PushError, PushSender};

/// Per-request timeout for the FCM API.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// FCM error code for tokens that are no longer valid.
const UNREGISTERED_CODE: &str = "UNREGISTERED";

/// Sends data-only messages through the FCM HTTP v1 API.
pub struct FcmSender {
    client: reqwest::Client,
    send_url: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: ErrorBody,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "errorCode", default)]
    error_code: Option<String>,
}

impl FcmSender {
    /// Build a sender for `project_id`, authenticating with an OAuth2 `access_token`.
    ///
    /// The token is sent as-is on every request and is never refreshed here.
    /// Google access tokens expire after about an hour, so a long-running
    /// process must be restarted with a fresh `FCM_ACCESS_TOKEN` (or have one
    /// minted externally) before then; afterwards every send fails with a
    /// provider error and recipients are reported as `send_error`.
    pub fn new(endpoint: &str, project_id: &str, access_token: &str) -> Result<Self, PushError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| PushError::Provider(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            send_url: format!(
                "{}/v1/projects/{}/messages:send",
                endpoint.trim_end_matches('/'),
                project_id
            ),
            access_token: access_token.to_string(),
        })
    }

    pub fn send_url(&self) -> &str {
        &self.send_url
    }

    /// Request body for a data-only message.
    fn message_body(token: &str, data: &PushData) -> serde_json::Value {
        json!({
            "message": {
                "token": token,
                "data": data,
                "android": { "priority": "high" }
            }
        })
    }

    /// Map a non-success FCM response onto a [`PushError`].
    fn classify_error(status: StatusCode, body: &str) -> PushError {
        let envelope: ErrorEnvelope = serde_json::from_str(body).unwrap_or_default();

        let unregistered = envelope
            .error
            .details
            .iter()
            .any(|d| d.error_code.as_deref() == Some(UNREGISTERED_CODE));

        if unregistered || status == StatusCode::NOT_FOUND {
            return PushError::Unregistered;
        }

        let message = if envelope.error.message.is_empty() {
            body.to_string()
        } else {
            envelope.error.message
        };
        let label = if envelope.error.status.is_empty() {
            status.to_string()
        } else {
            format!("{} {}", status.as_u16(), envelope.error.status)
        };

        PushError::Provider(format!("FCM error ({}): {}", label, message))
    }
}

#[async_trait]
impl PushSender for FcmSender {
    async fn send(&self, token: &str, data: &PushData) -> Result<String, PushError> {
        let response = self
            .client
            .post(&self.send_url)
            .bearer_auth(&self.access_token)
            .json(&Self::message_body(token, data))
            .send()
            .await
            .map_err(|e| PushError::Provider(format!("FCM request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = Self::classify_error(status, &body);
            match &err {
                PushError::Unregistered => {
                    tracing::warn!(%status, "FCM token unregistered");
                }
                PushError::Provider(detail) => {
                    tracing::warn!(%status, detail = %detail, "FCM send failed");
                }
            }
            return Err(err);
        }

        let parsed: SendResponse = response
            .json()
            .await
            .map_err(|e| PushError::Provider(format!("Invalid FCM response: {}", e)))?;

        tracing::debug!(message_id = %parsed.name, "FCM message accepted");
        Ok(parsed.name)
    }
}
