//! Sender used when no push provider is configured.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{PushData, PushError, PushSender};

/// Logs each delivery instead of sending it and returns a synthetic message id.
#[derive(Debug, Default)]
pub struct DryRunSender;

impl DryRunSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PushSender for DryRunSender {
    async fn send(&self, token: &str, data: &PushData) -> Result<String, PushError> {
        let message_id = format!("dry-run/{}", Uuid::new_v4());
        tracing::info!(
            message_id = %message_id,
            token_len = token.len(),
            kind = data.get("type").map(String::as_str).unwrap_or(""),
            "Dry-run push (FCM not configured)"
        );
        Ok(message_id)
    }
}
