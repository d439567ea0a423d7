//! Recipient resolution: who should hear about a message in a chat.

use thiserror::Error;

use telechat_common::error::AppError;
use telechat_common::types::{ChatKind, ChatRecord};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Invalid chat participants")]
    InvalidParticipants,

    #[error("Unable to find the receiver")]
    ReceiverNotFound,

    #[error("No other member in the group")]
    NoRecipients,
}

impl From<ResolveError> for AppError {
    fn from(err: ResolveError) -> Self {
        AppError::InvalidRequest(err.to_string())
    }
}

/// Resolve the distinct recipients of a message sent by `sender_id`, in
/// participant order, never including the sender.
pub fn resolve_recipients(chat: &ChatRecord, sender_id: &str) -> Result<Vec<String>, ResolveError> {
    if chat.kind == ChatKind::Individual && chat.participants.len() < 2 {
        return Err(ResolveError::InvalidParticipants);
    }

    let mut recipients: Vec<String> = Vec::with_capacity(chat.participants.len());
    for uid in &chat.participants {
        if uid != sender_id && !recipients.contains(uid) {
            recipients.push(uid.clone());
        }
    }

    if recipients.is_empty() {
        return Err(match chat.kind {
            ChatKind::Individual => ResolveError::ReceiverNotFound,
            ChatKind::Group => ResolveError::NoRecipients,
        });
    }

    Ok(recipients)
}
