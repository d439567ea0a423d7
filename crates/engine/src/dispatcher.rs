//! Fanout dispatcher.
//!
//! Turns one inbound chat message into one push attempt per recipient:
//! 1. Load the chat and resolve its recipients (failures abort the request)
//! 2. Load the sender profile and build the shared payload template once
//! 3. For each recipient: policy gate → token lookup → payload → send
//!
//! Step 3 runs with bounded concurrency. A denial or failure for one
//! recipient is recorded in its outcome and never affects the others.

use std::sync::Arc;

use futures::StreamExt;
use futures::stream;

use telechat_common::error::AppError;
use telechat_common::types::{
    ChatKind, ChatRecord, DispatchOutcome, DispatchStatus, SendFailure,
};
use telechat_notifier::{PushError, PushSender};

use crate::payload::PayloadTemplate;
use crate::policy::{self, PolicyDecision};
use crate::resolver::resolve_recipients;
use crate::store::ContextStore;

/// Default number of recipients processed concurrently.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// A chat message that should be announced to the other participants.
#[derive(Debug, Clone)]
pub struct MessageEvent {
    pub sender_id: String,
    pub chat_id: String,
    pub content: String,
}

/// Outcomes of one fanout, in recipient order.
#[derive(Debug, Clone)]
pub struct DispatchReport {
    pub chat_id: String,
    pub chat_kind: ChatKind,
    pub outcomes: Vec<DispatchOutcome>,
}

impl DispatchReport {
    /// `(receiver_id, message_id)` of every delivered push.
    pub fn sent(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.outcomes.iter().filter_map(|o| match &o.status {
            DispatchStatus::Sent { message_id } => {
                Some((o.receiver_id.as_str(), message_id.as_str()))
            }
            _ => None,
        })
    }

    /// `(receiver_id, reason)` of every recipient that did not get a push.
    pub fn skipped(&self) -> impl Iterator<Item = (&str, &'static str)> + '_ {
        self.outcomes
            .iter()
            .filter_map(|o| o.status.reason().map(|r| (o.receiver_id.as_str(), r)))
    }
}

/// Drives the per-recipient notification pipeline.
#[derive(Clone)]
pub struct NotificationDispatcher {
    store: ContextStore,
    push: Arc<dyn PushSender>,
    concurrency: usize,
}

impl NotificationDispatcher {
    pub fn new(store: ContextStore, push: Arc<dyn PushSender>) -> Self {
        Self {
            store,
            push,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Limit how many recipients are processed at once (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Notify every recipient of `event`.
    ///
    /// Fails only when the chat cannot be loaded, its recipients cannot be
    /// resolved or the sender profile read fails. Per-recipient problems are
    /// reported in the returned outcomes.
    pub async fn dispatch(&self, event: &MessageEvent) -> Result<DispatchReport, AppError> {
        let chat = self.store.chat(&event.chat_id).await?;
        let recipients = resolve_recipients(&chat, &event.sender_id)?;

        tracing::debug!(
            chat_id = %chat.id,
            chat_type = %chat.kind,
            recipients = recipients.len(),
            "Recipients resolved"
        );

        let sender = self.store.profile(&event.sender_id).await?;
        let template = PayloadTemplate::new(&chat, &sender, &event.content);

        let chat_ref = &chat;
        let template_ref = &template;
        let outcomes: Vec<DispatchOutcome> = stream::iter(recipients)
            .map(|receiver_id| self.dispatch_one(chat_ref, template_ref, receiver_id))
            .buffered(self.concurrency)
            .collect()
            .await;

        let sent = outcomes.iter().filter(|o| o.is_sent()).count();
        tracing::info!(
            chat_id = %chat.id,
            sender_id = %event.sender_id,
            sent,
            skipped = outcomes.len() - sent,
            "Message notification fanout complete"
        );

        Ok(DispatchReport {
            chat_id: chat.id,
            chat_kind: chat.kind,
            outcomes,
        })
    }

    async fn dispatch_one(
        &self,
        chat: &ChatRecord,
        template: &PayloadTemplate,
        receiver_id: String,
    ) -> DispatchOutcome {
        let status = self.deliver(chat, template, &receiver_id).await;

        match &status {
            DispatchStatus::Sent { message_id } => {
                tracing::debug!(receiver_id = %receiver_id, message_id = %message_id, "Push sent");
            }
            DispatchStatus::SendError(SendFailure::TokenUnregistered) => {
                tracing::warn!(
                    receiver_id = %receiver_id,
                    "Push token is unregistered; recipient skipped"
                );
            }
            DispatchStatus::SendError(SendFailure::Provider(detail))
            | DispatchStatus::SendError(SendFailure::Store(detail)) => {
                tracing::warn!(receiver_id = %receiver_id, error = %detail, "Recipient delivery failed");
            }
            other => {
                tracing::debug!(
                    receiver_id = %receiver_id,
                    reason = other.reason().unwrap_or(""),
                    "Recipient skipped"
                );
            }
        }

        DispatchOutcome {
            receiver_id,
            status,
        }
    }

    async fn deliver(
        &self,
        chat: &ChatRecord,
        template: &PayloadTemplate,
        receiver_id: &str,
    ) -> DispatchStatus {
        let settings = match self.store.settings(receiver_id).await {
            Ok(settings) => settings,
            Err(e) => return DispatchStatus::SendError(SendFailure::Store(e.to_string())),
        };

        if let PolicyDecision::Deny(reason) =
            policy::evaluate(&settings, chat.kind, &chat.id, &template.sender_id)
        {
            return DispatchStatus::PolicyDenied(reason);
        }

        let token = match self.store.push_token(receiver_id).await {
            Ok(Some(token)) => token,
            Ok(None) => return DispatchStatus::NoToken,
            Err(e) => return DispatchStatus::SendError(SendFailure::Store(e.to_string())),
        };

        let data = template.for_recipient(receiver_id, settings.preview_mode);

        match self.push.send(&token.token, &data).await {
            Ok(message_id) => DispatchStatus::Sent { message_id },
            Err(PushError::Unregistered) => {
                DispatchStatus::SendError(SendFailure::TokenUnregistered)
            }
            Err(PushError::Provider(detail)) => {
                DispatchStatus::SendError(SendFailure::Provider(detail))
            }
        }
    }
}
