//! Notification policy gate.
//!
//! Rules are evaluated in a fixed order and the first matching deny wins:
//! 1. notifications globally disabled
//! 2. group notifications disabled (group chats)
//! 3. contact notifications disabled (individual chats)
//! 4. chat muted
//! 5. group ignored (group chats)
//! 6. sender ignored (individual chats)
//!
//! `preview_mode` is not part of the decision; it travels in the payload.

use telechat_common::types::{ChatKind, DenyReason, NotificationSettings};

/// Outcome of the policy gate for one recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    Allow,
    Deny(DenyReason),
}

impl PolicyDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyDecision::Allow => "ok",
            PolicyDecision::Deny(reason) => reason.as_str(),
        }
    }
}

/// Decide whether a recipient with `settings` should be notified of a
/// message from `sender_id` in chat `chat_id`.
pub fn evaluate(
    settings: &NotificationSettings,
    kind: ChatKind,
    chat_id: &str,
    sender_id: &str,
) -> PolicyDecision {
    let is_group = kind == ChatKind::Group;

    let denied = if !settings.enabled {
        Some(DenyReason::GlobalOff)
    } else if is_group && !settings.groups_enabled {
        Some(DenyReason::GroupsOff)
    } else if !is_group && !settings.contacts_enabled {
        Some(DenyReason::ContactsOff)
    } else if settings.muted_chats.contains(chat_id) {
        Some(DenyReason::ChatMuted)
    } else if is_group && settings.ignored_groups.contains(chat_id) {
        Some(DenyReason::GroupIgnored)
    } else if !is_group && settings.ignored_contacts.contains(sender_id) {
        Some(DenyReason::ContactIgnored)
    } else {
        None
    };

    denied.map_or(PolicyDecision::Allow, PolicyDecision::Deny)
}
