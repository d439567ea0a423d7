use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Display name used when a user or individual chat has none.
pub const DEFAULT_USER_NAME: &str = "Utilisateur";

/// Display name used when a group chat has none.
pub const DEFAULT_GROUP_NAME: &str = "Groupe";

/// Chat topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    Group,
    /// Anything that is not explicitly a group is a pairwise chat.
    #[serde(other)]
    Individual,
}

impl std::fmt::Display for ChatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatKind::Individual => write!(f, "individual"),
            ChatKind::Group => write!(f, "group"),
        }
    }
}

/// Chat metadata as needed by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRecord {
    pub id: String,
    pub kind: ChatKind,
    pub display_name: String,
    /// Only ever the group's own photo; empty for individual chats.
    pub group_photo_url: String,
    pub participants: Vec<String>,
}

/// Public profile of a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub display_name: String,
    pub photo_url: String,
}

impl UserProfile {
    /// Profile used when the user has no stored record.
    pub fn fallback(id: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: DEFAULT_USER_NAME.to_string(),
            photo_url: String::new(),
        }
    }
}

/// How much of the message the client should reveal. Advisory only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewMode {
    #[default]
    Full,
    #[serde(alias = "name-only", alias = "nameOnly")]
    NameOnly,
    None,
}

impl std::fmt::Display for PreviewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreviewMode::Full => write!(f, "full"),
            PreviewMode::NameOnly => write!(f, "name_only"),
            PreviewMode::None => write!(f, "none"),
        }
    }
}

/// Per-user notification preferences.
///
/// Stored records are overlaid field by field onto [`Default`], so
/// downstream code always sees a fully populated value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSettings {
    pub enabled: bool,
    pub groups_enabled: bool,
    pub contacts_enabled: bool,
    pub preview_mode: PreviewMode,
    pub ignored_groups: HashSet<String>,
    pub ignored_contacts: HashSet<String>,
    pub muted_chats: HashSet<String>,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            groups_enabled: true,
            contacts_enabled: true,
            preview_mode: PreviewMode::Full,
            ignored_groups: HashSet::new(),
            ignored_contacts: HashSet::new(),
            muted_chats: HashSet::new(),
        }
    }
}

/// The current push destination of a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushToken {
    pub user_id: String,
    pub token: String,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Why the policy gate refused a recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    GlobalOff,
    GroupsOff,
    ContactsOff,
    ChatMuted,
    GroupIgnored,
    ContactIgnored,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::GlobalOff => "global_off",
            DenyReason::GroupsOff => "groups_off",
            DenyReason::ContactsOff => "contacts_off",
            DenyReason::ChatMuted => "chat_muted",
            DenyReason::GroupIgnored => "group_ignored",
            DenyReason::ContactIgnored => "contact_ignored",
        }
    }
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a delivery attempt for one recipient failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendFailure {
    /// The provider reports the token is no longer registered.
    TokenUnregistered,
    /// Any other provider or transport error.
    Provider(String),
    /// Reading the recipient's settings or token failed.
    Store(String),
}

/// Result of processing a single recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchStatus {
    Sent { message_id: String },
    PolicyDenied(DenyReason),
    NoToken,
    SendError(SendFailure),
}

impl DispatchStatus {
    /// Machine-readable skip reason, `None` when the push was sent.
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            DispatchStatus::Sent { .. } => None,
            DispatchStatus::PolicyDenied(reason) => Some(reason.as_str()),
            DispatchStatus::NoToken => Some("no_token"),
            DispatchStatus::SendError(SendFailure::TokenUnregistered) => Some("token_unregistered"),
            DispatchStatus::SendError(SendFailure::Provider(_)) => Some("send_error"),
            DispatchStatus::SendError(SendFailure::Store(_)) => Some("store_error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub receiver_id: String,
    pub status: DispatchStatus,
}

impl DispatchOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self.status, DispatchStatus::Sent { .. })
    }
}
