//! Typed read accessors over the document store.
//!
//! Every read is a point lookup performed per request; nothing is cached.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use telechat_common::error::AppError;
use telechat_common::types::{
    ChatKind, ChatRecord, DEFAULT_GROUP_NAME, DEFAULT_USER_NAME, NotificationSettings,
    PreviewMode, PushToken, UserProfile,
};

use crate::documents::DocumentStore;

pub const CHATS: &str = "chats";
pub const USERS: &str = "users";
pub const USER_TOKENS: &str = "userTokens";
pub const NOTIFICATION_SETTINGS: &str = "notificationSettings";

/// Chat, profile, settings and token lookups used by the dispatcher.
#[derive(Clone)]
pub struct ContextStore {
    docs: Arc<dyn DocumentStore>,
}

impl ContextStore {
    pub fn new(docs: Arc<dyn DocumentStore>) -> Self {
        Self { docs }
    }

    /// Load a chat's metadata. Fails with `NotFound` if the chat does not exist.
    pub async fn chat(&self, chat_id: &str) -> Result<ChatRecord, AppError> {
        let doc = self
            .docs
            .get(CHATS, chat_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Chat {} not found", chat_id)))?;

        Ok(parse_chat(chat_id, &doc))
    }

    /// Load a user's profile, falling back to the default profile if absent.
    pub async fn profile(&self, user_id: &str) -> Result<UserProfile, AppError> {
        match self.docs.get(USERS, user_id).await? {
            Some(doc) => Ok(parse_profile(user_id, &doc)),
            None => {
                tracing::info!(user_id = %user_id, "User profile not found, using default");
                Ok(UserProfile::fallback(user_id))
            }
        }
    }

    /// Load a user's notification settings overlaid on the defaults.
    ///
    /// Missing, null or malformed fields keep their default value.
    pub async fn settings(&self, user_id: &str) -> Result<NotificationSettings, AppError> {
        Ok(match self.docs.get(NOTIFICATION_SETTINGS, user_id).await? {
            Some(doc) => parse_settings(user_id, &doc),
            None => NotificationSettings::default(),
        })
    }

    /// Look up a user's current push token. `None` means there is nowhere to deliver.
    pub async fn push_token(&self, user_id: &str) -> Result<Option<PushToken>, AppError> {
        let Some(doc) = self.docs.get(USER_TOKENS, user_id).await? else {
            return Ok(None);
        };

        let token = doc
            .get("token")
            .and_then(|v| v.as_str())
            .filter(|t| !t.is_empty());

        Ok(token.map(|token| PushToken {
            user_id: user_id.to_string(),
            token: token.to_string(),
            updated_at: doc
                .get("updatedAt")
                .and_then(|v| v.as_str())
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc)),
        }))
    }

    /// Register `token` as the user's current push token (last write wins).
    pub async fn upsert_push_token(&self, user_id: &str, token: &str) -> Result<(), AppError> {
        let mut fields = Map::new();
        fields.insert("token".to_string(), Value::String(token.to_string()));
        fields.insert("userId".to_string(), Value::String(user_id.to_string()));

        self.docs
            .merge(USER_TOKENS, user_id, fields, Some("updatedAt"))
            .await?;

        tracing::info!(user_id = %user_id, "Push token registered");
        Ok(())
    }
}

fn non_empty_str<'a>(doc: &'a Value, key: &str) -> Option<&'a str> {
    doc.get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
}

fn string_list(doc: &Value, key: &str) -> Vec<String> {
    doc.get(key)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_chat(chat_id: &str, doc: &Value) -> ChatRecord {
    let kind = doc
        .get("type")
        .and_then(|v| ChatKind::deserialize(v).ok())
        .unwrap_or(ChatKind::Individual);

    let mut participants = string_list(doc, "participants");
    if participants.is_empty() {
        participants = string_list(doc, "members");
    }

    let display_name = non_empty_str(doc, "name")
        .unwrap_or(match kind {
            ChatKind::Group => DEFAULT_GROUP_NAME,
            ChatKind::Individual => DEFAULT_USER_NAME,
        })
        .to_string();

    // Individual chats never carry a photo here; the sender's own photo is used instead.
    let group_photo_url = match kind {
        ChatKind::Group => non_empty_str(doc, "groupPhotoUrl").unwrap_or("").to_string(),
        ChatKind::Individual => String::new(),
    };

    ChatRecord {
        id: chat_id.to_string(),
        kind,
        display_name,
        group_photo_url,
        participants,
    }
}

fn discard_setting(user_id: &str, field: &str, value: &Value) {
    tracing::warn!(
        user_id = %user_id,
        field,
        value = %value,
        "Ignoring malformed notification setting"
    );
}

fn bool_setting(user_id: &str, doc: &Value, field: &str) -> Option<bool> {
    let value = doc.get(field)?;
    let parsed = value.as_bool();
    if parsed.is_none() {
        discard_setting(user_id, field, value);
    }
    parsed
}

fn set_setting(user_id: &str, doc: &Value, field: &str) -> Option<HashSet<String>> {
    let value = doc.get(field)?;
    let Some(items) = value.as_array() else {
        discard_setting(user_id, field, value);
        return None;
    };

    // Non-string entries are dropped; the rest of the list still applies.
    if items.iter().any(|v| !v.is_string()) {
        discard_setting(user_id, field, value);
    }
    Some(
        items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect(),
    )
}

/// Overlay each well-formed stored field onto the default settings.
fn parse_settings(user_id: &str, doc: &Value) -> NotificationSettings {
    let mut settings = NotificationSettings::default();
    if !doc.is_object() {
        discard_setting(user_id, "*", doc);
        return settings;
    }

    if let Some(v) = bool_setting(user_id, doc, "enabled") {
        settings.enabled = v;
    }
    if let Some(v) = bool_setting(user_id, doc, "groupsEnabled") {
        settings.groups_enabled = v;
    }
    if let Some(v) = bool_setting(user_id, doc, "contactsEnabled") {
        settings.contacts_enabled = v;
    }
    if let Some(value) = doc.get("previewMode") {
        match PreviewMode::deserialize(value) {
            Ok(mode) => settings.preview_mode = mode,
            Err(_) => discard_setting(user_id, "previewMode", value),
        }
    }
    if let Some(ids) = set_setting(user_id, doc, "ignoredGroups") {
        settings.ignored_groups = ids;
    }
    if let Some(ids) = set_setting(user_id, doc, "ignoredContacts") {
        settings.ignored_contacts = ids;
    }
    if let Some(ids) = set_setting(user_id, doc, "mutedChats") {
        settings.muted_chats = ids;
    }

    settings
}

fn parse_profile(user_id: &str, doc: &Value) -> UserProfile {
    UserProfile {
        id: user_id.to_string(),
        display_name: non_empty_str(doc, "name")
            .or_else(|| non_empty_str(doc, "displayName"))
            .unwrap_or(DEFAULT_USER_NAME)
            .to_string(),
        photo_url: non_empty_str(doc, "profilePhotoUrl")
            .unwrap_or("")
            .to_string(),
    }
}
