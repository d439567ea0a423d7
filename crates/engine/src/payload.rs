//! Push payload construction.
//!
//! Payloads are flat string maps with a fixed key set so the client always
//! receives every field, empty when the value is unknown.

use telechat_common::types::{ChatKind, ChatRecord, PreviewMode, UserProfile};
use telechat_notifier::PushData;

/// Maximum number of characters of message content carried in a push.
pub const MAX_PREVIEW_CHARS: usize = 120;

/// Event type tag of chat message pushes.
pub const CHAT_MESSAGE_TYPE: &str = "chat_message";

/// Event type tag of synthetic test pushes.
pub const TEST_TYPE: &str = "test";

/// Truncate message content to at most [`MAX_PREVIEW_CHARS`] characters.
pub fn preview(content: &str) -> String {
    match content.char_indices().nth(MAX_PREVIEW_CHARS) {
        Some((cut, _)) => content[..cut].to_string(),
        None => content.to_string(),
    }
}

/// The part of a chat message payload shared by every recipient of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadTemplate {
    pub chat_id: String,
    pub chat_kind: ChatKind,
    pub sender_id: String,
    pub sender_name: String,
    pub sender_photo: String,
    pub chat_name: String,
    pub chat_photo: String,
    pub preview: String,
    pub title: String,
    pub body: String,
}

impl PayloadTemplate {
    pub fn new(chat: &ChatRecord, sender: &UserProfile, content: &str) -> Self {
        let preview = preview(content);

        let (title, body) = match chat.kind {
            ChatKind::Group => (
                chat.display_name.clone(),
                format!("{}: {}", sender.display_name, preview),
            ),
            ChatKind::Individual => (sender.display_name.clone(), preview.clone()),
        };

        let chat_photo = match chat.kind {
            ChatKind::Group => chat.group_photo_url.clone(),
            ChatKind::Individual => String::new(),
        };

        Self {
            chat_id: chat.id.clone(),
            chat_kind: chat.kind,
            sender_id: sender.id.clone(),
            sender_name: sender.display_name.clone(),
            sender_photo: sender.photo_url.clone(),
            chat_name: chat.display_name.clone(),
            chat_photo,
            preview,
            title,
            body,
        }
    }

    /// Materialize the payload for one recipient.
    pub fn for_recipient(&self, receiver_id: &str, preview_mode: PreviewMode) -> PushData {
        let mut data = PushData::new();
        data.insert("type".into(), CHAT_MESSAGE_TYPE.into());
        data.insert("chat_id".into(), self.chat_id.clone());
        data.insert("chat_type".into(), self.chat_kind.to_string());
        data.insert("sender_id".into(), self.sender_id.clone());
        data.insert("receiver_id".into(), receiver_id.to_string());
        data.insert("sender_name".into(), self.sender_name.clone());
        data.insert("sender_photo".into(), self.sender_photo.clone());
        data.insert("chat_name".into(), self.chat_name.clone());
        data.insert("chat_photo".into(), self.chat_photo.clone());
        data.insert("preview".into(), self.preview.clone());
        data.insert("title".into(), self.title.clone());
        data.insert("body".into(), self.body.clone());
        data.insert("preview_mode".into(), preview_mode.to_string());
        data
    }
}

/// Data-only payload of a synthetic test push.
pub fn test_payload(title: &str, body: &str) -> PushData {
    let mut data = PushData::new();
    data.insert("type".into(), TEST_TYPE.into());
    data.insert("title".into(), title.to_string());
    data.insert("body".into(), body.to_string());
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group_chat() -> ChatRecord {
        ChatRecord {
            id: "c2".to_string(),
            kind: ChatKind::Group,
            display_name: "Team".to_string(),
            group_photo_url: "https://img/team.png".to_string(),
            participants: vec!["u1".into(), "u2".into(), "u3".into()],
        }
    }

    fn individual_chat() -> ChatRecord {
        ChatRecord {
            id: "c1".to_string(),
            kind: ChatKind::Individual,
            display_name: "Utilisateur".to_string(),
            group_photo_url: String::new(),
            participants: vec!["u1".into(), "u2".into()],
        }
    }

    fn sender() -> UserProfile {
        UserProfile {
            id: "u1".to_string(),
            display_name: "Alice".to_string(),
            photo_url: "https://img/alice.png".to_string(),
        }
    }

    #[test]
    fn test_preview_truncates_long_content() {
        let content = "x".repeat(200);
        let p = preview(&content);
        assert_eq!(p.chars().count(), 120);
        assert_eq!(p, "x".repeat(120));
    }

    #[test]
    fn test_preview_keeps_short_content() {
        assert_eq!(preview("hello"), "hello");
        let exact = "y".repeat(120);
        assert_eq!(preview(&exact), exact);
        assert_eq!(preview(&preview(&exact)), exact);
        assert_eq!(preview(""), "");
    }

    #[test]
    fn test_preview_counts_characters_not_bytes() {
        let content = "é".repeat(150);
        let p = preview(&content);
        assert_eq!(p.chars().count(), 120);
        assert_eq!(p.len(), 240);
    }

    #[test]
    fn test_group_title_and_body() {
        let t = PayloadTemplate::new(&group_chat(), &sender(), "hello");
        assert_eq!(t.title, "Team");
        assert_eq!(t.body, "Alice: hello");
        assert_eq!(t.chat_photo, "https://img/team.png");
    }

    #[test]
    fn test_individual_title_and_body() {
        let t = PayloadTemplate::new(&individual_chat(), &sender(), "hello");
        assert_eq!(t.title, "Alice");
        assert_eq!(t.body, "hello");
        assert_eq!(t.chat_photo, "");
        assert_eq!(t.sender_photo, "https://img/alice.png");
    }

    #[test]
    fn test_recipient_payload_has_fixed_keys() {
        let t = PayloadTemplate::new(&individual_chat(), &UserProfile::fallback("u1"), "hi");
        let data = t.for_recipient("u2", PreviewMode::NameOnly);

        let keys: Vec<&str> = data.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "body",
                "chat_id",
                "chat_name",
                "chat_photo",
                "chat_type",
                "preview",
                "preview_mode",
                "receiver_id",
                "sender_id",
                "sender_name",
                "sender_photo",
                "title",
                "type",
            ]
        );
        assert_eq!(data["type"], "chat_message");
        assert_eq!(data["chat_type"], "individual");
        assert_eq!(data["receiver_id"], "u2");
        assert_eq!(data["sender_photo"], "");
        assert_eq!(data["preview_mode"], "name_only");
    }

    #[test]
    fn test_test_payload() {
        let data = test_payload("Ping", "Pong");
        assert_eq!(data["type"], "test");
        assert_eq!(data["title"], "Ping");
        assert_eq!(data["body"], "Pong");
    }
}
