use chrono::{ SecondsFormat, Utc };
use serde::{ Serialize, Deserialize };
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub role: Role,
    pub content: String,
    pub timestamp: String,
}

impl ChatMessage {
    /// Builds a message stamped with the current time. `id` must come from
    /// [`next_message_id`] so ids keep increasing inside a conversation.
    pub fn new(id: i64, role: Role, content: impl Into<String>) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            timestamp: now_iso(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    #[serde(default = "new_conversation_id")]
    pub id: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            id: new_conversation_id(),
            messages: Vec::new(),
            updated_at: None,
        }
    }

    pub fn last_message_id(&self) -> Option<i64> {
        self.messages.last().map(|m| m.id)
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

pub fn new_conversation_id() -> String {
    format!("conv_{}", Uuid::new_v4().simple())
}

/// Millisecond clock id, bumped past `last` when two messages land in the same millisecond.
pub fn next_message_id(last: Option<i64>) -> i64 {
    let now = Utc::now().timestamp_millis();
    match last {
        Some(prev) if prev >= now => prev.saturating_add(1),
        _ => now,
    }
}

pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_conversation_serializes_updated_at_in_camel_case() {
        let conversation = Conversation {
            id: "conv_1".to_string(),
            messages: vec![ChatMessage::new(1, Role::Assistant, "hello")],
            updated_at: Some("2024-01-01T00:00:00.000Z".to_string()),
        };
        let value = serde_json::to_value(&conversation).unwrap();

        assert_eq!(value["updatedAt"], "2024-01-01T00:00:00.000Z");
        assert_eq!(value["messages"][0]["role"], "assistant");
        assert!(value.get("updated_at").is_none());
    }

    #[test]
    fn test_record_without_messages_loads_empty_list() {
        let conversation: Conversation = serde_json::from_value(json!({ "id": "conv_x" })).unwrap();
        assert_eq!(conversation.id, "conv_x");
        assert!(conversation.messages.is_empty());
        assert!(conversation.updated_at.is_none());
    }

    #[test]
    fn test_next_message_id_is_strictly_increasing() {
        let first = next_message_id(None);
        let second = next_message_id(Some(first));
        let far_future = next_message_id(Some(i64::MAX - 1));

        assert!(second > first);
        assert_eq!(far_future, i64::MAX);
        assert_eq!(next_message_id(Some(i64::MAX)), i64::MAX);
    }

    #[test]
    fn test_fresh_conversations_get_distinct_ids() {
        let a = Conversation::new();
        let b = Conversation::new();
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("conv_"));
    }
}
