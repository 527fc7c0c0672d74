use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier the backend assigns to each emitted notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NotificationId {
    Number(i64),
    Text(String),
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub mode: String,
    pub message: String,
}

/// A notification as handed to the platform for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayNotification {
    pub title: String,
    pub body: String,
    /// Notifications sharing a tag replace each other instead of stacking.
    pub tag: String,
    pub require_interaction: bool,
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;

    #[test]
    fn notification__should_accept_numeric_and_string_ids() {
        // Given
        let numeric = r#"{"id": 6, "mode": "lovers", "message": "Sau wants Lovers"}"#;
        let text = r#"{"id": "abc", "mode": "lovers", "message": "hi", "extra": 1}"#;

        // When
        let numeric: Notification = serde_json::from_str(numeric).expect("numeric id");
        let text: Notification = serde_json::from_str(text).expect("string id");

        // Then
        assert_eq!(numeric.id, NotificationId::Number(6));
        assert_eq!(text.id, NotificationId::Text("abc".to_string()));
        assert_ne!(numeric.id, text.id);
    }
}
