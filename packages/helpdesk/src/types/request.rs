//! Incoming support requests.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Priority declared by the requester.
///
/// Informational: it can raise the urgency of an escalation but never
/// causes one by itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

/// A support request submitted by an end user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportRequest {
    /// Unique identifier
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// Free-text request body
    pub message: String,

    /// Requesting user, if known
    #[serde(default)]
    pub user_id: Option<String>,

    /// Declared priority
    #[serde(default)]
    pub priority: Priority,
}

impl SupportRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            user_id: None,
            priority: Priority::default(),
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal() {
        let request: SupportRequest =
            serde_json::from_str(r#"{"message": "VPN keeps dropping"}"#).unwrap();
        assert_eq!(request.message, "VPN keeps dropping");
        assert_eq!(request.priority, Priority::Normal);
        assert!(request.user_id.is_none());
    }

    #[test]
    fn test_deserialize_priority() {
        let request: SupportRequest =
            serde_json::from_str(r#"{"message": "help", "priority": "urgent"}"#).unwrap();
        assert_eq!(request.priority, Priority::Urgent);
    }
}
