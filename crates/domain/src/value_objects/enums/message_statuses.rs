use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    #[default]
    Pending,
    Queued,
    Sent,
    Delivered,
    Opened,
    Clicked,
    Replied,
    Bounced,
    Failed,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Pending => "pending",
            MessageStatus::Queued => "queued",
            MessageStatus::Sent => "sent",
            MessageStatus::Delivered => "delivered",
            MessageStatus::Opened => "opened",
            MessageStatus::Clicked => "clicked",
            MessageStatus::Replied => "replied",
            MessageStatus::Bounced => "bounced",
            MessageStatus::Failed => "failed",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(MessageStatus::Pending),
            "queued" => Some(MessageStatus::Queued),
            "sent" => Some(MessageStatus::Sent),
            "delivered" => Some(MessageStatus::Delivered),
            "opened" => Some(MessageStatus::Opened),
            "clicked" => Some(MessageStatus::Clicked),
            "replied" => Some(MessageStatus::Replied),
            "bounced" => Some(MessageStatus::Bounced),
            "failed" => Some(MessageStatus::Failed),
            _ => None,
        }
    }

    pub fn can_transition_to(&self, next: MessageStatus) -> bool {
        match self {
            MessageStatus::Pending | MessageStatus::Queued => {
                matches!(next, MessageStatus::Sent | MessageStatus::Failed)
            }
            MessageStatus::Sent => matches!(
                next,
                MessageStatus::Delivered
                    | MessageStatus::Opened
                    | MessageStatus::Clicked
                    | MessageStatus::Replied
                    | MessageStatus::Bounced
            ),
            MessageStatus::Delivered => matches!(
                next,
                MessageStatus::Opened
                    | MessageStatus::Clicked
                    | MessageStatus::Replied
                    | MessageStatus::Bounced
            ),
            MessageStatus::Opened => {
                matches!(next, MessageStatus::Clicked | MessageStatus::Replied)
            }
            MessageStatus::Clicked => matches!(next, MessageStatus::Replied),
            MessageStatus::Replied | MessageStatus::Bounced | MessageStatus::Failed => false,
        }
    }
}

impl Display for MessageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queued_message_resolves_to_sent_or_failed() {
        assert!(MessageStatus::Queued.can_transition_to(MessageStatus::Sent));
        assert!(MessageStatus::Queued.can_transition_to(MessageStatus::Failed));
        assert!(!MessageStatus::Queued.can_transition_to(MessageStatus::Opened));
    }

    #[test]
    fn replied_message_ignores_late_click() {
        assert!(!MessageStatus::Replied.can_transition_to(MessageStatus::Clicked));
        assert!(!MessageStatus::Replied.can_transition_to(MessageStatus::Opened));
    }

    #[test]
    fn delivered_message_accepts_engagement() {
        assert!(MessageStatus::Delivered.can_transition_to(MessageStatus::Opened));
        assert!(MessageStatus::Delivered.can_transition_to(MessageStatus::Bounced));
        assert!(!MessageStatus::Delivered.can_transition_to(MessageStatus::Sent));
    }
}
