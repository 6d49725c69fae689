use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Sent,
    Delivered,
    Opened,
    Clicked,
    Replied,
    Bounced,
    SpamReport,
    Unsubscribed,
}

impl Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let event_type = match self {
            EventType::Sent => "sent",
            EventType::Delivered => "delivered",
            EventType::Opened => "opened",
            EventType::Clicked => "clicked",
            EventType::Replied => "replied",
            EventType::Bounced => "bounced",
            EventType::SpamReport => "spam_report",
            EventType::Unsubscribed => "unsubscribed",
        };
        write!(f, "{}", event_type)
    }
}
