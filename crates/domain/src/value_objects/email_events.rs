use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provider delivery event already normalized to the internal vocabulary.
/// `provider_message_id` is the bare id segment, never the suffixed form
/// some providers append after a dot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InboundEmailEvent {
    pub event_type: String,
    pub provider_message_id: String,
    pub email: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub url: Option<String>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}
