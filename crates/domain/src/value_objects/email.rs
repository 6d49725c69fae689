use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value_objects::enums::email_channels::EmailChannel;

/// Row references threaded through a transactional send so the provider
/// can echo them back in delivery webhooks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MessageRef {
    pub message_id: Uuid,
    pub campaign_id: Uuid,
    pub lead_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub refs: Option<MessageRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DispatchedEmail {
    pub provider_message_id: String,
    pub channel: EmailChannel,
}

/// Product of a completed OAuth exchange, ready to persist on settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MailboxConnection {
    pub encrypted_refresh_token: String,
    pub gmail_email: String,
}

/// Payload of a test send. Everything optional so the validation error can
/// name the missing piece instead of failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TestSendModel {
    pub subject: Option<String>,
    pub body: Option<String>,
    pub test_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestSendReport {
    pub recipient: String,
    pub provider_message_id: String,
}
