use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::value_objects::email::{MailboxConnection, OutboundEmail};

/// Sends through the user's own linked mailbox. Implementations resolve
/// the stored credential themselves; callers only supply the user id.
#[async_trait]
#[automock]
pub trait MailboxEmailClient {
    /// Returns the provider's message id for the delivered mail.
    async fn send_email(&self, user_id: Uuid, email: OutboundEmail) -> Result<String>;
    /// True when the thread holding `provider_message_id` has grown past
    /// the original message, i.e. somebody answered.
    async fn has_thread_reply(&self, user_id: Uuid, provider_message_id: String) -> Result<bool>;
}

/// Shared transactional provider, used directly for unlinked users and as
/// the fallback when a mailbox send fails.
#[async_trait]
#[automock]
pub trait TransactionalEmailClient {
    async fn send_email(&self, email: OutboundEmail) -> Result<String>;
}

#[async_trait]
#[automock]
pub trait MailboxOauthClient {
    fn consent_url(&self, state: String) -> String;
    /// Exchanges the authorization code, resolves the mailbox address and
    /// returns the credential already sealed for storage.
    async fn establish_connection(&self, code: String) -> Result<MailboxConnection>;
}
