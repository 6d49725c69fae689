use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::entities::messages::{
    InsertMessageEntity, MessageDeliveryUpdateEntity, MessageEngagementUpdateEntity, MessageEntity,
};

#[async_trait]
#[automock]
pub trait MessageRepository {
    async fn create(&self, insert_message_entity: InsertMessageEntity) -> Result<Uuid>;
    /// Removes a reserved row whose dispatch never happened.
    async fn delete(&self, id: Uuid) -> Result<()>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<MessageEntity>>;
    async fn find_by_sendgrid_message_id(
        &self,
        sendgrid_message_id: String,
    ) -> Result<Option<MessageEntity>>;
    async fn finalize_delivery(
        &self,
        id: Uuid,
        update_entity: MessageDeliveryUpdateEntity,
    ) -> Result<()>;
    async fn apply_engagement(
        &self,
        id: Uuid,
        update_entity: MessageEngagementUpdateEntity,
    ) -> Result<()>;
    async fn list_gmail_sent_by_campaign_id(&self, campaign_id: Uuid)
        -> Result<Vec<MessageEntity>>;
}
