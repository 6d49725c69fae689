use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, delete, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::postgres_connection::PgPoolSquad;
use domain::{
    entities::messages::{
        InsertMessageEntity, MessageDeliveryUpdateEntity, MessageEngagementUpdateEntity,
        MessageEntity,
    },
    repositories::messages::MessageRepository,
    schema::messages,
    value_objects::enums::email_channels::EmailChannel,
};

pub struct MessagePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl MessagePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl MessageRepository for MessagePostgres {
    async fn create(&self, insert_message_entity: InsertMessageEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(messages::table)
            .values(&insert_message_entity)
            .returning(messages::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(result)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        delete(messages::table)
            .filter(messages::id.eq(id))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<MessageEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = messages::table
            .filter(messages::id.eq(id))
            .select(MessageEntity::as_select())
            .first::<MessageEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_by_sendgrid_message_id(
        &self,
        sendgrid_message_id: String,
    ) -> Result<Option<MessageEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = messages::table
            .filter(messages::sendgrid_message_id.eq(sendgrid_message_id))
            .select(MessageEntity::as_select())
            .first::<MessageEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn finalize_delivery(
        &self,
        id: Uuid,
        update_entity: MessageDeliveryUpdateEntity,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(messages::table)
            .filter(messages::id.eq(id))
            .set(&update_entity)
            .execute(&mut conn)?;

        Ok(())
    }

    async fn apply_engagement(
        &self,
        id: Uuid,
        update_entity: MessageEngagementUpdateEntity,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(messages::table)
            .filter(messages::id.eq(id))
            .set(&update_entity)
            .execute(&mut conn)?;

        Ok(())
    }

    async fn list_gmail_sent_by_campaign_id(
        &self,
        campaign_id: Uuid,
    ) -> Result<Vec<MessageEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = messages::table
            .filter(messages::campaign_id.eq(campaign_id))
            .filter(messages::provider.eq(EmailChannel::Gmail.to_string()))
            .filter(messages::gmail_message_id.is_not_null())
            .select(MessageEntity::as_select())
            .load::<MessageEntity>(&mut conn)?;

        Ok(results)
    }
}
