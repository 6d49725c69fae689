use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::entities::events::InsertEventEntity;

#[async_trait]
#[automock]
pub trait EventRepository {
    async fn append(&self, insert_event_entity: InsertEventEntity) -> Result<()>;
}
