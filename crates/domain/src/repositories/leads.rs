use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::entities::leads::{InsertLeadEntity, LeadEntity};
use crate::value_objects::enums::lead_statuses::LeadStatus;

#[async_trait]
#[automock]
pub trait LeadRepository {
    async fn bulk_insert(&self, insert_lead_entities: Vec<InsertLeadEntity>) -> Result<usize>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<LeadEntity>>;
    async fn find_by_id_and_campaign_id(
        &self,
        id: Uuid,
        campaign_id: Uuid,
    ) -> Result<Option<LeadEntity>>;
    async fn list_by_campaign_id(&self, campaign_id: Uuid) -> Result<Vec<LeadEntity>>;
    async fn list_pending_by_campaign_id(
        &self,
        campaign_id: Uuid,
        limit: i64,
    ) -> Result<Vec<LeadEntity>>;
    /// Compare-and-set on the status column. Returns false when the row no
    /// longer holds `from`, which is how a lost race or a stale signal is
    /// detected without a transaction.
    async fn transition_status(
        &self,
        id: Uuid,
        from: LeadStatus,
        to: LeadStatus,
    ) -> Result<bool>;
    async fn status_counts_by_campaign_id(&self, campaign_id: Uuid)
        -> Result<Vec<(String, i64)>>;
}
