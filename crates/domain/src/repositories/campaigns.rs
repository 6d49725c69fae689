use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::entities::campaigns::{
    CampaignCountersUpdateEntity, CampaignEntity, InsertCampaignEntity,
};
use crate::value_objects::campaigns::{CampaignCounter, ListCampaignsFilter};

#[async_trait]
#[automock]
pub trait CampaignRepository {
    async fn create(&self, insert_campaign_entity: InsertCampaignEntity) -> Result<Uuid>;
    async fn find_by_id_and_user_id(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<CampaignEntity>>;
    async fn list_by_user_id(
        &self,
        user_id: Uuid,
        filter: ListCampaignsFilter,
    ) -> Result<(Vec<CampaignEntity>, i64)>;
    async fn update_counters(
        &self,
        id: Uuid,
        update_entity: CampaignCountersUpdateEntity,
    ) -> Result<()>;
    /// Single-statement `SET c = c + 1`, safe under concurrent trackers.
    async fn bump_engagement_counter(
        &self,
        id: Uuid,
        counter: CampaignCounter,
    ) -> Result<()>;
}
