use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::entities::usage_logs::InsertUsageLogEntity;
use crate::value_objects::enums::usage_actions::UsageAction;

#[async_trait]
#[automock]
pub trait UsageRepository {
    /// Sum of `count` over the user's rows for one action in one month
    /// key. Months with no rows sum to zero.
    async fn sum_for_month(
        &self,
        user_id: Uuid,
        action: UsageAction,
        month: String,
    ) -> Result<i64>;
    async fn append(&self, insert_usage_log_entity: InsertUsageLogEntity) -> Result<()>;
}
