use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, dsl::sum, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::postgres_connection::PgPoolSquad;
use domain::{
    entities::usage_logs::InsertUsageLogEntity,
    repositories::usage::UsageRepository,
    schema::usage_logs,
    value_objects::enums::usage_actions::UsageAction,
};

pub struct UsagePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl UsagePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UsageRepository for UsagePostgres {
    async fn sum_for_month(
        &self,
        user_id: Uuid,
        action: UsageAction,
        month: String,
    ) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let total = usage_logs::table
            .filter(usage_logs::user_id.eq(user_id))
            .filter(usage_logs::action_type.eq(action.to_string()))
            .filter(usage_logs::month.eq(month))
            .select(sum(usage_logs::count))
            .first::<Option<i64>>(&mut conn)?;

        Ok(total.unwrap_or(0))
    }

    async fn append(&self, insert_usage_log_entity: InsertUsageLogEntity) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        insert_into(usage_logs::table)
            .values(&insert_usage_log_entity)
            .execute(&mut conn)?;

        Ok(())
    }
}
