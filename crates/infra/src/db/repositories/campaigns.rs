use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::postgres_connection::PgPoolSquad;
use domain::{
    entities::campaigns::{CampaignCountersUpdateEntity, CampaignEntity, InsertCampaignEntity},
    repositories::campaigns::CampaignRepository,
    schema::campaigns,
    value_objects::campaigns::{CampaignCounter, ListCampaignsFilter},
};

pub struct CampaignPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl CampaignPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl CampaignRepository for CampaignPostgres {
    async fn create(&self, insert_campaign_entity: InsertCampaignEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(campaigns::table)
            .values(&insert_campaign_entity)
            .returning(campaigns::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(result)
    }

    async fn find_by_id_and_user_id(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<CampaignEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = campaigns::table
            .filter(campaigns::id.eq(id))
            .filter(campaigns::user_id.eq(user_id))
            .select(CampaignEntity::as_select())
            .first::<CampaignEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_by_user_id(
        &self,
        user_id: Uuid,
        filter: ListCampaignsFilter,
    ) -> Result<(Vec<CampaignEntity>, i64)> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let page = filter.resolved_page();
        let limit = filter.resolved_limit();

        let mut count_query = campaigns::table
            .filter(campaigns::user_id.eq(user_id))
            .into_boxed();
        let mut page_query = campaigns::table
            .filter(campaigns::user_id.eq(user_id))
            .select(CampaignEntity::as_select())
            .into_boxed();

        if let Some(status) = filter.status {
            count_query = count_query.filter(campaigns::status.eq(status.to_string()));
            page_query = page_query.filter(campaigns::status.eq(status.to_string()));
        }

        let total = count_query.count().get_result::<i64>(&mut conn)?;

        let results = page_query
            .order(campaigns::created_at.desc())
            .limit(limit)
            .offset((page - 1) * limit)
            .load::<CampaignEntity>(&mut conn)?;

        Ok((results, total))
    }

    async fn update_counters(
        &self,
        id: Uuid,
        update_entity: CampaignCountersUpdateEntity,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(campaigns::table)
            .filter(campaigns::id.eq(id))
            .set(&update_entity)
            .execute(&mut conn)?;

        Ok(())
    }

    async fn bump_engagement_counter(&self, id: Uuid, counter: CampaignCounter) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let target = campaigns::table.filter(campaigns::id.eq(id));
        match counter {
            CampaignCounter::Opened => {
                update(target)
                    .set((
                        campaigns::opened_count.eq(campaigns::opened_count + 1),
                        campaigns::updated_at.eq(Utc::now()),
                    ))
                    .execute(&mut conn)?;
            }
            CampaignCounter::Clicked => {
                update(target)
                    .set((
                        campaigns::clicked_count.eq(campaigns::clicked_count + 1),
                        campaigns::updated_at.eq(Utc::now()),
                    ))
                    .execute(&mut conn)?;
            }
            CampaignCounter::Replied => {
                update(target)
                    .set((
                        campaigns::replied_count.eq(campaigns::replied_count + 1),
                        campaigns::updated_at.eq(Utc::now()),
                    ))
                    .execute(&mut conn)?;
            }
        }

        Ok(())
    }
}
