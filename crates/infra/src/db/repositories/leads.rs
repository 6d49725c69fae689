use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::postgres_connection::PgPoolSquad;
use domain::{
    entities::leads::{InsertLeadEntity, LeadEntity},
    repositories::leads::LeadRepository,
    schema::leads,
    value_objects::enums::lead_statuses::LeadStatus,
};

pub struct LeadPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl LeadPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl LeadRepository for LeadPostgres {
    async fn bulk_insert(&self, insert_lead_entities: Vec<InsertLeadEntity>) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let inserted = insert_into(leads::table)
            .values(&insert_lead_entities)
            .execute(&mut conn)?;

        Ok(inserted)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<LeadEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = leads::table
            .filter(leads::id.eq(id))
            .select(LeadEntity::as_select())
            .first::<LeadEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_by_id_and_campaign_id(
        &self,
        id: Uuid,
        campaign_id: Uuid,
    ) -> Result<Option<LeadEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = leads::table
            .filter(leads::id.eq(id))
            .filter(leads::campaign_id.eq(campaign_id))
            .select(LeadEntity::as_select())
            .first::<LeadEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_by_campaign_id(&self, campaign_id: Uuid) -> Result<Vec<LeadEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = leads::table
            .filter(leads::campaign_id.eq(campaign_id))
            .select(LeadEntity::as_select())
            .order(leads::created_at.desc())
            .load::<LeadEntity>(&mut conn)?;

        Ok(results)
    }

    async fn list_pending_by_campaign_id(
        &self,
        campaign_id: Uuid,
        limit: i64,
    ) -> Result<Vec<LeadEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = leads::table
            .filter(leads::campaign_id.eq(campaign_id))
            .filter(leads::status.eq(LeadStatus::Pending.to_string()))
            .select(LeadEntity::as_select())
            .order(leads::created_at.asc())
            .limit(limit)
            .load::<LeadEntity>(&mut conn)?;

        Ok(results)
    }

    async fn transition_status(&self, id: Uuid, from: LeadStatus, to: LeadStatus) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = update(leads::table)
            .filter(leads::id.eq(id))
            .filter(leads::status.eq(from.to_string()))
            .set((
                leads::status.eq(to.to_string()),
                leads::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(affected == 1)
    }

    async fn status_counts_by_campaign_id(
        &self,
        campaign_id: Uuid,
    ) -> Result<Vec<(String, i64)>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = leads::table
            .filter(leads::campaign_id.eq(campaign_id))
            .group_by(leads::status)
            .select((leads::status, diesel::dsl::count_star()))
            .load::<(String, i64)>(&mut conn)?;

        Ok(results)
    }
}
