use chrono::{DateTime, Utc};
use diesel::{AsChangeset, prelude::*};
use uuid::Uuid;

use crate::schema::campaigns;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = campaigns)]
pub struct CampaignEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub subject_template: Option<String>,
    pub body_template: Option<String>,
    pub tone: String,
    pub status: String,
    pub total_leads: i32,
    pub sent_count: i32,
    pub opened_count: i32,
    pub clicked_count: i32,
    pub replied_count: i32,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = campaigns)]
pub struct InsertCampaignEntity {
    pub user_id: Uuid,
    pub name: String,
    pub subject_template: Option<String>,
    pub body_template: Option<String>,
    pub tone: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Counter recount written back after a send batch. `started_at` nests an
/// Option so the timestamp is only touched on the first send.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = campaigns)]
pub struct CampaignCountersUpdateEntity {
    pub total_leads: Option<i32>,
    pub sent_count: Option<i32>,
    pub opened_count: Option<i32>,
    pub clicked_count: Option<i32>,
    pub replied_count: Option<i32>,
    pub status: Option<String>,
    pub started_at: Option<Option<DateTime<Utc>>>,
    pub updated_at: DateTime<Utc>,
}
