use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::usage_logs;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = usage_logs)]
pub struct UsageLogEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action_type: String,
    pub campaign_id: Option<Uuid>,
    pub month: String,
    pub count: i32,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = usage_logs)]
pub struct InsertUsageLogEntity {
    pub user_id: Uuid,
    pub action_type: String,
    pub campaign_id: Option<Uuid>,
    pub month: String,
    pub count: i32,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
