use chrono::{DateTime, Utc};
use diesel::{AsChangeset, prelude::*};
use uuid::Uuid;

use crate::schema::messages;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = messages)]
pub struct MessageEntity {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub campaign_id: Uuid,
    pub subject: String,
    pub body: String,
    pub message_type: String,
    pub status: String,
    pub provider: Option<String>,
    pub gmail_message_id: Option<String>,
    pub sendgrid_message_id: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    pub opened_at: Option<DateTime<Utc>>,
    pub clicked_at: Option<DateTime<Utc>>,
    pub replied_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = messages)]
pub struct InsertMessageEntity {
    pub lead_id: Uuid,
    pub campaign_id: Uuid,
    pub subject: String,
    pub body: String,
    pub message_type: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Written once after a dispatch succeeds. The provider id columns nest an
/// Option so only the column for the channel that actually sent is touched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = messages)]
pub struct MessageDeliveryUpdateEntity {
    pub body: Option<String>,
    pub status: String,
    pub provider: Option<Option<String>>,
    pub gmail_message_id: Option<Option<String>>,
    pub sendgrid_message_id: Option<Option<String>>,
    pub sent_at: Option<Option<DateTime<Utc>>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = messages)]
pub struct MessageEngagementUpdateEntity {
    pub status: Option<String>,
    pub opened_at: Option<Option<DateTime<Utc>>>,
    pub clicked_at: Option<Option<DateTime<Utc>>>,
    pub replied_at: Option<Option<DateTime<Utc>>>,
    pub updated_at: DateTime<Utc>,
}
