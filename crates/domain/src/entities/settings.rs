use chrono::{DateTime, Utc};
use diesel::{AsChangeset, prelude::*};
use uuid::Uuid;

use crate::schema::settings;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = settings)]
pub struct SettingEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub gmail_refresh_token: Option<String>,
    pub gmail_email: Option<String>,
    pub sendgrid_enabled: bool,
    pub ai_provider: String,
    pub default_tone: String,
    pub daily_send_limit: i32,
    pub follow_up_cadence: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = settings)]
pub struct InsertSettingEntity {
    pub user_id: Uuid,
    pub gmail_refresh_token: Option<String>,
    pub gmail_email: Option<String>,
    pub sendgrid_enabled: bool,
    pub ai_provider: String,
    pub default_tone: String,
    pub daily_send_limit: i32,
    pub follow_up_cadence: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = settings)]
pub struct SettingPreferencesUpdateEntity {
    pub sendgrid_enabled: Option<bool>,
    pub ai_provider: Option<String>,
    pub default_tone: Option<String>,
    pub daily_send_limit: Option<i32>,
    pub follow_up_cadence: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

/// Mailbox link columns are nested Options so disconnect can null them out.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = settings)]
pub struct SettingGmailUpdateEntity {
    pub gmail_refresh_token: Option<Option<String>>,
    pub gmail_email: Option<Option<String>>,
    pub updated_at: DateTime<Utc>,
}
