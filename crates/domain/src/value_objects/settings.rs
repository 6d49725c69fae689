use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::settings::{
    InsertSettingEntity, SettingEntity, SettingPreferencesUpdateEntity,
};

pub const DEFAULT_DAILY_SEND_LIMIT: i32 = 50;
pub const DEFAULT_FOLLOW_UP_CADENCE_DAYS: i32 = 3;

/// What the settings endpoint exposes. The refresh token never leaves the
/// row; callers only learn whether a mailbox is connected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettingsView {
    pub gmail_connected: bool,
    pub gmail_email: Option<String>,
    pub sendgrid_enabled: bool,
    pub ai_provider: String,
    pub default_tone: String,
    pub daily_send_limit: i32,
    pub follow_up_cadence: i32,
}

impl SettingsView {
    pub fn defaults() -> Self {
        Self {
            gmail_connected: false,
            gmail_email: None,
            sendgrid_enabled: true,
            ai_provider: "openai".to_string(),
            default_tone: "professional".to_string(),
            daily_send_limit: DEFAULT_DAILY_SEND_LIMIT,
            follow_up_cadence: DEFAULT_FOLLOW_UP_CADENCE_DAYS,
        }
    }
}

impl From<SettingEntity> for SettingsView {
    fn from(entity: SettingEntity) -> Self {
        Self {
            gmail_connected: entity.gmail_email.is_some(),
            gmail_email: entity.gmail_email,
            sendgrid_enabled: entity.sendgrid_enabled,
            ai_provider: entity.ai_provider,
            default_tone: entity.default_tone,
            daily_send_limit: entity.daily_send_limit,
            follow_up_cadence: entity.follow_up_cadence,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateSettingsModel {
    pub sendgrid_enabled: Option<bool>,
    pub ai_provider: Option<String>,
    pub default_tone: Option<String>,
    pub daily_send_limit: Option<i32>,
    pub follow_up_cadence: Option<i32>,
}

impl UpdateSettingsModel {
    pub fn to_entity(&self) -> SettingPreferencesUpdateEntity {
        SettingPreferencesUpdateEntity {
            sendgrid_enabled: self.sendgrid_enabled,
            ai_provider: self.ai_provider.clone(),
            default_tone: self.default_tone.clone(),
            daily_send_limit: self.daily_send_limit,
            follow_up_cadence: self.follow_up_cadence,
            updated_at: Utc::now(),
        }
    }
}

pub fn default_setting_entity(user_id: Uuid) -> InsertSettingEntity {
    let defaults = SettingsView::defaults();
    let now = Utc::now();
    InsertSettingEntity {
        user_id,
        gmail_refresh_token: None,
        gmail_email: None,
        sendgrid_enabled: defaults.sendgrid_enabled,
        ai_provider: defaults.ai_provider,
        default_tone: defaults.default_tone,
        daily_send_limit: defaults.daily_send_limit,
        follow_up_cadence: defaults.follow_up_cadence,
        created_at: now,
        updated_at: now,
    }
}
