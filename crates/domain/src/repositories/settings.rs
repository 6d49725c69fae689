use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::entities::settings::{
    SettingEntity, SettingGmailUpdateEntity, SettingPreferencesUpdateEntity,
};

#[async_trait]
#[automock]
pub trait SettingsRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<SettingEntity>>;
    async fn upsert_preferences(
        &self,
        user_id: Uuid,
        update_entity: SettingPreferencesUpdateEntity,
    ) -> Result<SettingEntity>;
    async fn upsert_gmail_link(
        &self,
        user_id: Uuid,
        update_entity: SettingGmailUpdateEntity,
    ) -> Result<SettingEntity>;
}
