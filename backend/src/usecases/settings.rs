use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use domain::{
    repositories::settings::SettingsRepository,
    value_objects::settings::{SettingsView, UpdateSettingsModel},
};

pub struct SettingsUseCase<S>
where
    S: SettingsRepository + Send + Sync + 'static,
{
    settings_repository: Arc<S>,
}

impl<S> SettingsUseCase<S>
where
    S: SettingsRepository + Send + Sync + 'static,
{
    pub fn new(settings_repository: Arc<S>) -> Self {
        Self {
            settings_repository,
        }
    }

    /// A user without a settings row sees the defaults; the row is only
    /// materialized once they save something.
    pub async fn get_settings(&self, user_id: Uuid) -> Result<SettingsView> {
        let view = self
            .settings_repository
            .find_by_user_id(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "settings: failed to load settings");
                err
            })?
            .map(SettingsView::from)
            .unwrap_or_else(SettingsView::defaults);

        Ok(view)
    }

    pub async fn update_settings(
        &self,
        user_id: Uuid,
        model: UpdateSettingsModel,
    ) -> Result<SettingsView> {
        let entity = self
            .settings_repository
            .upsert_preferences(user_id, model.to_entity())
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "settings: failed to save preferences");
                err
            })?;

        info!(%user_id, "settings: preferences saved");

        Ok(SettingsView::from(entity))
    }
}
