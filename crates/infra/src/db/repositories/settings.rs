use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::postgres_connection::PgPoolSquad;
use domain::{
    entities::settings::{
        SettingEntity, SettingGmailUpdateEntity, SettingPreferencesUpdateEntity,
    },
    repositories::settings::SettingsRepository,
    schema::settings,
    value_objects::settings::default_setting_entity,
};

pub struct SettingsPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SettingsPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SettingsRepository for SettingsPostgres {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<SettingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = settings::table
            .filter(settings::user_id.eq(user_id))
            .select(SettingEntity::as_select())
            .first::<SettingEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn upsert_preferences(
        &self,
        user_id: Uuid,
        update_entity: SettingPreferencesUpdateEntity,
    ) -> Result<SettingEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // The insert arm seeds a fresh row, so the requested preferences
        // have to be folded into the defaults as well.
        let mut insert_entity = default_setting_entity(user_id);
        if let Some(sendgrid_enabled) = update_entity.sendgrid_enabled {
            insert_entity.sendgrid_enabled = sendgrid_enabled;
        }
        if let Some(ai_provider) = &update_entity.ai_provider {
            insert_entity.ai_provider = ai_provider.clone();
        }
        if let Some(default_tone) = &update_entity.default_tone {
            insert_entity.default_tone = default_tone.clone();
        }
        if let Some(daily_send_limit) = update_entity.daily_send_limit {
            insert_entity.daily_send_limit = daily_send_limit;
        }
        if let Some(follow_up_cadence) = update_entity.follow_up_cadence {
            insert_entity.follow_up_cadence = follow_up_cadence;
        }

        let result = insert_into(settings::table)
            .values(&insert_entity)
            .on_conflict(settings::user_id)
            .do_update()
            .set(&update_entity)
            .returning(SettingEntity::as_returning())
            .get_result::<SettingEntity>(&mut conn)?;

        Ok(result)
    }

    async fn upsert_gmail_link(
        &self,
        user_id: Uuid,
        update_entity: SettingGmailUpdateEntity,
    ) -> Result<SettingEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut insert_entity = default_setting_entity(user_id);
        insert_entity.gmail_refresh_token = update_entity.gmail_refresh_token.clone().flatten();
        insert_entity.gmail_email = update_entity.gmail_email.clone().flatten();

        let result = insert_into(settings::table)
            .values(&insert_entity)
            .on_conflict(settings::user_id)
            .do_update()
            .set(&update_entity)
            .returning(SettingEntity::as_returning())
            .get_result::<SettingEntity>(&mut conn)?;

        Ok(result)
    }
}
