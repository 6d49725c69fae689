use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use domain::{
    entities::settings::SettingGmailUpdateEntity,
    repositories::{email::MailboxOauthClient, settings::SettingsRepository},
};

/// Links and unlinks the user's own Gmail mailbox. The OAuth `state`
/// round-trips the user id because the provider calls back without our
/// session cookie.
pub struct GmailOauthUseCase<S, O>
where
    S: SettingsRepository + Send + Sync + 'static,
    O: MailboxOauthClient + Send + Sync + 'static,
{
    settings_repository: Arc<S>,
    oauth_client: Arc<O>,
}

impl<S, O> GmailOauthUseCase<S, O>
where
    S: SettingsRepository + Send + Sync + 'static,
    O: MailboxOauthClient + Send + Sync + 'static,
{
    pub fn new(settings_repository: Arc<S>, oauth_client: Arc<O>) -> Self {
        Self {
            settings_repository,
            oauth_client,
        }
    }

    pub fn connect_url(&self, user_id: Uuid) -> String {
        self.oauth_client.consent_url(user_id.to_string())
    }

    pub async fn complete_connection(&self, state: String, code: String) -> Result<()> {
        let user_id: Uuid = state
            .parse()
            .context("OAuth state is not a valid user id")?;

        let connection = self
            .oauth_client
            .establish_connection(code)
            .await
            .map_err(|err| {
                error!(%user_id, oauth_error = ?err, "gmail oauth: code exchange failed");
                err
            })?;

        let gmail_email = connection.gmail_email.clone();
        self.settings_repository
            .upsert_gmail_link(
                user_id,
                SettingGmailUpdateEntity {
                    gmail_refresh_token: Some(Some(connection.encrypted_refresh_token)),
                    gmail_email: Some(Some(connection.gmail_email)),
                    updated_at: Utc::now(),
                },
            )
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "gmail oauth: failed to store mailbox link");
                err
            })?;

        info!(%user_id, %gmail_email, "gmail oauth: mailbox linked");

        Ok(())
    }

    pub async fn disconnect(&self, user_id: Uuid) -> Result<()> {
        self.settings_repository
            .upsert_gmail_link(
                user_id,
                SettingGmailUpdateEntity {
                    gmail_refresh_token: Some(None),
                    gmail_email: Some(None),
                    updated_at: Utc::now(),
                },
            )
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "gmail oauth: failed to clear mailbox link");
                err
            })?;

        info!(%user_id, "gmail oauth: mailbox unlinked");

        Ok(())
    }
}
