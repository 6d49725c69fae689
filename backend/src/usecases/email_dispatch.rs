use anyhow::Result;
use std::sync::Arc;
use tracing::{error, warn};
use uuid::Uuid;

use domain::{
    repositories::{
        email::{MailboxEmailClient, TransactionalEmailClient},
        settings::SettingsRepository,
    },
    value_objects::{
        email::{DispatchedEmail, OutboundEmail},
        enums::email_channels::EmailChannel,
    },
};

/// Picks the outbound channel per user. A linked Gmail mailbox wins;
/// everyone else, and any mailbox send that errors, goes through the
/// shared transactional provider.
pub struct EmailDispatcherUseCase<S, Mb, T>
where
    S: SettingsRepository + Send + Sync + 'static,
    Mb: MailboxEmailClient + Send + Sync + 'static,
    T: TransactionalEmailClient + Send + Sync + 'static,
{
    settings_repository: Arc<S>,
    mailbox_client: Arc<Mb>,
    transactional_client: Arc<T>,
}

impl<S, Mb, T> EmailDispatcherUseCase<S, Mb, T>
where
    S: SettingsRepository + Send + Sync + 'static,
    Mb: MailboxEmailClient + Send + Sync + 'static,
    T: TransactionalEmailClient + Send + Sync + 'static,
{
    pub fn new(
        settings_repository: Arc<S>,
        mailbox_client: Arc<Mb>,
        transactional_client: Arc<T>,
    ) -> Self {
        Self {
            settings_repository,
            mailbox_client,
            transactional_client,
        }
    }

    pub async fn dispatch(&self, user_id: Uuid, email: OutboundEmail) -> Result<DispatchedEmail> {
        let settings = self
            .settings_repository
            .find_by_user_id(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "dispatch: failed to load settings");
                err
            })?;

        let gmail_linked = settings
            .as_ref()
            .is_some_and(|row| row.gmail_refresh_token.is_some() && row.gmail_email.is_some());

        if gmail_linked {
            match self.mailbox_client.send_email(user_id, email.clone()).await {
                Ok(provider_message_id) => {
                    return Ok(DispatchedEmail {
                        provider_message_id,
                        channel: EmailChannel::Gmail,
                    });
                }
                Err(err) => {
                    warn!(
                        %user_id,
                        to = %email.to,
                        mailbox_error = ?err,
                        "dispatch: gmail send failed, falling back to sendgrid"
                    );
                }
            }
        }

        let provider_message_id = self
            .transactional_client
            .send_email(email)
            .await
            .map_err(|err| {
                error!(%user_id, send_error = ?err, "dispatch: sendgrid send failed");
                err
            })?;

        Ok(DispatchedEmail {
            provider_message_id,
            channel: EmailChannel::Sendgrid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use chrono::Utc;
    use domain::{
        entities::settings::SettingEntity,
        repositories::{
            email::{MockMailboxEmailClient, MockTransactionalEmailClient},
            settings::MockSettingsRepository,
        },
    };
    use mockall::predicate::eq;

    fn sample_email() -> OutboundEmail {
        OutboundEmail {
            to: "jordan@acme.io".to_string(),
            subject: "Quick question".to_string(),
            html_body: "<p>Hello</p>".to_string(),
            refs: None,
        }
    }

    fn sample_settings(user_id: Uuid, linked: bool) -> SettingEntity {
        let now = Utc::now();
        SettingEntity {
            id: Uuid::new_v4(),
            user_id,
            gmail_refresh_token: linked.then(|| "sealed-token".to_string()),
            gmail_email: linked.then(|| "me@gmail.com".to_string()),
            sendgrid_enabled: true,
            ai_provider: "openai".to_string(),
            default_tone: "professional".to_string(),
            daily_send_limit: 50,
            follow_up_cadence: 3,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn linked_mailbox_sends_through_gmail() {
        let user_id = Uuid::new_v4();

        let mut settings_repository = MockSettingsRepository::new();
        settings_repository
            .expect_find_by_user_id()
            .with(eq(user_id))
            .returning(move |_| {
                let row = sample_settings(user_id, true);
                Box::pin(async move { Ok(Some(row)) })
            });

        let mut mailbox_client = MockMailboxEmailClient::new();
        mailbox_client
            .expect_send_email()
            .returning(|_, _| Box::pin(async { Ok("gm-188f".to_string()) }));

        let mut transactional_client = MockTransactionalEmailClient::new();
        transactional_client.expect_send_email().never();

        let dispatcher = EmailDispatcherUseCase::new(
            Arc::new(settings_repository),
            Arc::new(mailbox_client),
            Arc::new(transactional_client),
        );

        let dispatched = dispatcher.dispatch(user_id, sample_email()).await.unwrap();

        assert_eq!(dispatched.channel, EmailChannel::Gmail);
        assert_eq!(dispatched.provider_message_id, "gm-188f");
    }

    #[tokio::test]
    async fn unlinked_user_sends_through_sendgrid() {
        let user_id = Uuid::new_v4();

        let mut settings_repository = MockSettingsRepository::new();
        settings_repository
            .expect_find_by_user_id()
            .returning(|_| Box::pin(async { Ok(None) }));

        let mut mailbox_client = MockMailboxEmailClient::new();
        mailbox_client.expect_send_email().never();

        let mut transactional_client = MockTransactionalEmailClient::new();
        transactional_client
            .expect_send_email()
            .returning(|_| Box::pin(async { Ok("sg-outbound-1".to_string()) }));

        let dispatcher = EmailDispatcherUseCase::new(
            Arc::new(settings_repository),
            Arc::new(mailbox_client),
            Arc::new(transactional_client),
        );

        let dispatched = dispatcher.dispatch(user_id, sample_email()).await.unwrap();

        assert_eq!(dispatched.channel, EmailChannel::Sendgrid);
        assert_eq!(dispatched.provider_message_id, "sg-outbound-1");
    }

    #[tokio::test]
    async fn half_linked_settings_row_counts_as_unlinked() {
        let user_id = Uuid::new_v4();

        let mut settings_repository = MockSettingsRepository::new();
        settings_repository
            .expect_find_by_user_id()
            .returning(move |_| {
                let mut row = sample_settings(user_id, true);
                row.gmail_refresh_token = None;
                Box::pin(async move { Ok(Some(row)) })
            });

        let mut mailbox_client = MockMailboxEmailClient::new();
        mailbox_client.expect_send_email().never();

        let mut transactional_client = MockTransactionalEmailClient::new();
        transactional_client
            .expect_send_email()
            .returning(|_| Box::pin(async { Ok("sg-outbound-2".to_string()) }));

        let dispatcher = EmailDispatcherUseCase::new(
            Arc::new(settings_repository),
            Arc::new(mailbox_client),
            Arc::new(transactional_client),
        );

        let dispatched = dispatcher.dispatch(user_id, sample_email()).await.unwrap();

        assert_eq!(dispatched.channel, EmailChannel::Sendgrid);
    }

    #[tokio::test]
    async fn mailbox_failure_falls_back_to_sendgrid() {
        let user_id = Uuid::new_v4();

        let mut settings_repository = MockSettingsRepository::new();
        settings_repository
            .expect_find_by_user_id()
            .returning(move |_| {
                let row = sample_settings(user_id, true);
                Box::pin(async move { Ok(Some(row)) })
            });

        let mut mailbox_client = MockMailboxEmailClient::new();
        mailbox_client
            .expect_send_email()
            .returning(|_, _| Box::pin(async { Err(anyhow!("refresh token revoked")) }));

        let mut transactional_client = MockTransactionalEmailClient::new();
        transactional_client
            .expect_send_email()
            .returning(|_| Box::pin(async { Ok("sg-fallback-7".to_string()) }));

        let dispatcher = EmailDispatcherUseCase::new(
            Arc::new(settings_repository),
            Arc::new(mailbox_client),
            Arc::new(transactional_client),
        );

        let dispatched = dispatcher.dispatch(user_id, sample_email()).await.unwrap();

        assert_eq!(dispatched.channel, EmailChannel::Sendgrid);
        assert_eq!(dispatched.provider_message_id, "sg-fallback-7");
    }
}
