use anyhow::{Result, anyhow, bail};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use domain::{
    repositories::{
        email::{MailboxEmailClient, TransactionalEmailClient},
        settings::SettingsRepository,
        users::UserRepository,
    },
    value_objects::email::{OutboundEmail, TestSendModel, TestSendReport},
};

use crate::usecases::email_dispatch::EmailDispatcherUseCase;

/// One-off send to the operator themselves. Goes through the regular
/// channel selection but touches no leads, messages or counters, and is
/// not metered.
pub struct TestSendUseCase<G, S, Mb, T>
where
    G: UserRepository + Send + Sync + 'static,
    S: SettingsRepository + Send + Sync + 'static,
    Mb: MailboxEmailClient + Send + Sync + 'static,
    T: TransactionalEmailClient + Send + Sync + 'static,
{
    user_repository: Arc<G>,
    dispatcher: Arc<EmailDispatcherUseCase<S, Mb, T>>,
}

impl<G, S, Mb, T> TestSendUseCase<G, S, Mb, T>
where
    G: UserRepository + Send + Sync + 'static,
    S: SettingsRepository + Send + Sync + 'static,
    Mb: MailboxEmailClient + Send + Sync + 'static,
    T: TransactionalEmailClient + Send + Sync + 'static,
{
    pub fn new(user_repository: Arc<G>, dispatcher: Arc<EmailDispatcherUseCase<S, Mb, T>>) -> Self {
        Self {
            user_repository,
            dispatcher,
        }
    }

    pub async fn send_test(
        &self,
        user_id: Uuid,
        test_send_model: TestSendModel,
    ) -> Result<TestSendReport> {
        let subject = test_send_model.subject.filter(|s| !s.is_empty());
        let body = test_send_model.body.filter(|b| !b.is_empty());
        let (Some(subject), Some(body)) = (subject, body) else {
            bail!("Subject and email body are required");
        };

        let user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| anyhow!("User not found"))?;

        let recipient = test_send_model
            .test_email
            .filter(|address| !address.is_empty())
            .unwrap_or(user.email);

        let dispatched = self
            .dispatcher
            .dispatch(
                user_id,
                OutboundEmail {
                    to: recipient.clone(),
                    subject,
                    html_body: body,
                    refs: None,
                },
            )
            .await?;

        info!(%user_id, to = %recipient, channel = %dispatched.channel, "test send: delivered");
        Ok(TestSendReport {
            recipient,
            provider_message_id: dispatched.provider_message_id,
        })
    }
}
