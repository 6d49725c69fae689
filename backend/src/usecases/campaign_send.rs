use anyhow::{Result, anyhow, bail};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use domain::{
    entities::{campaigns::CampaignCountersUpdateEntity, leads::LeadEntity, messages::{InsertMessageEntity, MessageDeliveryUpdateEntity}},
    repositories::{
        campaigns::CampaignRepository,
        email::{MailboxEmailClient, TransactionalEmailClient},
        leads::LeadRepository,
        messages::MessageRepository,
        settings::SettingsRepository,
        text_generation::TextGenerationClient,
        usage::UsageRepository,
        users::UserRepository,
    },
    value_objects::{
        email::{MessageRef, OutboundEmail},
        enums::{
            campaign_statuses::CampaignStatus, email_channels::EmailChannel,
            lead_statuses::LeadStatus, message_statuses::MessageStatus,
            message_types::MessageType, usage_actions::UsageAction,
        },
        generation::LeadProfile,
        leads::LeadStatusTally,
        send_reports::SendCampaignReport,
        usage::Gated,
    },
};

use crate::usecases::{
    email_dispatch::EmailDispatcherUseCase,
    generation::ContentGeneratorUseCase,
    quota::QuotaUseCase,
    tracking_links::{instrument_html, plain_text_to_html},
};

/// Throughput guard per invocation, not an architectural ceiling. The
/// operator re-triggers to drain the rest of the pending pool.
pub const SEND_BATCH_LIMIT: i64 = 10;

/// Drives one send batch end to end: quota gate, per-lead generation,
/// channel dispatch, usage metering and the authoritative counter recount.
/// Leads are processed strictly in order so a mid-batch quota stop reflects
/// every send that already happened in this invocation.
pub struct CampaignSendUseCase<C, L, M, U, G, A, S, Mb, T>
where
    C: CampaignRepository + Send + Sync + 'static,
    L: LeadRepository + Send + Sync + 'static,
    M: MessageRepository + Send + Sync + 'static,
    U: UsageRepository + Send + Sync + 'static,
    G: UserRepository + Send + Sync + 'static,
    A: TextGenerationClient + Send + Sync + 'static,
    S: SettingsRepository + Send + Sync + 'static,
    Mb: MailboxEmailClient + Send + Sync + 'static,
    T: TransactionalEmailClient + Send + Sync + 'static,
{
    campaign_repository: Arc<C>,
    lead_repository: Arc<L>,
    message_repository: Arc<M>,
    quota: Arc<QuotaUseCase<U, G>>,
    generator: Arc<ContentGeneratorUseCase<A>>,
    dispatcher: Arc<EmailDispatcherUseCase<S, Mb, T>>,
    base_url: String,
}

impl<C, L, M, U, G, A, S, Mb, T> CampaignSendUseCase<C, L, M, U, G, A, S, Mb, T>
where
    C: CampaignRepository + Send + Sync + 'static,
    L: LeadRepository + Send + Sync + 'static,
    M: MessageRepository + Send + Sync + 'static,
    U: UsageRepository + Send + Sync + 'static,
    G: UserRepository + Send + Sync + 'static,
    A: TextGenerationClient + Send + Sync + 'static,
    S: SettingsRepository + Send + Sync + 'static,
    Mb: MailboxEmailClient + Send + Sync + 'static,
    T: TransactionalEmailClient + Send + Sync + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        campaign_repository: Arc<C>,
        lead_repository: Arc<L>,
        message_repository: Arc<M>,
        quota: Arc<QuotaUseCase<U, G>>,
        generator: Arc<ContentGeneratorUseCase<A>>,
        dispatcher: Arc<EmailDispatcherUseCase<S, Mb, T>>,
        base_url: String,
    ) -> Self {
        Self {
            campaign_repository,
            lead_repository,
            message_repository,
            quota,
            generator,
            dispatcher,
            base_url,
        }
    }

    pub async fn send_campaign(
        &self,
        user_id: Uuid,
        campaign_id: Uuid,
    ) -> Result<Gated<SendCampaignReport>> {
        // The gate answers before anything else, even the ownership lookup,
        // so an exhausted account always sees the quota envelope.
        let quota = self.quota.check_quota(user_id).await?;
        if !quota.allowed {
            warn!(%user_id, %campaign_id, plan = %quota.plan, "campaign send: quota exhausted before batch");
            return Ok(Gated::QuotaExceeded {
                plan: quota.plan,
                limit: quota.limit,
            });
        }

        let campaign = self
            .campaign_repository
            .find_by_id_and_user_id(campaign_id, user_id)
            .await?
            .ok_or_else(|| anyhow!("Campaign not found"))?;

        let pending = self
            .lead_repository
            .list_pending_by_campaign_id(campaign_id, SEND_BATCH_LIMIT)
            .await?;
        if pending.is_empty() {
            bail!("No pending leads to send to");
        }

        info!(%user_id, %campaign_id, batch = pending.len(), "campaign send: batch started");

        let mut report = SendCampaignReport::new();
        for lead in &pending {
            // Re-checked every iteration so an exhaustion mid-batch stops
            // the batch without touching leads already sent.
            let quota = self.quota.check_quota(user_id).await?;
            if !quota.allowed {
                report.record_stop(format!("Quota limit reached after {} emails", report.sent));
                warn!(%user_id, %campaign_id, sent = report.sent, "campaign send: quota stop mid-batch");
                break;
            }

            match self.send_to_lead(user_id, &campaign.id, &campaign.tone, lead).await {
                Ok(()) => report.record_sent(),
                Err(err) => {
                    warn!(%user_id, lead = %lead.email, send_error = ?err, "campaign send: lead failed");
                    report.record_failure(format!("{}: {}", lead.email, err));
                    if let Err(err) = self
                        .lead_repository
                        .transition_status(lead.id, LeadStatus::Pending, LeadStatus::Failed)
                        .await
                    {
                        error!(%user_id, lead = %lead.email, db_error = ?err, "campaign send: failed to mark lead failed");
                    }
                }
            }
        }

        self.recount_campaign(&campaign.id, campaign.started_at.is_none())
            .await?;

        info!(
            %user_id,
            %campaign_id,
            sent = report.sent,
            failed = report.failed,
            "campaign send: batch finished"
        );
        Ok(Gated::Granted(report))
    }

    async fn send_to_lead(
        &self,
        user_id: Uuid,
        campaign_id: &Uuid,
        tone: &str,
        lead: &LeadEntity,
    ) -> Result<()> {
        let profile = LeadProfile::from(lead);
        let (subjects, body) = tokio::try_join!(
            self.generator.generate_subjects(&profile, tone),
            self.generator.generate_body(&profile, tone)
        )?;
        let subject = subjects[0].clone();

        // The row is reserved before dispatch so the tracking links can
        // carry its id; a failed dispatch removes it again.
        let now = Utc::now();
        let message_id = self
            .message_repository
            .create(InsertMessageEntity {
                lead_id: lead.id,
                campaign_id: *campaign_id,
                subject: subject.clone(),
                body: body.clone(),
                message_type: MessageType::Initial.to_string(),
                status: MessageStatus::Queued.to_string(),
                created_at: now,
                updated_at: now,
            })
            .await?;

        let html_body = instrument_html(&plain_text_to_html(&body), &self.base_url, message_id);
        let outbound = OutboundEmail {
            to: lead.email.clone(),
            subject,
            html_body: html_body.clone(),
            refs: Some(MessageRef {
                message_id,
                campaign_id: *campaign_id,
                lead_id: lead.id,
                user_id,
            }),
        };

        let dispatched = match self.dispatcher.dispatch(user_id, outbound).await {
            Ok(dispatched) => dispatched,
            Err(err) => {
                if let Err(delete_err) = self.message_repository.delete(message_id).await {
                    error!(%message_id, db_error = ?delete_err, "campaign send: failed to drop reserved message row");
                }
                return Err(err);
            }
        };

        let provider_message_id = dispatched.provider_message_id.clone();
        self.message_repository
            .finalize_delivery(
                message_id,
                MessageDeliveryUpdateEntity {
                    body: Some(html_body),
                    status: MessageStatus::Sent.to_string(),
                    provider: Some(Some(dispatched.channel.to_string())),
                    gmail_message_id: (dispatched.channel == EmailChannel::Gmail)
                        .then_some(Some(provider_message_id.clone())),
                    sendgrid_message_id: (dispatched.channel == EmailChannel::Sendgrid)
                        .then_some(Some(provider_message_id)),
                    sent_at: Some(Some(Utc::now())),
                    updated_at: Utc::now(),
                },
            )
            .await?;

        let advanced = self
            .lead_repository
            .transition_status(lead.id, LeadStatus::Pending, LeadStatus::Sent)
            .await?;
        if !advanced {
            warn!(lead = %lead.email, "campaign send: lead left pending before status flip");
        }

        self.quota
            .record_usage(user_id, UsageAction::EmailGenerated, Some(*campaign_id))
            .await?;
        self.quota
            .record_usage(user_id, UsageAction::EmailSent, Some(*campaign_id))
            .await?;

        Ok(())
    }

    /// Authoritative recount from a grouped lead scan, never incremental.
    /// A crash between the per-lead writes and this point self-heals on the
    /// next batch.
    async fn recount_campaign(&self, campaign_id: &Uuid, never_started: bool) -> Result<()> {
        let counts = self
            .lead_repository
            .status_counts_by_campaign_id(*campaign_id)
            .await?;
        let tally = LeadStatusTally::from_counts(&counts);
        let delivered = tally.delivered();

        self.campaign_repository
            .update_counters(
                *campaign_id,
                CampaignCountersUpdateEntity {
                    total_leads: Some(tally.total as i32),
                    sent_count: Some(delivered as i32),
                    opened_count: Some(tally.reached_opened as i32),
                    clicked_count: Some(tally.reached_clicked as i32),
                    replied_count: Some(tally.replied as i32),
                    status: (delivered > 0).then(|| CampaignStatus::Active.to_string()),
                    started_at: (never_started && delivered > 0).then(|| Some(Utc::now())),
                    updated_at: Utc::now(),
                },
            )
            .await
    }
}
