use anyhow::{Result, anyhow};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use domain::{
    entities::{events::InsertEventEntity, messages::MessageEngagementUpdateEntity},
    repositories::{
        campaigns::CampaignRepository, email::MailboxEmailClient, events::EventRepository,
        leads::LeadRepository, messages::MessageRepository,
    },
    value_objects::{
        campaigns::CampaignCounter,
        enums::{
            event_types::EventType, lead_statuses::LeadStatus, message_statuses::MessageStatus,
        },
    },
};

/// Gmail has no webhook, so replies are discovered by polling each sent
/// thread. One probe per message; a probe failure skips that message and
/// the sweep carries on.
pub struct ReplySyncUseCase<M, L, C, E, Mb>
where
    M: MessageRepository + Send + Sync + 'static,
    L: LeadRepository + Send + Sync + 'static,
    C: CampaignRepository + Send + Sync + 'static,
    E: EventRepository + Send + Sync + 'static,
    Mb: MailboxEmailClient + Send + Sync + 'static,
{
    message_repository: Arc<M>,
    lead_repository: Arc<L>,
    campaign_repository: Arc<C>,
    event_repository: Arc<E>,
    mailbox_client: Arc<Mb>,
}

impl<M, L, C, E, Mb> ReplySyncUseCase<M, L, C, E, Mb>
where
    M: MessageRepository + Send + Sync + 'static,
    L: LeadRepository + Send + Sync + 'static,
    C: CampaignRepository + Send + Sync + 'static,
    E: EventRepository + Send + Sync + 'static,
    Mb: MailboxEmailClient + Send + Sync + 'static,
{
    pub fn new(
        message_repository: Arc<M>,
        lead_repository: Arc<L>,
        campaign_repository: Arc<C>,
        event_repository: Arc<E>,
        mailbox_client: Arc<Mb>,
    ) -> Self {
        Self {
            message_repository,
            lead_repository,
            campaign_repository,
            event_repository,
            mailbox_client,
        }
    }

    /// Sweeps the campaign's gmail-sent messages and returns how many new
    /// replies were found.
    pub async fn sync_replies(&self, user_id: Uuid, campaign_id: Uuid) -> Result<usize> {
        self.campaign_repository
            .find_by_id_and_user_id(campaign_id, user_id)
            .await?
            .ok_or_else(|| anyhow!("Campaign not found"))?;

        let messages = self
            .message_repository
            .list_gmail_sent_by_campaign_id(campaign_id)
            .await?;

        let mut replies_found = 0;
        for message in &messages {
            if message.status == MessageStatus::Replied.to_string() {
                continue;
            }
            let Some(gmail_message_id) = message.gmail_message_id.clone() else {
                continue;
            };

            let replied = match self
                .mailbox_client
                .has_thread_reply(user_id, gmail_message_id)
                .await
            {
                Ok(replied) => replied,
                Err(err) => {
                    warn!(
                        %user_id,
                        message_id = %message.id,
                        mailbox_error = ?err,
                        "reply sync: thread probe failed, skipping message"
                    );
                    continue;
                }
            };
            if !replied {
                continue;
            }

            let now = Utc::now();
            let status = MessageStatus::from_str(&message.status)
                .filter(|current| current.can_transition_to(MessageStatus::Replied))
                .map(|_| MessageStatus::Replied.to_string());

            self.message_repository
                .apply_engagement(
                    message.id,
                    MessageEngagementUpdateEntity {
                        status,
                        opened_at: None,
                        clicked_at: None,
                        replied_at: Some(Some(now)),
                        updated_at: now,
                    },
                )
                .await?;

            self.event_repository
                .append(InsertEventEntity {
                    message_id: message.id,
                    lead_id: message.lead_id,
                    campaign_id: message.campaign_id,
                    event_type: EventType::Replied.to_string(),
                    metadata: serde_json::json!({}),
                    ip_address: None,
                    user_agent: None,
                    created_at: now,
                })
                .await?;

            self.mark_lead_replied(message.lead_id, message.campaign_id)
                .await?;

            replies_found += 1;
        }

        info!(
            %user_id,
            %campaign_id,
            scanned = messages.len(),
            replies_found,
            "reply sync: sweep finished"
        );
        Ok(replies_found)
    }

    async fn mark_lead_replied(&self, lead_id: Uuid, campaign_id: Uuid) -> Result<()> {
        let Some(lead) = self.lead_repository.find_by_id(lead_id).await? else {
            return Ok(());
        };
        let Some(current) = LeadStatus::from_str(&lead.status) else {
            return Ok(());
        };
        if !current.can_transition_to(LeadStatus::Replied) {
            return Ok(());
        }

        let advanced = self
            .lead_repository
            .transition_status(lead_id, current, LeadStatus::Replied)
            .await?;
        if advanced {
            self.campaign_repository
                .bump_engagement_counter(campaign_id, CampaignCounter::Replied)
                .await?;
        }
        Ok(())
    }
}
