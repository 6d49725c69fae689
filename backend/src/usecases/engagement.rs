use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

use domain::{
    entities::{events::InsertEventEntity, messages::MessageEngagementUpdateEntity},
    repositories::{
        campaigns::CampaignRepository, events::EventRepository, leads::LeadRepository,
        messages::MessageRepository,
    },
    value_objects::{
        campaigns::CampaignCounter,
        email_events::InboundEmailEvent,
        enums::{
            event_types::EventType, lead_statuses::LeadStatus, message_statuses::MessageStatus,
        },
    },
};

/// Applies engagement signals from the pixel, the click redirect and the
/// provider webhook. Every path runs the same forward-only status rules, so
/// a stale or replayed signal can re-timestamp but never downgrade.
pub struct EngagementUseCase<M, L, C, E>
where
    M: MessageRepository + Send + Sync + 'static,
    L: LeadRepository + Send + Sync + 'static,
    C: CampaignRepository + Send + Sync + 'static,
    E: EventRepository + Send + Sync + 'static,
{
    message_repository: Arc<M>,
    lead_repository: Arc<L>,
    campaign_repository: Arc<C>,
    event_repository: Arc<E>,
}

impl<M, L, C, E> EngagementUseCase<M, L, C, E>
where
    M: MessageRepository + Send + Sync + 'static,
    L: LeadRepository + Send + Sync + 'static,
    C: CampaignRepository + Send + Sync + 'static,
    E: EventRepository + Send + Sync + 'static,
{
    pub fn new(
        message_repository: Arc<M>,
        lead_repository: Arc<L>,
        campaign_repository: Arc<C>,
        event_repository: Arc<E>,
    ) -> Self {
        Self {
            message_repository,
            lead_repository,
            campaign_repository,
            event_repository,
        }
    }

    /// Pixel fetch. Unknown ids are ignored so the endpoint never leaks
    /// whether a message exists. Repeated opens refresh the timestamp but
    /// leave an already-advanced status alone.
    pub async fn record_open(
        &self,
        message_id: Uuid,
        ip: Option<String>,
        user_agent: Option<String>,
    ) -> Result<()> {
        let Some(message) = self.message_repository.find_by_id(message_id).await? else {
            debug!(%message_id, "engagement: open for unknown message, ignored");
            return Ok(());
        };

        let now = Utc::now();
        let status = MessageStatus::from_str(&message.status)
            .filter(|current| current.can_transition_to(MessageStatus::Opened))
            .map(|_| MessageStatus::Opened.to_string());

        self.message_repository
            .apply_engagement(
                message_id,
                MessageEngagementUpdateEntity {
                    status,
                    opened_at: Some(Some(now)),
                    clicked_at: None,
                    replied_at: None,
                    updated_at: now,
                },
            )
            .await?;

        self.event_repository
            .append(InsertEventEntity {
                message_id,
                lead_id: message.lead_id,
                campaign_id: message.campaign_id,
                event_type: EventType::Opened.to_string(),
                metadata: serde_json::json!({}),
                ip_address: ip,
                user_agent,
                created_at: now,
            })
            .await?;

        self.upgrade_lead(message.lead_id, message.campaign_id, LeadStatus::Opened)
            .await
    }

    /// Click redirect. Only the first qualifying click is recorded; a
    /// message already at `clicked` or `replied` swallows the signal.
    pub async fn record_click(
        &self,
        message_id: Uuid,
        url: Option<String>,
        ip: Option<String>,
        user_agent: Option<String>,
    ) -> Result<()> {
        let Some(message) = self.message_repository.find_by_id(message_id).await? else {
            debug!(%message_id, "engagement: click for unknown message, ignored");
            return Ok(());
        };

        let Some(current) = MessageStatus::from_str(&message.status) else {
            return Ok(());
        };
        if matches!(current, MessageStatus::Clicked | MessageStatus::Replied) {
            debug!(%message_id, status = %current, "engagement: click already recorded, ignored");
            return Ok(());
        }

        let now = Utc::now();
        let status = current
            .can_transition_to(MessageStatus::Clicked)
            .then(|| MessageStatus::Clicked.to_string());

        self.message_repository
            .apply_engagement(
                message_id,
                MessageEngagementUpdateEntity {
                    status,
                    opened_at: None,
                    clicked_at: Some(Some(now)),
                    replied_at: None,
                    updated_at: now,
                },
            )
            .await?;

        self.event_repository
            .append(InsertEventEntity {
                message_id,
                lead_id: message.lead_id,
                campaign_id: message.campaign_id,
                event_type: EventType::Clicked.to_string(),
                metadata: serde_json::json!({ "url": url }),
                ip_address: ip,
                user_agent,
                created_at: now,
            })
            .await?;

        self.upgrade_lead(message.lead_id, message.campaign_id, LeadStatus::Clicked)
            .await
    }

    /// Webhook batch. Events are independent; one failure is logged and the
    /// rest still run. Returns how many were applied cleanly.
    pub async fn process_provider_events(&self, events: Vec<InboundEmailEvent>) -> usize {
        let total = events.len();
        let mut processed = 0;
        for event in events {
            match self.process_provider_event(&event).await {
                Ok(()) => processed += 1,
                Err(err) => {
                    error!(
                        event_type = %event.event_type,
                        provider_message_id = %event.provider_message_id,
                        process_error = ?err,
                        "engagement: provider event failed"
                    );
                }
            }
        }
        info!(total, processed, "engagement: provider batch processed");
        processed
    }

    pub async fn process_provider_event(&self, event: &InboundEmailEvent) -> Result<()> {
        let Some(message) = self
            .message_repository
            .find_by_sendgrid_message_id(event.provider_message_id.clone())
            .await?
        else {
            debug!(
                provider_message_id = %event.provider_message_id,
                "engagement: event for unknown provider message id, skipped"
            );
            return Ok(());
        };

        let occurred_at = event.occurred_at.unwrap_or_else(Utc::now);
        let metadata = match &event.url {
            Some(url) => serde_json::json!({ "url": url }),
            None => serde_json::json!({}),
        };

        self.event_repository
            .append(InsertEventEntity {
                message_id: message.id,
                lead_id: message.lead_id,
                campaign_id: message.campaign_id,
                event_type: event.event_type.clone(),
                metadata,
                ip_address: event.ip.clone(),
                user_agent: event.user_agent.clone(),
                created_at: occurred_at,
            })
            .await?;

        // Spam reports and other non-status events only leave the row above.
        let Some(target) = MessageStatus::from_str(&event.event_type) else {
            return Ok(());
        };

        let allowed = MessageStatus::from_str(&message.status)
            .is_some_and(|current| current.can_transition_to(target));
        if allowed {
            self.message_repository
                .apply_engagement(
                    message.id,
                    MessageEngagementUpdateEntity {
                        status: Some(target.to_string()),
                        opened_at: (target == MessageStatus::Opened).then_some(Some(occurred_at)),
                        clicked_at: (target == MessageStatus::Clicked).then_some(Some(occurred_at)),
                        replied_at: (target == MessageStatus::Replied).then_some(Some(occurred_at)),
                        updated_at: Utc::now(),
                    },
                )
                .await?;
        }

        let lead_target = match target {
            MessageStatus::Opened => Some(LeadStatus::Opened),
            MessageStatus::Clicked => Some(LeadStatus::Clicked),
            MessageStatus::Replied => Some(LeadStatus::Replied),
            MessageStatus::Bounced => Some(LeadStatus::Bounced),
            _ => None,
        };
        if let Some(lead_target) = lead_target {
            self.upgrade_lead(message.lead_id, message.campaign_id, lead_target)
                .await?;
        }

        Ok(())
    }

    /// Forward-only lead upgrade. The compare-and-set on the current status
    /// means exactly one of two racing signals wins, and only the winner
    /// bumps the campaign counter.
    async fn upgrade_lead(
        &self,
        lead_id: Uuid,
        campaign_id: Uuid,
        to: LeadStatus,
    ) -> Result<()> {
        let Some(lead) = self.lead_repository.find_by_id(lead_id).await? else {
            return Ok(());
        };
        let Some(current) = LeadStatus::from_str(&lead.status) else {
            return Ok(());
        };
        if !current.can_transition_to(to) {
            return Ok(());
        }

        let advanced = self
            .lead_repository
            .transition_status(lead_id, current, to)
            .await?;
        if !advanced {
            return Ok(());
        }

        let counter = match to {
            LeadStatus::Opened => Some(CampaignCounter::Opened),
            LeadStatus::Clicked => Some(CampaignCounter::Clicked),
            LeadStatus::Replied => Some(CampaignCounter::Replied),
            _ => None,
        };
        if let Some(counter) = counter {
            self.campaign_repository
                .bump_engagement_counter(campaign_id, counter)
                .await?;
        }

        Ok(())
    }
}
