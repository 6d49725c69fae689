use anyhow::{Result, anyhow};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use domain::{
    repositories::{
        campaigns::CampaignRepository, leads::LeadRepository,
        text_generation::TextGenerationClient, usage::UsageRepository, users::UserRepository,
    },
    value_objects::{
        enums::usage_actions::UsageAction,
        generation::{CampaignPreview, LeadProfile, PreviewRequest},
        usage::Gated,
    },
};

use crate::usecases::{generation::ContentGeneratorUseCase, quota::QuotaUseCase};

/// Per-lead preview of the full sequence. Quota-gated and metered exactly
/// like a real generation, so previews and sends draw from the same pool.
pub struct PreviewUseCase<C, L, U, G, A>
where
    C: CampaignRepository + Send + Sync + 'static,
    L: LeadRepository + Send + Sync + 'static,
    U: UsageRepository + Send + Sync + 'static,
    G: UserRepository + Send + Sync + 'static,
    A: TextGenerationClient + Send + Sync + 'static,
{
    campaign_repository: Arc<C>,
    lead_repository: Arc<L>,
    quota: Arc<QuotaUseCase<U, G>>,
    generator: Arc<ContentGeneratorUseCase<A>>,
}

impl<C, L, U, G, A> PreviewUseCase<C, L, U, G, A>
where
    C: CampaignRepository + Send + Sync + 'static,
    L: LeadRepository + Send + Sync + 'static,
    U: UsageRepository + Send + Sync + 'static,
    G: UserRepository + Send + Sync + 'static,
    A: TextGenerationClient + Send + Sync + 'static,
{
    pub fn new(
        campaign_repository: Arc<C>,
        lead_repository: Arc<L>,
        quota: Arc<QuotaUseCase<U, G>>,
        generator: Arc<ContentGeneratorUseCase<A>>,
    ) -> Self {
        Self {
            campaign_repository,
            lead_repository,
            quota,
            generator,
        }
    }

    pub async fn preview(
        &self,
        user_id: Uuid,
        campaign_id: Uuid,
        request: PreviewRequest,
    ) -> Result<Gated<CampaignPreview>> {
        let quota = self.quota.check_quota(user_id).await?;
        if !quota.allowed {
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

        let lead_id = request.lead_id.ok_or_else(|| anyhow!("Lead not found"))?;
        let lead = self
            .lead_repository
            .find_by_id_and_campaign_id(lead_id, campaign_id)
            .await?
            .ok_or_else(|| anyhow!("Lead not found"))?;

        let tone = request.tone.unwrap_or_else(|| campaign.tone.clone());
        let profile = LeadProfile::from(&lead);
        let preview = self.generator.generate_preview(&profile, &tone).await?;

        self.quota
            .record_usage(user_id, UsageAction::EmailGenerated, Some(campaign_id))
            .await?;

        info!(%user_id, %campaign_id, %lead_id, "preview: generated");
        Ok(Gated::Granted(preview))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::{
        entities::{campaigns::CampaignEntity, leads::LeadEntity, users::UserEntity},
        repositories::{
            campaigns::MockCampaignRepository, leads::MockLeadRepository,
            text_generation::MockTextGenerationClient, usage::MockUsageRepository,
            users::MockUserRepository,
        },
        value_objects::enums::{campaign_statuses::CampaignStatus, plans::Plan},
    };

    fn sample_campaign(id: Uuid, user_id: Uuid, tone: &str) -> CampaignEntity {
        let now = Utc::now();
        CampaignEntity {
            id,
            user_id,
            name: "Q3 launch".to_string(),
            subject_template: None,
            body_template: None,
            tone: tone.to_string(),
            status: CampaignStatus::Draft.to_string(),
            total_leads: 1,
            sent_count: 0,
            opened_count: 0,
            clicked_count: 0,
            replied_count: 0,
            scheduled_at: None,
            started_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_lead(id: Uuid, campaign_id: Uuid) -> LeadEntity {
        let now = Utc::now();
        LeadEntity {
            id,
            campaign_id,
            email: "jordan@acme.io".to_string(),
            first_name: Some("Jordan".to_string()),
            last_name: None,
            company: Some("Acme".to_string()),
            title: None,
            custom_fields: serde_json::json!({}),
            status: "pending".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn free_user_repository(user_id: Uuid) -> MockUserRepository {
        let mut user_repository = MockUserRepository::new();
        user_repository.expect_find_by_id().returning(move |_| {
            let now = Utc::now();
            let user = UserEntity {
                id: user_id,
                email: "owner@outreach.test".to_string(),
                first_name: None,
                last_name: None,
                plan: "free".to_string(),
                subscription_id: None,
                subscription_status: None,
                created_at: now,
                updated_at: now,
            };
            Box::pin(async move { Ok(Some(user)) })
        });
        user_repository
    }

    fn canned_text_client() -> MockTextGenerationClient {
        let mut text_client = MockTextGenerationClient::new();
        text_client.expect_generate().returning(|_, max_tokens, _| {
            Box::pin(async move {
                Ok(if max_tokens == 100 {
                    r#"["One", "Two", "Three"]"#.to_string()
                } else {
                    "Generated body.".to_string()
                })
            })
        });
        text_client
    }

    fn usage_with_count(count: i64) -> MockUsageRepository {
        let mut usage = MockUsageRepository::new();
        usage
            .expect_sum_for_month()
            .returning(move |_, _, _| Box::pin(async move { Ok(count) }));
        usage
    }

    #[tokio::test]
    async fn quota_gate_fires_before_any_lookup() {
        let user_id = Uuid::new_v4();

        let mut campaigns = MockCampaignRepository::new();
        campaigns.expect_find_by_id_and_user_id().never();

        let usecase = PreviewUseCase::new(
            Arc::new(campaigns),
            Arc::new(MockLeadRepository::new()),
            Arc::new(QuotaUseCase::new(
                Arc::new(usage_with_count(25)),
                Arc::new(free_user_repository(user_id)),
            )),
            Arc::new(ContentGeneratorUseCase::new(Arc::new(
                MockTextGenerationClient::new(),
            ))),
        );

        let outcome = usecase
            .preview(
                user_id,
                Uuid::new_v4(),
                PreviewRequest {
                    lead_id: Some(Uuid::new_v4()),
                    tone: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(
            outcome,
            Gated::QuotaExceeded {
                plan: Plan::Free,
                limit: 25
            }
        );
    }

    #[tokio::test]
    async fn missing_lead_reference_is_an_error() {
        let user_id = Uuid::new_v4();
        let campaign_id = Uuid::new_v4();

        let mut campaigns = MockCampaignRepository::new();
        campaigns
            .expect_find_by_id_and_user_id()
            .returning(move |id, uid| {
                let campaign = sample_campaign(id, uid, "professional");
                Box::pin(async move { Ok(Some(campaign)) })
            });

        let mut leads = MockLeadRepository::new();
        leads.expect_find_by_id_and_campaign_id().never();

        let usecase = PreviewUseCase::new(
            Arc::new(campaigns),
            Arc::new(leads),
            Arc::new(QuotaUseCase::new(
                Arc::new(usage_with_count(0)),
                Arc::new(free_user_repository(user_id)),
            )),
            Arc::new(ContentGeneratorUseCase::new(Arc::new(
                MockTextGenerationClient::new(),
            ))),
        );

        let error = usecase
            .preview(
                user_id,
                campaign_id,
                PreviewRequest {
                    lead_id: None,
                    tone: None,
                },
            )
            .await
            .unwrap_err()
            .to_string();
        assert!(error.contains("Lead not found"));
    }

    #[tokio::test]
    async fn request_tone_overrides_the_campaign_tone() {
        let user_id = Uuid::new_v4();
        let campaign_id = Uuid::new_v4();
        let lead_id = Uuid::new_v4();

        let mut campaigns = MockCampaignRepository::new();
        campaigns
            .expect_find_by_id_and_user_id()
            .returning(move |id, uid| {
                let campaign = sample_campaign(id, uid, "professional");
                Box::pin(async move { Ok(Some(campaign)) })
            });

        let mut leads = MockLeadRepository::new();
        leads
            .expect_find_by_id_and_campaign_id()
            .returning(move |id, cid| {
                let lead = sample_lead(id, cid);
                Box::pin(async move { Ok(Some(lead)) })
            });

        let mut text_client = MockTextGenerationClient::new();
        text_client
            .expect_generate()
            .withf(|prompt, _, _| prompt.contains("Tone: casual"))
            .returning(|_, max_tokens, _| {
                Box::pin(async move {
                    Ok(if max_tokens == 100 {
                        r#"["One", "Two", "Three"]"#.to_string()
                    } else {
                        "Generated body.".to_string()
                    })
                })
            });

        let mut usage = usage_with_count(0);
        usage
            .expect_append()
            .returning(|_| Box::pin(async { Ok(()) }));

        let usecase = PreviewUseCase::new(
            Arc::new(campaigns),
            Arc::new(leads),
            Arc::new(QuotaUseCase::new(
                Arc::new(usage),
                Arc::new(free_user_repository(user_id)),
            )),
            Arc::new(ContentGeneratorUseCase::new(Arc::new(text_client))),
        );

        let outcome = usecase
            .preview(
                user_id,
                campaign_id,
                PreviewRequest {
                    lead_id: Some(lead_id),
                    tone: Some("casual".to_string()),
                },
            )
            .await
            .unwrap();
        assert!(matches!(outcome, Gated::Granted(_)));
    }

    #[tokio::test]
    async fn preview_meters_one_generation() {
        let user_id = Uuid::new_v4();
        let campaign_id = Uuid::new_v4();
        let lead_id = Uuid::new_v4();

        let mut campaigns = MockCampaignRepository::new();
        campaigns
            .expect_find_by_id_and_user_id()
            .returning(move |id, uid| {
                let campaign = sample_campaign(id, uid, "professional");
                Box::pin(async move { Ok(Some(campaign)) })
            });

        let mut leads = MockLeadRepository::new();
        leads
            .expect_find_by_id_and_campaign_id()
            .returning(move |id, cid| {
                let lead = sample_lead(id, cid);
                Box::pin(async move { Ok(Some(lead)) })
            });

        let mut usage = usage_with_count(3);
        usage
            .expect_append()
            .withf(move |entity| {
                entity.user_id == user_id
                    && entity.action_type == "email_generated"
                    && entity.campaign_id == Some(campaign_id)
            })
            .times(1)
            .returning(|_| Box::pin(async { Ok(()) }));

        let usecase = PreviewUseCase::new(
            Arc::new(campaigns),
            Arc::new(leads),
            Arc::new(QuotaUseCase::new(
                Arc::new(usage),
                Arc::new(free_user_repository(user_id)),
            )),
            Arc::new(ContentGeneratorUseCase::new(Arc::new(canned_text_client()))),
        );

        let outcome = usecase
            .preview(
                user_id,
                campaign_id,
                PreviewRequest {
                    lead_id: Some(lead_id),
                    tone: None,
                },
            )
            .await
            .unwrap();

        let Gated::Granted(preview) = outcome else {
            panic!("expected a granted preview");
        };
        assert_eq!(preview.subjects.len(), 3);
        assert_eq!(preview.follow_ups.len(), 3);
    }
}
