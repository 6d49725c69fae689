use anyhow::{Result, anyhow, bail};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use domain::{
    entities::campaigns::CampaignCountersUpdateEntity,
    repositories::{campaigns::CampaignRepository, leads::LeadRepository},
    value_objects::{
        campaigns::{
            CampaignDetailView, CampaignListView, CampaignModel, CreateCampaignModel,
            ListCampaignsFilter, PaginationModel,
        },
        leads::{LeadStatusTally, NewLeadModel},
    },
};

pub struct CampaignsUseCase<C, L>
where
    C: CampaignRepository + Send + Sync + 'static,
    L: LeadRepository + Send + Sync + 'static,
{
    campaign_repository: Arc<C>,
    lead_repository: Arc<L>,
}

impl<C, L> CampaignsUseCase<C, L>
where
    C: CampaignRepository + Send + Sync + 'static,
    L: LeadRepository + Send + Sync + 'static,
{
    pub fn new(campaign_repository: Arc<C>, lead_repository: Arc<L>) -> Self {
        Self {
            campaign_repository,
            lead_repository,
        }
    }

    pub async fn create_campaign(
        &self,
        user_id: Uuid,
        create_campaign_model: CreateCampaignModel,
    ) -> Result<CampaignModel> {
        if create_campaign_model.name.trim().is_empty() {
            bail!("Name is required");
        }

        let campaign_id = self
            .campaign_repository
            .create(create_campaign_model.to_entity(user_id))
            .await?;

        if let Some(leads) = &create_campaign_model.leads {
            if !leads.is_empty() {
                self.insert_leads_and_recount(campaign_id, leads).await?;
            }
        }

        info!(%user_id, %campaign_id, "campaigns: created");

        let campaign = self
            .campaign_repository
            .find_by_id_and_user_id(campaign_id, user_id)
            .await?
            .ok_or_else(|| anyhow!("Campaign not found"))?;
        Ok(campaign.into())
    }

    pub async fn list_campaigns(
        &self,
        user_id: Uuid,
        filter: ListCampaignsFilter,
    ) -> Result<CampaignListView> {
        let page = filter.resolved_page();
        let limit = filter.resolved_limit();

        let (campaigns, total) = self
            .campaign_repository
            .list_by_user_id(user_id, filter)
            .await?;

        Ok(CampaignListView {
            campaigns: campaigns.into_iter().map(CampaignModel::from).collect(),
            pagination: PaginationModel { page, limit, total },
        })
    }

    pub async fn campaign_detail(
        &self,
        user_id: Uuid,
        campaign_id: Uuid,
    ) -> Result<CampaignDetailView> {
        let campaign = self
            .campaign_repository
            .find_by_id_and_user_id(campaign_id, user_id)
            .await?
            .ok_or_else(|| anyhow!("Campaign not found"))?;

        let leads = self.lead_repository.list_by_campaign_id(campaign_id).await?;

        Ok(CampaignDetailView {
            campaign: campaign.into(),
            leads: leads.into_iter().map(Into::into).collect(),
        })
    }

    /// Appends leads to an existing campaign and returns how many were
    /// inserted.
    pub async fn add_leads(
        &self,
        user_id: Uuid,
        campaign_id: Uuid,
        leads: Vec<NewLeadModel>,
    ) -> Result<usize> {
        self.campaign_repository
            .find_by_id_and_user_id(campaign_id, user_id)
            .await?
            .ok_or_else(|| anyhow!("Campaign not found"))?;

        if leads.is_empty() {
            bail!("Leads array is required");
        }

        let inserted = self.insert_leads_and_recount(campaign_id, &leads).await?;
        info!(%user_id, %campaign_id, inserted, "campaigns: leads added");
        Ok(inserted)
    }

    async fn insert_leads_and_recount(
        &self,
        campaign_id: Uuid,
        leads: &[NewLeadModel],
    ) -> Result<usize> {
        let insert_lead_entities = leads
            .iter()
            .map(|lead| lead.to_entity(campaign_id))
            .collect();
        let inserted = self.lead_repository.bulk_insert(insert_lead_entities).await?;

        let counts = self
            .lead_repository
            .status_counts_by_campaign_id(campaign_id)
            .await?;
        let tally = LeadStatusTally::from_counts(&counts);

        self.campaign_repository
            .update_counters(
                campaign_id,
                CampaignCountersUpdateEntity {
                    total_leads: Some(tally.total as i32),
                    sent_count: None,
                    opened_count: None,
                    clicked_count: None,
                    replied_count: None,
                    status: None,
                    started_at: None,
                    updated_at: Utc::now(),
                },
            )
            .await?;

        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{
        entities::campaigns::CampaignEntity,
        repositories::{campaigns::MockCampaignRepository, leads::MockLeadRepository},
        value_objects::enums::campaign_statuses::CampaignStatus,
    };

    fn sample_campaign(id: Uuid, user_id: Uuid, name: &str) -> CampaignEntity {
        let now = Utc::now();
        CampaignEntity {
            id,
            user_id,
            name: name.to_string(),
            subject_template: None,
            body_template: None,
            tone: "professional".to_string(),
            status: CampaignStatus::Draft.to_string(),
            total_leads: 0,
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

    fn new_lead(email: &str) -> NewLeadModel {
        NewLeadModel {
            email: email.to_string(),
            first_name: None,
            last_name: None,
            company: None,
            title: None,
            custom_fields: None,
        }
    }

    #[tokio::test]
    async fn create_requires_a_name() {
        let mut campaigns = MockCampaignRepository::new();
        campaigns.expect_create().never();

        let usecase = CampaignsUseCase::new(Arc::new(campaigns), Arc::new(MockLeadRepository::new()));

        let error = usecase
            .create_campaign(
                Uuid::new_v4(),
                CreateCampaignModel {
                    name: "   ".to_string(),
                    subject_template: None,
                    body_template: None,
                    tone: None,
                    leads: None,
                },
            )
            .await
            .unwrap_err()
            .to_string();
        assert!(error.contains("Name is required"));
    }

    #[tokio::test]
    async fn create_with_inline_leads_recounts_the_total() {
        let user_id = Uuid::new_v4();
        let campaign_id = Uuid::new_v4();

        let mut campaigns = MockCampaignRepository::new();
        campaigns
            .expect_create()
            .withf(|entity| entity.name == "Q3 launch" && entity.tone == "professional")
            .returning(move |_| Box::pin(async move { Ok(campaign_id) }));
        campaigns
            .expect_update_counters()
            .withf(|_, update| update.total_leads == Some(2) && update.sent_count.is_none())
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));
        campaigns
            .expect_find_by_id_and_user_id()
            .returning(move |id, uid| {
                let campaign = sample_campaign(id, uid, "Q3 launch");
                Box::pin(async move { Ok(Some(campaign)) })
            });

        let mut leads = MockLeadRepository::new();
        leads
            .expect_bulk_insert()
            .withf(|entities| entities.len() == 2 && entities[0].status == "pending")
            .returning(|entities| {
                let inserted = entities.len();
                Box::pin(async move { Ok(inserted) })
            });
        leads.expect_status_counts_by_campaign_id().returning(|_| {
            Box::pin(async { Ok(vec![("pending".to_string(), 2)]) })
        });

        let usecase = CampaignsUseCase::new(Arc::new(campaigns), Arc::new(leads));

        let campaign = usecase
            .create_campaign(
                user_id,
                CreateCampaignModel {
                    name: "Q3 launch".to_string(),
                    subject_template: None,
                    body_template: None,
                    tone: None,
                    leads: Some(vec![new_lead("a@acme.io"), new_lead("b@acme.io")]),
                },
            )
            .await
            .unwrap();
        assert_eq!(campaign.name, "Q3 launch");
    }

    #[tokio::test]
    async fn create_without_leads_skips_the_recount() {
        let user_id = Uuid::new_v4();
        let campaign_id = Uuid::new_v4();

        let mut campaigns = MockCampaignRepository::new();
        campaigns
            .expect_create()
            .returning(move |_| Box::pin(async move { Ok(campaign_id) }));
        campaigns.expect_update_counters().never();
        campaigns
            .expect_find_by_id_and_user_id()
            .returning(move |id, uid| {
                let campaign = sample_campaign(id, uid, "Bare");
                Box::pin(async move { Ok(Some(campaign)) })
            });

        let mut leads = MockLeadRepository::new();
        leads.expect_bulk_insert().never();

        let usecase = CampaignsUseCase::new(Arc::new(campaigns), Arc::new(leads));

        let campaign = usecase
            .create_campaign(
                user_id,
                CreateCampaignModel {
                    name: "Bare".to_string(),
                    subject_template: None,
                    body_template: None,
                    tone: Some("casual".to_string()),
                    leads: Some(Vec::new()),
                },
            )
            .await
            .unwrap();
        assert_eq!(campaign.name, "Bare");
    }

    #[tokio::test]
    async fn list_echoes_resolved_pagination() {
        let user_id = Uuid::new_v4();

        let mut campaigns = MockCampaignRepository::new();
        campaigns.expect_list_by_user_id().returning(move |uid, _| {
            let rows = vec![sample_campaign(Uuid::new_v4(), uid, "Only one")];
            Box::pin(async move { Ok((rows, 41)) })
        });

        let usecase = CampaignsUseCase::new(Arc::new(campaigns), Arc::new(MockLeadRepository::new()));

        let view = usecase
            .list_campaigns(
                user_id,
                ListCampaignsFilter {
                    status: None,
                    page: None,
                    limit: Some(200),
                },
            )
            .await
            .unwrap();

        assert_eq!(view.campaigns.len(), 1);
        assert_eq!(
            view.pagination,
            PaginationModel {
                page: 1,
                limit: 100,
                total: 41
            }
        );
    }

    #[tokio::test]
    async fn detail_requires_ownership() {
        let mut campaigns = MockCampaignRepository::new();
        campaigns
            .expect_find_by_id_and_user_id()
            .returning(|_, _| Box::pin(async { Ok(None) }));

        let mut leads = MockLeadRepository::new();
        leads.expect_list_by_campaign_id().never();

        let usecase = CampaignsUseCase::new(Arc::new(campaigns), Arc::new(leads));

        let error = usecase
            .campaign_detail(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err()
            .to_string();
        assert!(error.contains("Campaign not found"));
    }

    #[tokio::test]
    async fn add_leads_rejects_an_empty_batch() {
        let user_id = Uuid::new_v4();
        let campaign_id = Uuid::new_v4();

        let mut campaigns = MockCampaignRepository::new();
        campaigns
            .expect_find_by_id_and_user_id()
            .returning(move |id, uid| {
                let campaign = sample_campaign(id, uid, "Q3 launch");
                Box::pin(async move { Ok(Some(campaign)) })
            });

        let mut leads = MockLeadRepository::new();
        leads.expect_bulk_insert().never();

        let usecase = CampaignsUseCase::new(Arc::new(campaigns), Arc::new(leads));

        let error = usecase
            .add_leads(user_id, campaign_id, Vec::new())
            .await
            .unwrap_err()
            .to_string();
        assert!(error.contains("Leads array is required"));
    }

    #[tokio::test]
    async fn add_leads_inserts_and_recounts() {
        let user_id = Uuid::new_v4();
        let campaign_id = Uuid::new_v4();

        let mut campaigns = MockCampaignRepository::new();
        campaigns
            .expect_find_by_id_and_user_id()
            .returning(move |id, uid| {
                let campaign = sample_campaign(id, uid, "Q3 launch");
                Box::pin(async move { Ok(Some(campaign)) })
            });
        campaigns
            .expect_update_counters()
            .withf(|_, update| update.total_leads == Some(5))
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let mut leads = MockLeadRepository::new();
        leads
            .expect_bulk_insert()
            .withf(|entities| entities.len() == 3)
            .returning(|entities| {
                let inserted = entities.len();
                Box::pin(async move { Ok(inserted) })
            });
        leads.expect_status_counts_by_campaign_id().returning(|_| {
            Box::pin(async {
                Ok(vec![("pending".to_string(), 4), ("sent".to_string(), 1)])
            })
        });

        let usecase = CampaignsUseCase::new(Arc::new(campaigns), Arc::new(leads));

        let inserted = usecase
            .add_leads(
                user_id,
                campaign_id,
                vec![new_lead("a@acme.io"), new_lead("b@acme.io"), new_lead("c@acme.io")],
            )
            .await
            .unwrap();
        assert_eq!(inserted, 3);
    }
}
