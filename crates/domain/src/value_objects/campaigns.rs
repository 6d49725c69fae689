use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    entities::campaigns::{CampaignEntity, InsertCampaignEntity},
    value_objects::enums::campaign_statuses::CampaignStatus,
    value_objects::leads::{LeadModel, NewLeadModel},
};

pub const DEFAULT_TONE: &str = "professional";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CampaignModel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub subject_template: Option<String>,
    pub body_template: Option<String>,
    pub tone: String,
    pub status: String,
    pub total_leads: i32,
    pub sent_count: i32,
    pub opened_count: i32,
    pub clicked_count: i32,
    pub replied_count: i32,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CampaignEntity> for CampaignModel {
    fn from(entity: CampaignEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            name: entity.name,
            subject_template: entity.subject_template,
            body_template: entity.body_template,
            tone: entity.tone,
            status: entity.status,
            total_leads: entity.total_leads,
            sent_count: entity.sent_count,
            opened_count: entity.opened_count,
            clicked_count: entity.clicked_count,
            replied_count: entity.replied_count,
            scheduled_at: entity.scheduled_at,
            started_at: entity.started_at,
            completed_at: entity.completed_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCampaignModel {
    pub name: String,
    pub subject_template: Option<String>,
    pub body_template: Option<String>,
    pub tone: Option<String>,
    pub leads: Option<Vec<NewLeadModel>>,
}

impl CreateCampaignModel {
    pub fn to_entity(&self, user_id: Uuid) -> InsertCampaignEntity {
        let now = Utc::now();
        InsertCampaignEntity {
            user_id,
            name: self.name.trim().to_string(),
            subject_template: self.subject_template.clone(),
            body_template: self.body_template.clone(),
            tone: self
                .tone
                .clone()
                .unwrap_or_else(|| DEFAULT_TONE.to_string()),
            status: CampaignStatus::Draft.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ListCampaignsFilter {
    pub status: Option<CampaignStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ListCampaignsFilter {
    pub fn resolved_page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn resolved_limit(&self) -> i64 {
        self.limit.unwrap_or(10).clamp(1, 100)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaginationModel {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignListView {
    pub campaigns: Vec<CampaignModel>,
    pub pagination: PaginationModel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignDetailView {
    pub campaign: CampaignModel,
    pub leads: Vec<LeadModel>,
}

/// Engagement counters a tracker signal may bump atomically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignCounter {
    Opened,
    Clicked,
    Replied,
}
