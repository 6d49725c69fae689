use serde::{Deserialize, Serialize};

pub const SUBJECT_COUNT: usize = 3;
pub const SUBJECT_MAX_CHARS: usize = 60;
pub const FOLLOW_UP_COUNT: u8 = 3;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FollowUpPreview {
    pub sequence: u8,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CampaignPreview {
    pub subjects: Vec<String>,
    pub body: String,
    pub follow_ups: Vec<FollowUpPreview>,
}

/// Lead fields the prompts personalize on, decoupled from the lead row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadProfile {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
}

impl LeadProfile {
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => "there".to_string(),
        }
    }
}

impl From<&crate::entities::leads::LeadEntity> for LeadProfile {
    fn from(entity: &crate::entities::leads::LeadEntity) -> Self {
        Self {
            email: entity.email.clone(),
            first_name: entity.first_name.clone(),
            last_name: entity.last_name.clone(),
            company: entity.company.clone(),
            title: entity.title.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewRequest {
    pub lead_id: Option<uuid::Uuid>,
    pub tone: Option<String>,
}
