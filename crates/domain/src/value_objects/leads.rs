use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    entities::leads::{InsertLeadEntity, LeadEntity},
    value_objects::enums::lead_statuses::LeadStatus,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeadModel {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub custom_fields: serde_json::Value,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LeadEntity> for LeadModel {
    fn from(entity: LeadEntity) -> Self {
        Self {
            id: entity.id,
            campaign_id: entity.campaign_id,
            email: entity.email,
            first_name: entity.first_name,
            last_name: entity.last_name,
            company: entity.company,
            title: entity.title,
            custom_fields: entity.custom_fields,
            status: entity.status,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLeadModel {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub custom_fields: Option<serde_json::Value>,
}

impl NewLeadModel {
    pub fn to_entity(&self, campaign_id: Uuid) -> InsertLeadEntity {
        let now = Utc::now();
        InsertLeadEntity {
            campaign_id,
            email: self.email.trim().to_string(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            company: self.company.clone(),
            title: self.title.clone(),
            custom_fields: self
                .custom_fields
                .clone()
                .unwrap_or_else(|| serde_json::json!({})),
            status: LeadStatus::Pending.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Funnel tally derived from a grouped status scan. A lead that reached
/// `clicked` also counts as opened, a `replied` lead counts as all three.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadStatusTally {
    pub total: i64,
    pub sent: i64,
    pub reached_opened: i64,
    pub reached_clicked: i64,
    pub replied: i64,
}

impl LeadStatusTally {
    pub fn from_counts(counts: &[(String, i64)]) -> Self {
        let mut tally = LeadStatusTally::default();
        for (status, count) in counts {
            tally.total += count;
            match LeadStatus::from_str(status) {
                Some(LeadStatus::Sent) => tally.sent += count,
                Some(LeadStatus::Opened) => tally.reached_opened += count,
                Some(LeadStatus::Clicked) => {
                    tally.reached_opened += count;
                    tally.reached_clicked += count;
                }
                Some(LeadStatus::Replied) => {
                    tally.reached_opened += count;
                    tally.reached_clicked += count;
                    tally.replied += count;
                }
                _ => {}
            }
        }
        tally
    }

    /// Leads that have left the pending pool, whatever they reached after.
    pub fn delivered(&self) -> i64 {
        self.sent + self.reached_opened
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_rolls_engaged_leads_into_lower_buckets() {
        let counts = vec![
            ("pending".to_string(), 4),
            ("sent".to_string(), 3),
            ("opened".to_string(), 2),
            ("clicked".to_string(), 1),
            ("replied".to_string(), 1),
            ("failed".to_string(), 2),
        ];
        let tally = LeadStatusTally::from_counts(&counts);
        assert_eq!(tally.total, 13);
        assert_eq!(tally.sent, 3);
        assert_eq!(tally.reached_opened, 4);
        assert_eq!(tally.reached_clicked, 2);
        assert_eq!(tally.replied, 1);
        assert_eq!(tally.delivered(), 7);
    }

    #[test]
    fn tally_of_empty_scan_is_zero() {
        let tally = LeadStatusTally::from_counts(&[]);
        assert_eq!(tally, LeadStatusTally::default());
    }

    #[test]
    fn unknown_status_strings_only_count_toward_total() {
        let counts = vec![("mystery".to_string(), 5)];
        let tally = LeadStatusTally::from_counts(&counts);
        assert_eq!(tally.total, 5);
        assert_eq!(tally.sent, 0);
    }
}
