use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Lifecycle of a lead inside a campaign. Engagement signals may only move
/// a lead forward along `engagement_rank`; a late lower-ranked signal is
/// dropped so a reply is never downgraded by a stale open.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    Pending,
    Scheduled,
    Sent,
    Opened,
    Clicked,
    Replied,
    Bounced,
    Unsubscribed,
    Failed,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::Pending => "pending",
            LeadStatus::Scheduled => "scheduled",
            LeadStatus::Sent => "sent",
            LeadStatus::Opened => "opened",
            LeadStatus::Clicked => "clicked",
            LeadStatus::Replied => "replied",
            LeadStatus::Bounced => "bounced",
            LeadStatus::Unsubscribed => "unsubscribed",
            LeadStatus::Failed => "failed",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(LeadStatus::Pending),
            "scheduled" => Some(LeadStatus::Scheduled),
            "sent" => Some(LeadStatus::Sent),
            "opened" => Some(LeadStatus::Opened),
            "clicked" => Some(LeadStatus::Clicked),
            "replied" => Some(LeadStatus::Replied),
            "bounced" => Some(LeadStatus::Bounced),
            "unsubscribed" => Some(LeadStatus::Unsubscribed),
            "failed" => Some(LeadStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LeadStatus::Replied
                | LeadStatus::Bounced
                | LeadStatus::Unsubscribed
                | LeadStatus::Failed
        )
    }

    /// Position along the engagement funnel. Terminal failure states sit
    /// outside the funnel and rank highest so nothing overwrites them.
    pub fn engagement_rank(&self) -> u8 {
        match self {
            LeadStatus::Pending => 0,
            LeadStatus::Scheduled => 1,
            LeadStatus::Sent => 2,
            LeadStatus::Opened => 3,
            LeadStatus::Clicked => 4,
            LeadStatus::Replied => 5,
            LeadStatus::Bounced | LeadStatus::Unsubscribed | LeadStatus::Failed => 6,
        }
    }

    pub fn can_transition_to(&self, next: LeadStatus) -> bool {
        match self {
            LeadStatus::Pending | LeadStatus::Scheduled => {
                matches!(next, LeadStatus::Sent | LeadStatus::Failed)
            }
            LeadStatus::Sent => matches!(
                next,
                LeadStatus::Opened
                    | LeadStatus::Clicked
                    | LeadStatus::Replied
                    | LeadStatus::Bounced
                    | LeadStatus::Unsubscribed
                    | LeadStatus::Failed
            ),
            LeadStatus::Opened => matches!(
                next,
                LeadStatus::Clicked
                    | LeadStatus::Replied
                    | LeadStatus::Bounced
                    | LeadStatus::Unsubscribed
            ),
            LeadStatus::Clicked => {
                matches!(next, LeadStatus::Replied | LeadStatus::Unsubscribed)
            }
            LeadStatus::Replied
            | LeadStatus::Bounced
            | LeadStatus::Unsubscribed
            | LeadStatus::Failed => false,
        }
    }
}

impl Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_lead_can_only_be_sent_or_failed() {
        assert!(LeadStatus::Pending.can_transition_to(LeadStatus::Sent));
        assert!(LeadStatus::Pending.can_transition_to(LeadStatus::Failed));
        assert!(!LeadStatus::Pending.can_transition_to(LeadStatus::Opened));
        assert!(!LeadStatus::Pending.can_transition_to(LeadStatus::Replied));
    }

    #[test]
    fn replied_lead_never_regresses() {
        assert!(!LeadStatus::Replied.can_transition_to(LeadStatus::Clicked));
        assert!(!LeadStatus::Replied.can_transition_to(LeadStatus::Opened));
        assert!(!LeadStatus::Replied.can_transition_to(LeadStatus::Sent));
        assert!(LeadStatus::Replied.is_terminal());
    }

    #[test]
    fn clicked_lead_ignores_late_open() {
        assert!(!LeadStatus::Clicked.can_transition_to(LeadStatus::Opened));
        assert!(LeadStatus::Clicked.can_transition_to(LeadStatus::Replied));
    }

    #[test]
    fn engagement_rank_orders_the_funnel() {
        assert!(LeadStatus::Pending.engagement_rank() < LeadStatus::Sent.engagement_rank());
        assert!(LeadStatus::Sent.engagement_rank() < LeadStatus::Opened.engagement_rank());
        assert!(LeadStatus::Opened.engagement_rank() < LeadStatus::Clicked.engagement_rank());
        assert!(LeadStatus::Clicked.engagement_rank() < LeadStatus::Replied.engagement_rank());
    }

    #[test]
    fn status_strings_round_trip() {
        for status in [
            LeadStatus::Pending,
            LeadStatus::Sent,
            LeadStatus::Opened,
            LeadStatus::Clicked,
            LeadStatus::Replied,
            LeadStatus::Bounced,
            LeadStatus::Unsubscribed,
            LeadStatus::Failed,
        ] {
            assert_eq!(LeadStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(LeadStatus::from_str("nonsense"), None);
    }
}
