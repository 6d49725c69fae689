use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UsageAction {
    EmailGenerated,
    EmailSent,
    ApiCall,
}

impl Display for UsageAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let action = match self {
            UsageAction::EmailGenerated => "email_generated",
            UsageAction::EmailSent => "email_sent",
            UsageAction::ApiCall => "api_call",
        };
        write!(f, "{}", action)
    }
}
