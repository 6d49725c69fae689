use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmailChannel {
    Gmail,
    Sendgrid,
}

impl Display for EmailChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let channel = match self {
            EmailChannel::Gmail => "gmail",
            EmailChannel::Sendgrid => "sendgrid",
        };
        write!(f, "{}", channel)
    }
}
