use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    #[default]
    Free,
    Pro,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Pro => "pro",
        }
    }

    /// Unknown or missing plan strings fall back to the free tier.
    pub fn from_str(value: &str) -> Self {
        match value {
            "pro" => Plan::Pro,
            _ => Plan::Free,
        }
    }

    pub fn monthly_email_limit(&self) -> i64 {
        match self {
            Plan::Free => 25,
            Plan::Pro => 10_000,
        }
    }
}

impl Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
