use serde::{Deserialize, Serialize};

use crate::value_objects::enums::plans::Plan;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuotaStatus {
    pub allowed: bool,
    pub current_usage: i64,
    pub limit: i64,
    pub plan: Plan,
}

/// Outcome of a quota-gated operation. Handlers turn `QuotaExceeded` into
/// the 403 envelope without the usecase touching HTTP types.
#[derive(Debug, Clone, PartialEq)]
pub enum Gated<T> {
    Granted(T),
    QuotaExceeded { plan: Plan, limit: i64 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UsageSummary {
    pub emails_generated: i64,
    pub emails_sent: i64,
    pub limit: i64,
    pub remaining: i64,
    pub reset_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageView {
    pub plan: String,
    pub usage: UsageSummary,
}
