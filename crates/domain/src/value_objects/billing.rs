use serde::{Deserialize, Serialize};

use crate::value_objects::enums::plans::Plan;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BillingAction {
    Upgrade,
    Cancel,
}

impl BillingAction {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "upgrade" => Some(BillingAction::Upgrade),
            "cancel" => Some(BillingAction::Cancel),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingActionRequest {
    pub action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillingActionView {
    pub success: bool,
    pub message: String,
    pub checkout_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillingView {
    pub plan: String,
    pub subscription_status: Option<String>,
    pub monthly_email_limit: i64,
    pub next_billing_date: Option<String>,
}

impl BillingView {
    pub fn for_plan(
        plan: Plan,
        subscription_status: Option<String>,
        next_billing_date: Option<String>,
    ) -> Self {
        Self {
            plan: plan.to_string(),
            subscription_status,
            monthly_email_limit: plan.monthly_email_limit(),
            next_billing_date,
        }
    }
}
