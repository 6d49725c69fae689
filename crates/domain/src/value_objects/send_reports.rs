use serde::{Deserialize, Serialize};

/// Batch outcome. `success` means the batch ran to completion; per-lead
/// failures are reported through `failed` and `errors`, not by flipping it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SendCampaignReport {
    pub success: bool,
    pub sent: u32,
    pub failed: u32,
    pub errors: Vec<String>,
}

impl SendCampaignReport {
    pub fn new() -> Self {
        Self {
            success: true,
            sent: 0,
            failed: 0,
            errors: Vec::new(),
        }
    }

    pub fn record_sent(&mut self) {
        self.sent += 1;
    }

    pub fn record_failure(&mut self, error: String) {
        self.failed += 1;
        self.errors.push(error);
    }

    pub fn record_stop(&mut self, reason: String) {
        self.errors.push(reason);
    }
}

impl Default for SendCampaignReport {
    fn default() -> Self {
        Self::new()
    }
}
