pub mod ai_providers;
pub mod campaign_statuses;
pub mod email_channels;
pub mod event_types;
pub mod lead_statuses;
pub mod message_statuses;
pub mod message_types;
pub mod plans;
pub mod usage_actions;
