pub mod billing;
pub mod campaigns;
pub mod gmail_auth;
pub mod sendgrid_webhook;
pub mod settings;
pub mod tracking;
pub mod usage;
pub mod users;
