pub mod billing;
pub mod campaign_send;
pub mod campaigns;
pub mod email_dispatch;
pub mod engagement;
pub mod generation;
pub mod gmail_oauth;
pub mod previews;
pub mod quota;
pub mod reply_sync;
pub mod settings;
pub mod test_sends;
pub mod tracking_links;
pub mod users;
