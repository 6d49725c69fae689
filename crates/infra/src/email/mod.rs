pub mod gmail_client;
pub mod sendgrid_client;
