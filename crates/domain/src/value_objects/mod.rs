pub mod billing;
pub mod campaigns;
pub mod email;
pub mod email_events;
pub mod enums;
pub mod generation;
pub mod leads;
pub mod send_reports;
pub mod settings;
pub mod usage;
pub mod users;
