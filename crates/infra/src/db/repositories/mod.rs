pub mod campaigns;
pub mod events;
pub mod leads;
pub mod messages;
pub mod settings;
pub mod usage;
pub mod users;
