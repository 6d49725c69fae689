pub mod campaigns;
pub mod email;
pub mod events;
pub mod leads;
pub mod messages;
pub mod settings;
pub mod text_generation;
pub mod usage;
pub mod users;
