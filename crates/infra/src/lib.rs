pub mod ai;
pub mod crypto;
pub mod db;
pub mod email;
