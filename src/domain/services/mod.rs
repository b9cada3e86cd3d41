pub mod permission;
pub mod preferences;
