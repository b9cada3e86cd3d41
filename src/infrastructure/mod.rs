pub mod content_resolver;
pub mod di;
pub mod json_codec;
pub mod permission;
pub mod preferences;
pub mod repositories;
