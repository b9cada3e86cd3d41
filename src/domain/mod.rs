pub mod bookmark_data;
pub mod codec;
pub mod error;
pub mod import_source;
pub mod repositories;
pub mod services;
pub mod stream;
pub mod tag;
