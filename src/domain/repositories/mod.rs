pub mod content_resolver;
pub mod import_repository;
