// src/application/services/mod.rs
pub mod content_resolver_adapter;
pub mod import_pipeline;

pub use content_resolver_adapter::ContentResolverAdapter;
pub use import_pipeline::ImportPipeline;
