// src/application/mod.rs
pub mod error;
pub mod import_presenter;
pub mod services;
pub mod view;

// Re-export the presenter surface for easier imports
pub use import_presenter::{
    ImportPresenter, ImportState, PendingImportStatus, PresenterDeps, PresenterHandle,
    PresenterSnapshot,
};
pub use view::ImportView;
