// src/domain/services/preferences.rs
use crate::domain::error::DomainResult;
use std::fmt::Debug;

/// Process-wide settings store for flags that outlive a single import
pub trait PreferenceStore: Send + Sync + Debug {
    fn is_permission_dialog_presented(&self) -> bool;

    fn set_permission_dialog_presented(&self) -> DomainResult<()>;
}
