// src/application/view.rs
use crate::domain::bookmark_data::BookmarkData;
use crate::domain::import_source::ImportIntent;
use std::sync::Arc;

/// The screen an import presenter attaches to.
///
/// All calls happen on the presenter task, one at a time. Implementations
/// must not block.
pub trait ImportView: Send + Sync {
    fn pending_intent(&self) -> ImportIntent;

    fn is_showing_confirmation_dialog(&self) -> bool;

    fn show_error(&self);

    fn show_permissions_error(&self);

    /// `None` when the locator had no content
    fn show_import_confirmation_dialog(&self, data: Option<BookmarkData>);

    fn show_import_complete(&self);
}

/// Identity comparison, ignoring vtable differences
pub(crate) fn same_view(a: &Arc<dyn ImportView>, b: &Arc<dyn ImportView>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
