// src/cli/terminal_view.rs
use crate::application::view::ImportView;
use crate::domain::bookmark_data::BookmarkData;
use crate::domain::import_source::ImportIntent;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

/// What the presenter asked the terminal to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Error,
    PermissionsError,
    Confirm(Option<BookmarkData>),
    ImportComplete,
}

/// `ImportView` for the terminal.
///
/// Calls arrive on the presenter task and must not block, so each one is
/// forwarded to the command loop, which does the prompting.
#[derive(Debug)]
pub struct TerminalView {
    intent: ImportIntent,
    showing_dialog: AtomicBool,
    events: mpsc::UnboundedSender<UiEvent>,
}

impl TerminalView {
    pub fn new(intent: ImportIntent) -> (Arc<Self>, mpsc::UnboundedReceiver<UiEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let view = Arc::new(Self {
            intent,
            showing_dialog: AtomicBool::new(false),
            events,
        });
        (view, rx)
    }

    pub fn dismiss_dialog(&self) {
        self.showing_dialog.store(false, Ordering::SeqCst);
    }

    fn forward(&self, event: UiEvent) {
        if self.events.send(event).is_err() {
            warn!("Terminal loop is gone, dropping view event");
        }
    }
}

impl ImportView for TerminalView {
    fn pending_intent(&self) -> ImportIntent {
        self.intent.clone()
    }

    fn is_showing_confirmation_dialog(&self) -> bool {
        self.showing_dialog.load(Ordering::SeqCst)
    }

    fn show_error(&self) {
        self.forward(UiEvent::Error);
    }

    fn show_permissions_error(&self) {
        self.forward(UiEvent::PermissionsError);
    }

    fn show_import_confirmation_dialog(&self, data: Option<BookmarkData>) {
        self.showing_dialog.store(true, Ordering::SeqCst);
        self.forward(UiEvent::Confirm(data));
    }

    fn show_import_complete(&self) {
        self.forward(UiEvent::ImportComplete);
    }
}
