// src/util/testing.rs
//! Test doubles and environment helpers shared by unit and integration tests.

use std::env;
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, OnceLock};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::view::ImportView;
use crate::domain::bookmark_data::BookmarkData;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::import_source::{ImportIntent, ImportSource};
use crate::domain::repositories::content_resolver::ContentResolver;
use crate::domain::repositories::import_repository::{BookmarkImporter, ImportSummary};
use crate::domain::services::permission::PermissionGateway;
use crate::domain::services::preferences::PreferenceStore;

/// Environment variables read by `config::load_settings`
pub const SETTINGS_ENV_VARS: [&str; 4] = [
    "BKIMPORT_DB_URL",
    "BKIMPORT_STATE_FILE",
    "BKIMPORT_PRIVATE_DIR",
    "BKIMPORT_STORAGE_PERMISSION",
];

/// How long async test helpers wait for the presenter before giving up
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

static TEST_LOGGING: OnceLock<()> = OnceLock::new();

/// Initializes test logging exactly once.
pub fn init_test_env() -> &'static () {
    TEST_LOGGING.get_or_init(|| {
        setup_test_logging();
        info!("Test environment initialized");
    })
}

/// Logging setup only runs once; subsequent calls do nothing if `tracing` is already set.
fn setup_test_logging() {
    debug!("Attempting logger init from testing.rs");
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
        return;
    }

    let noisy_modules = ["mio", "diesel", "r2d2"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    subscriber.try_init().unwrap_or_else(|e| {
        eprintln!("Error: Failed to set up logging: {}", e);
    });
}

/// Restores the settings environment variables on drop
#[derive(Debug, Clone)]
pub struct EnvGuard {
    saved: Vec<(&'static str, Option<String>)>,
}

impl Default for EnvGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvGuard {
    pub fn new() -> Self {
        Self {
            saved: SETTINGS_ENV_VARS
                .iter()
                .map(|name| (*name, env::var(name).ok()))
                .collect(),
        }
    }

    /// Removes every settings variable from the process environment
    pub fn clear() {
        for name in SETTINGS_ENV_VARS {
            env::remove_var(name);
        }
    }
}

impl Drop for EnvGuard {
    #[instrument(level = "trace")]
    fn drop(&mut self) {
        for (name, value) in &self.saved {
            match value {
                Some(val) => env::set_var(name, val),
                None => env::remove_var(name),
            }
        }
    }
}

/// Blocks background work until the test opens it.
#[derive(Debug, Default)]
pub struct Gate {
    open: Mutex<bool>,
    signal: Condvar,
}

impl Gate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn open(&self) {
        if let Ok(mut open) = self.open.lock() {
            *open = true;
            self.signal.notify_all();
        }
    }

    /// Waits until opened or `EVENT_TIMEOUT` elapses
    pub fn wait(&self) {
        let Ok(guard) = self.open.lock() else {
            return;
        };
        let _ = self
            .signal
            .wait_timeout_while(guard, EVENT_TIMEOUT, |open| !*open);
    }
}

#[derive(Debug, Clone)]
enum Scripted {
    Bytes(Vec<u8>),
    Absent,
    Failure(io::ErrorKind),
}

impl Scripted {
    fn failure(&self) -> Option<io::Error> {
        match self {
            Scripted::Failure(kind) => Some(io::Error::new(*kind, "scripted failure")),
            _ => None,
        }
    }
}

/// `ContentResolver` answering from a script and counting calls.
#[derive(Debug)]
pub struct ScriptedContentResolver {
    descriptor: Scripted,
    stream: Scripted,
    gate: Option<Arc<Gate>>,
    descriptor_calls: AtomicUsize,
    stream_calls: AtomicUsize,
    open_streams: Arc<AtomicUsize>,
}

impl Default for ScriptedContentResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedContentResolver {
    /// Both primitives fail with `NotFound` until scripted otherwise
    pub fn new() -> Self {
        Self {
            descriptor: Scripted::Failure(io::ErrorKind::NotFound),
            stream: Scripted::Failure(io::ErrorKind::NotFound),
            gate: None,
            descriptor_calls: AtomicUsize::new(0),
            stream_calls: AtomicUsize::new(0),
            open_streams: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_descriptor_bytes(mut self, bytes: &[u8]) -> Self {
        self.descriptor = Scripted::Bytes(bytes.to_vec());
        self
    }

    /// Descriptor outside the default access scope
    pub fn with_descriptor_failure(mut self) -> Self {
        self.descriptor = Scripted::Failure(io::ErrorKind::PermissionDenied);
        self
    }

    pub fn with_descriptor_absent(mut self) -> Self {
        self.descriptor = Scripted::Absent;
        self
    }

    pub fn with_stream_bytes(mut self, bytes: &[u8]) -> Self {
        self.stream = Scripted::Bytes(bytes.to_vec());
        self
    }

    pub fn with_stream_failure(mut self) -> Self {
        self.stream = Scripted::Failure(io::ErrorKind::Other);
        self
    }

    pub fn with_stream_absent(mut self) -> Self {
        self.stream = Scripted::Absent;
        self
    }

    /// Every open blocks until the gate is opened
    pub fn with_gate(mut self, gate: Arc<Gate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn descriptor_calls(&self) -> usize {
        self.descriptor_calls.load(Ordering::SeqCst)
    }

    pub fn stream_calls(&self) -> usize {
        self.stream_calls.load(Ordering::SeqCst)
    }

    /// Streams handed out and not yet dropped
    pub fn open_streams(&self) -> usize {
        self.open_streams.load(Ordering::SeqCst)
    }

    fn wait_for_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.wait();
        }
    }
}

impl ContentResolver for ScriptedContentResolver {
    fn open_file_descriptor(&self, source: &ImportSource) -> io::Result<Option<File>> {
        self.descriptor_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_for_gate();
        debug!(%source, "Scripted descriptor open");

        if let Some(e) = self.descriptor.failure() {
            return Err(e);
        }
        match &self.descriptor {
            Scripted::Bytes(bytes) => {
                let mut file = tempfile::tempfile()?;
                file.write_all(bytes)?;
                file.seek(SeekFrom::Start(0))?;
                Ok(Some(file))
            }
            _ => Ok(None),
        }
    }

    fn open_input_stream(
        &self,
        source: &ImportSource,
    ) -> io::Result<Option<Box<dyn Read + Send>>> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_for_gate();
        debug!(%source, "Scripted stream open");

        if let Some(e) = self.stream.failure() {
            return Err(e);
        }
        match &self.stream {
            Scripted::Bytes(bytes) => {
                self.open_streams.fetch_add(1, Ordering::SeqCst);
                Ok(Some(Box::new(TrackedReader {
                    inner: Cursor::new(bytes.clone()),
                    open_streams: self.open_streams.clone(),
                })))
            }
            _ => Ok(None),
        }
    }
}

struct TrackedReader {
    inner: Cursor<Vec<u8>>,
    open_streams: Arc<AtomicUsize>,
}

impl Read for TrackedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Drop for TrackedReader {
    fn drop(&mut self) {
        self.open_streams.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Everything an `ImportView` can be asked to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Error,
    PermissionsError,
    Confirmation(Option<BookmarkData>),
    ImportComplete,
}

/// `ImportView` that records every call in order.
#[derive(Debug)]
pub struct RecordingView {
    intent: Mutex<ImportIntent>,
    showing_dialog: AtomicBool,
    intent_reads: AtomicUsize,
    events: Mutex<Vec<ViewEvent>>,
    events_tx: mpsc::UnboundedSender<ViewEvent>,
    events_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<ViewEvent>>,
}

impl RecordingView {
    pub fn new(intent: ImportIntent) -> Arc<Self> {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            intent: Mutex::new(intent),
            showing_dialog: AtomicBool::new(false),
            intent_reads: AtomicUsize::new(0),
            events: Mutex::new(Vec::new()),
            events_tx,
            events_rx: tokio::sync::Mutex::new(events_rx),
        })
    }

    pub fn with_locator(locator: &str) -> Arc<Self> {
        let source = ImportSource::parse(locator).unwrap_or_else(|e| panic!("{}: {}", locator, e));
        Self::new(ImportIntent::with_data(source))
    }

    pub fn set_showing_dialog(&self, showing: bool) {
        self.showing_dialog.store(showing, Ordering::SeqCst);
    }

    pub fn intent_reads(&self) -> usize {
        self.intent_reads.load(Ordering::SeqCst)
    }

    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Next event not yet consumed by this method, `None` on timeout
    pub async fn next_event(&self) -> Option<ViewEvent> {
        let mut rx = self.events_rx.lock().await;
        tokio::time::timeout(EVENT_TIMEOUT, rx.recv())
            .await
            .ok()
            .flatten()
    }

    fn record(&self, event: ViewEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
        let _ = self.events_tx.send(event);
    }
}

impl ImportView for RecordingView {
    fn pending_intent(&self) -> ImportIntent {
        self.intent_reads.fetch_add(1, Ordering::SeqCst);
        self.intent
            .lock()
            .map(|i| i.clone())
            .unwrap_or_else(|_| ImportIntent::empty())
    }

    fn is_showing_confirmation_dialog(&self) -> bool {
        self.showing_dialog.load(Ordering::SeqCst)
    }

    fn show_error(&self) {
        self.record(ViewEvent::Error);
    }

    fn show_permissions_error(&self) {
        self.record(ViewEvent::PermissionsError);
    }

    fn show_import_confirmation_dialog(&self, data: Option<BookmarkData>) {
        self.record(ViewEvent::Confirmation(data));
    }

    fn show_import_complete(&self) {
        self.record(ViewEvent::ImportComplete);
    }
}

/// Scriptable `PermissionGateway` that records requests
#[derive(Debug)]
pub struct FakePermissionGateway {
    granted: AtomicBool,
    can_request: AtomicBool,
    has_calls: AtomicUsize,
    requests: Mutex<Vec<i32>>,
}

impl FakePermissionGateway {
    /// Not granted, but the user can still be asked
    pub fn askable() -> Arc<Self> {
        Arc::new(Self::with(false, true))
    }

    pub fn granted() -> Arc<Self> {
        Arc::new(Self::with(true, true))
    }

    pub fn permanently_denied() -> Arc<Self> {
        Arc::new(Self::with(false, false))
    }

    fn with(granted: bool, can_request: bool) -> Self {
        Self {
            granted: AtomicBool::new(granted),
            can_request: AtomicBool::new(can_request),
            has_calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn set_granted(&self, granted: bool) {
        self.granted.store(granted, Ordering::SeqCst);
    }

    pub fn has_calls(&self) -> usize {
        self.has_calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<i32> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl PermissionGateway for FakePermissionGateway {
    fn has_storage_write_permission(&self) -> bool {
        self.has_calls.fetch_add(1, Ordering::SeqCst);
        self.granted.load(Ordering::SeqCst)
    }

    fn can_request_storage_write_permission(&self) -> bool {
        self.can_request.load(Ordering::SeqCst)
    }

    fn request_permission(&self, request_id: i32) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request_id);
        }
    }
}

/// `BookmarkImporter` that counts everything as added, optionally gated
#[derive(Debug, Default)]
pub struct GatedImporter {
    gate: Option<Arc<Gate>>,
    fail: bool,
    imported: Mutex<Vec<BookmarkData>>,
}

impl GatedImporter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn gated(gate: Arc<Gate>) -> Arc<Self> {
        Arc::new(Self {
            gate: Some(gate),
            ..Self::default()
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn imported(&self) -> Vec<BookmarkData> {
        self.imported.lock().map(|i| i.clone()).unwrap_or_default()
    }
}

impl BookmarkImporter for GatedImporter {
    fn import_bookmarks(&self, data: &BookmarkData) -> DomainResult<ImportSummary> {
        if let Some(gate) = &self.gate {
            gate.wait();
        }
        if self.fail {
            return Err(DomainError::Store("scripted import failure".to_string()));
        }
        if let Ok(mut imported) = self.imported.lock() {
            imported.push(data.clone());
        }
        Ok(ImportSummary {
            added: data.len(),
            updated: 0,
        })
    }
}

/// `PreferenceStore` whose write blocks on a gate, like a slow disk
#[derive(Debug)]
pub struct GatedPreferenceStore {
    gate: Arc<Gate>,
    presented: AtomicBool,
    writes: AtomicUsize,
}

impl GatedPreferenceStore {
    pub fn new(gate: Arc<Gate>) -> Arc<Self> {
        Arc::new(Self {
            gate,
            presented: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        })
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl PreferenceStore for GatedPreferenceStore {
    fn is_permission_dialog_presented(&self) -> bool {
        self.presented.load(Ordering::SeqCst)
    }

    fn set_permission_dialog_presented(&self) -> DomainResult<()> {
        self.gate.wait();
        self.presented.store(true, Ordering::SeqCst);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn given_modified_env_when_guard_dropped_then_restored() {
        let _ = init_test_env();
        env::set_var("BKIMPORT_DB_URL", "/tmp/original.db");
        {
            let _guard = EnvGuard::new();
            EnvGuard::clear();
            env::set_var("BKIMPORT_DB_URL", "/tmp/changed.db");
        }
        assert_eq!(env::var("BKIMPORT_DB_URL").unwrap(), "/tmp/original.db");
        env::remove_var("BKIMPORT_DB_URL");
    }

    #[test]
    fn given_tracked_stream_when_dropped_then_open_count_returns_to_zero() {
        let resolver = ScriptedContentResolver::new().with_stream_bytes(b"x");
        let source = ImportSource::parse("file:///tmp/x.json").unwrap();

        let stream = resolver.open_input_stream(&source).unwrap();
        assert_eq!(resolver.open_streams(), 1);
        drop(stream);
        assert_eq!(resolver.open_streams(), 0);
    }
}
