// src/application/import_presenter.rs
//! Import orchestration for a detachable view.
//!
//! The presenter runs as a single tokio task: every state change and every
//! call into the attached [`ImportView`] happens there, one message at a time.
//! Resolving, decoding and committing run on the blocking pool and report back
//! through an internal channel. Detaching the view never cancels that work; it
//! only suppresses delivery.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::import_pipeline::ImportPipeline;
use crate::application::view::{same_view, ImportView};
use crate::domain::bookmark_data::BookmarkData;
use crate::domain::error::{DomainError, DomainResult, UserFacingError};
use crate::domain::import_source::ImportSource;
use crate::domain::repositories::import_repository::{BookmarkImporter, ImportSummary};
use crate::domain::services::permission::{PermissionGateway, REQUEST_STORAGE_WRITE_PERMISSION};
use crate::domain::services::preferences::PreferenceStore;
use crate::domain::stream::AccessStrategy;
use std::fmt;
use std::io;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinError;
use tracing::{debug, error, info, instrument, warn};

/// Externally visible phase of the presenter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportState {
    Idle,
    ResolvingViaDirectDescriptor,
    ResolvingViaExternalStream,
    AwaitingPermission,
    ImportingConfirmedData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingImportStatus {
    None,
    Running,
    CompletedUndelivered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenterSnapshot {
    pub state: ImportState,
    pub attached: bool,
    pub requesting_permissions: bool,
    pub pending_import: PendingImportStatus,
}

/// Collaborators injected into the presenter
#[derive(Debug, Clone)]
pub struct PresenterDeps {
    pub pipeline: ImportPipeline,
    pub importer: Arc<dyn BookmarkImporter>,
    pub permissions: Arc<dyn PermissionGateway>,
    pub preferences: Arc<dyn PreferenceStore>,
}

enum Command {
    Bind(Arc<dyn ImportView>),
    Unbind(Arc<dyn ImportView>),
    ImportData(BookmarkData),
    PermissionResult { request_id: i32, granted: bool },
    Snapshot(oneshot::Sender<PresenterSnapshot>),
    Shutdown,
}

enum TaskResult {
    Parsed {
        attempt: u64,
        source: ImportSource,
        strategy: AccessStrategy,
        result: DomainResult<Option<BookmarkData>>,
    },
    Imported {
        operation: u64,
        result: DomainResult<ImportSummary>,
    },
}

enum Phase {
    Idle,
    Resolving { attempt: u64, strategy: AccessStrategy },
    AwaitingPermission { source: ImportSource },
}

enum PendingStatus {
    Running,
    Completed(DomainResult<ImportSummary>),
}

struct PendingImport {
    operation: u64,
    status: PendingStatus,
}

/// Cheap, cloneable entry point to a running presenter
#[derive(Clone)]
pub struct PresenterHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl fmt::Debug for PresenterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresenterHandle")
            .field("running", &!self.commands.is_closed())
            .finish()
    }
}

impl PresenterHandle {
    /// Attach a view. Inspects its pending intent unless a confirmation
    /// dialog is showing or a permission request is in flight.
    pub fn bind(&self, view: Arc<dyn ImportView>) -> ApplicationResult<()> {
        self.send(Command::Bind(view))
    }

    /// Detach a view; ignored if a different view is attached
    pub fn unbind(&self, view: Arc<dyn ImportView>) -> ApplicationResult<()> {
        self.send(Command::Unbind(view))
    }

    /// Commit data the user confirmed. Replaces any pending import.
    pub fn import_data(&self, data: BookmarkData) -> ApplicationResult<()> {
        self.send(Command::ImportData(data))
    }

    pub fn on_permission_result(&self, request_id: i32, granted: bool) -> ApplicationResult<()> {
        self.send(Command::PermissionResult {
            request_id,
            granted,
        })
    }

    /// Round-trips through the presenter task, so every command sent before
    /// has been handled when this returns.
    pub async fn snapshot(&self) -> ApplicationResult<PresenterSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx))?;
        rx.await.map_err(|_| ApplicationError::PresenterGone)
    }

    pub async fn state(&self) -> ApplicationResult<ImportState> {
        Ok(self.snapshot().await?.state)
    }

    /// Stops the presenter task. Background work already started still
    /// finishes, but its results are dropped.
    pub fn shutdown(&self) -> ApplicationResult<()> {
        self.send(Command::Shutdown)
    }

    fn send(&self, command: Command) -> ApplicationResult<()> {
        self.commands
            .send(command)
            .map_err(|_| ApplicationError::PresenterGone)
    }
}

pub struct ImportPresenter {
    deps: PresenterDeps,
    view: Option<Arc<dyn ImportView>>,
    requesting_permissions: bool,
    dialog_flag_marked: bool,
    phase: Phase,
    pending_import: Option<PendingImport>,
    next_id: u64,
    results_tx: mpsc::UnboundedSender<TaskResult>,
}

impl ImportPresenter {
    /// Start the presenter task on the current tokio runtime.
    ///
    /// The task ends once every handle has been dropped.
    pub fn spawn(deps: PresenterDeps) -> PresenterHandle {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (results_tx, results_rx) = mpsc::unbounded_channel();

        let presenter = ImportPresenter {
            deps,
            view: None,
            requesting_permissions: false,
            dialog_flag_marked: false,
            phase: Phase::Idle,
            pending_import: None,
            next_id: 0,
            results_tx,
        };
        tokio::spawn(presenter.run(commands_rx, results_rx));

        PresenterHandle {
            commands: commands_tx,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut results: mpsc::UnboundedReceiver<TaskResult>,
    ) {
        debug!("Import presenter started");
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some(result) = results.recv() => self.handle_result(result),
            }
        }
        debug!("Import presenter stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Bind(view) => self.bind(view),
            Command::Unbind(view) => self.unbind(view),
            Command::ImportData(data) => self.import_data(data),
            Command::PermissionResult {
                request_id,
                granted,
            } => self.on_permission_result(request_id, granted),
            Command::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            Command::Shutdown => {}
        }
    }

    fn handle_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::Parsed {
                attempt,
                source,
                strategy,
                result,
            } => self.on_parsed(attempt, source, strategy, result),
            TaskResult::Imported { operation, result } => self.on_imported(operation, result),
        }
    }

    #[instrument(skip_all, level = "debug")]
    fn bind(&mut self, view: Arc<dyn ImportView>) {
        self.view = Some(view.clone());

        if self.pending_import.is_some() {
            self.redeliver_pending_import();
            return;
        }
        if view.is_showing_confirmation_dialog() || self.requesting_permissions {
            debug!(
                requesting_permissions = self.requesting_permissions,
                "Skipping intent inspection on reattach"
            );
            return;
        }
        if let Phase::Resolving { strategy, .. } = self.phase {
            debug!("Resolution via {} already in flight", strategy);
            return;
        }
        self.handle_intent(AccessStrategy::DirectDescriptor);
    }

    fn unbind(&mut self, view: Arc<dyn ImportView>) {
        if self.view.as_ref().is_some_and(|current| same_view(current, &view)) {
            debug!("View detached");
            self.view = None;
        }
    }

    fn handle_intent(&mut self, strategy: AccessStrategy) {
        self.requesting_permissions = false;
        let Some(view) = self.view.clone() else {
            return;
        };

        let intent = view.pending_intent();
        match intent.locator() {
            Some(source) => self.start_resolution(source.clone(), strategy),
            None => {
                self.phase = Phase::Idle;
                Self::show_failure(view.as_ref(), &DomainError::NoLocator);
            }
        }
    }

    fn start_resolution(&mut self, source: ImportSource, strategy: AccessStrategy) {
        let attempt = self.next_id();
        debug!(attempt, %source, %strategy, "Resolving import source");
        self.phase = Phase::Resolving { attempt, strategy };

        let pipeline = self.deps.pipeline.clone();
        let results = self.results_tx.clone();
        tokio::spawn(async move {
            let task_source = source.clone();
            let result = tokio::task::spawn_blocking(move || {
                pipeline.resolve_and_decode(&task_source, strategy)
            })
            .await
            .unwrap_or_else(|e| Err(background_failure(e)));

            let _ = results.send(TaskResult::Parsed {
                attempt,
                source,
                strategy,
                result,
            });
        });
    }

    fn on_parsed(
        &mut self,
        attempt: u64,
        source: ImportSource,
        strategy: AccessStrategy,
        result: DomainResult<Option<BookmarkData>>,
    ) {
        match self.phase {
            Phase::Resolving { attempt: current, .. } if current == attempt => {}
            _ => {
                debug!(attempt, "Dropping result of superseded resolution");
                return;
            }
        }
        self.phase = Phase::Idle;

        let Some(view) = self.view.clone() else {
            debug!(attempt, "No view attached, dropping resolution result");
            return;
        };

        match (strategy, result) {
            (_, Ok(data)) => view.show_import_confirmation_dialog(data),
            (AccessStrategy::DirectDescriptor, Err(e)) => {
                warn!("Direct descriptor failed for {}: {}", source, e);
                self.handle_external_storage_file(source);
            }
            (AccessStrategy::StreamCopy, Err(e)) => {
                error!("Stream copy failed for {}: {}", source, e);
                view.show_error();
            }
        }
    }

    fn handle_external_storage_file(&mut self, source: ImportSource) {
        if self.deps.permissions.has_storage_write_permission() {
            self.start_resolution(source, AccessStrategy::StreamCopy);
            return;
        }
        let Some(view) = self.view.clone() else {
            return;
        };

        if self.deps.permissions.can_request_storage_write_permission() {
            self.requesting_permissions = true;
            if !self.dialog_flag_marked
                && !self.deps.preferences.is_permission_dialog_presented()
            {
                self.dialog_flag_marked = true;
                self.persist_dialog_flag();
            }
            info!(%source, "Requesting storage permission");
            self.phase = Phase::AwaitingPermission { source };
            self.deps
                .permissions
                .request_permission(REQUEST_STORAGE_WRITE_PERMISSION);
        } else {
            Self::show_failure(view.as_ref(), &DomainError::PermissionDenied);
        }
    }

    /// The store writes to disk, so the flag is persisted on the blocking pool
    fn persist_dialog_flag(&self) {
        let preferences = self.deps.preferences.clone();
        tokio::spawn(async move {
            let result = tokio::task::spawn_blocking(move || {
                preferences.set_permission_dialog_presented()
            })
            .await
            .unwrap_or_else(|e| Err(background_failure(e)));
            if let Err(e) = result {
                warn!("Cannot persist permission dialog flag: {}", e);
            }
        });
    }

    fn on_permission_result(&mut self, request_id: i32, granted: bool) {
        if request_id != REQUEST_STORAGE_WRITE_PERMISSION {
            debug!(request_id, "Ignoring unrelated permission result");
            return;
        }
        let Phase::AwaitingPermission { source } = &self.phase else {
            debug!(granted, "No permission request in flight, ignoring result");
            return;
        };
        debug!(%source, granted, "Permission result");
        self.phase = Phase::Idle;
        self.requesting_permissions = false;

        let Some(view) = self.view.clone() else {
            return;
        };
        if granted {
            self.handle_intent(AccessStrategy::StreamCopy);
        } else {
            Self::show_failure(view.as_ref(), &DomainError::PermissionDenied);
        }
    }

    #[instrument(skip_all, fields(bookmarks = data.len()), level = "debug")]
    fn import_data(&mut self, data: BookmarkData) {
        let operation = self.next_id();
        if let Some(previous) = self.pending_import.take() {
            debug!(
                previous = previous.operation,
                operation, "Replacing pending import"
            );
        }
        self.pending_import = Some(PendingImport {
            operation,
            status: PendingStatus::Running,
        });

        let importer = self.deps.importer.clone();
        let results = self.results_tx.clone();
        tokio::spawn(async move {
            let result = tokio::task::spawn_blocking(move || importer.import_bookmarks(&data))
                .await
                .unwrap_or_else(|e| Err(background_failure(e)));
            let _ = results.send(TaskResult::Imported { operation, result });
        });
    }

    fn on_imported(&mut self, operation: u64, result: DomainResult<ImportSummary>) {
        let Some(pending) = self
            .pending_import
            .as_mut()
            .filter(|p| p.operation == operation)
        else {
            debug!(operation, "Dropping result of replaced import");
            return;
        };

        match self.view.clone() {
            Some(view) => {
                self.pending_import = None;
                Self::deliver_import(view.as_ref(), result);
            }
            None => {
                debug!(operation, "Import finished while detached, holding result");
                pending.status = PendingStatus::Completed(result);
            }
        }
    }

    /// A finished import is delivered once on the next attach; a running one
    /// is delivered when it completes.
    fn redeliver_pending_import(&mut self) {
        let Some(view) = self.view.clone() else {
            return;
        };
        match self.pending_import.take() {
            Some(PendingImport {
                status: PendingStatus::Completed(result),
                ..
            }) => Self::deliver_import(view.as_ref(), result),
            other => self.pending_import = other,
        }
    }

    fn deliver_import(view: &dyn ImportView, result: DomainResult<ImportSummary>) {
        match result {
            Ok(summary) => {
                info!("Import complete: {}", summary);
                view.show_import_complete();
            }
            Err(e) => {
                error!("Import failed: {}", e);
                Self::show_failure(view, &e);
            }
        }
    }

    fn show_failure(view: &dyn ImportView, e: &DomainError) {
        match e.user_facing() {
            UserFacingError::Generic => view.show_error(),
            UserFacingError::Permissions => view.show_permissions_error(),
        }
    }

    fn snapshot(&self) -> PresenterSnapshot {
        let pending_import = match &self.pending_import {
            None => PendingImportStatus::None,
            Some(PendingImport {
                status: PendingStatus::Running,
                ..
            }) => PendingImportStatus::Running,
            Some(PendingImport {
                status: PendingStatus::Completed(_),
                ..
            }) => PendingImportStatus::CompletedUndelivered,
        };

        let state = match &self.phase {
            Phase::Resolving {
                strategy: AccessStrategy::DirectDescriptor,
                ..
            } => ImportState::ResolvingViaDirectDescriptor,
            Phase::Resolving {
                strategy: AccessStrategy::StreamCopy,
                ..
            } => ImportState::ResolvingViaExternalStream,
            Phase::AwaitingPermission { .. } => ImportState::AwaitingPermission,
            Phase::Idle if pending_import == PendingImportStatus::Running => {
                ImportState::ImportingConfirmedData
            }
            Phase::Idle => ImportState::Idle,
        };

        PresenterSnapshot {
            state,
            attached: self.view.is_some(),
            requesting_permissions: self.requesting_permissions,
            pending_import,
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// A panicking or cancelled background stage counts as an I/O failure
fn background_failure(e: JoinError) -> DomainError {
    DomainError::Io(io::Error::other(format!("background task failed: {}", e)))
}
