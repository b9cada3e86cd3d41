// src/cli/import_commands.rs
use crate::application::error::ApplicationError;
use crate::application::import_presenter::PresenterHandle;
use crate::cli::display::show_import_preview;
use crate::cli::error::{CliError, CliResult};
use crate::cli::terminal_view::{TerminalView, UiEvent};
use crate::domain::import_source::ImportIntent;
use crate::exitcode;
use crate::infrastructure::permission::PolicyPermissionGateway;
use crate::util::helper;
use crossterm::style::Stylize;
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, instrument};

/// Yes/no question to the user
pub trait Prompt: Send + Sync {
    fn confirm(&self, question: &str) -> io::Result<bool>;
}

#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn confirm(&self, question: &str) -> io::Result<bool> {
        helper::confirm(question)
    }
}

/// How an import session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Presenter reported completion of the confirmed bookmarks
    Imported { confirmed: usize },
    NothingToImport,
    Declined,
    Failed,
    PermissionDenied,
}

impl ImportOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            ImportOutcome::Imported { .. } | ImportOutcome::NothingToImport => {
                exitcode::SUCCESS
            }
            ImportOutcome::Declined => exitcode::CANCEL,
            ImportOutcome::Failed => exitcode::DATAERR,
            ImportOutcome::PermissionDenied => exitcode::PERMISSION,
        }
    }
}

/// Drives one import from the terminal: binds a view, answers the
/// presenter's prompts and permission requests until a terminal event.
pub struct ImportSession {
    presenter: PresenterHandle,
    permissions: Arc<PolicyPermissionGateway>,
    permission_requests: mpsc::UnboundedReceiver<i32>,
    prompt: Arc<dyn Prompt>,
    assume_yes: bool,
}

impl ImportSession {
    pub fn new(
        presenter: PresenterHandle,
        permissions: Arc<PolicyPermissionGateway>,
        permission_requests: mpsc::UnboundedReceiver<i32>,
        prompt: Arc<dyn Prompt>,
        assume_yes: bool,
    ) -> Self {
        Self {
            presenter,
            permissions,
            permission_requests,
            prompt,
            assume_yes,
        }
    }

    /// Runs until the presenter reports a terminal event. The view is
    /// detached again on every exit path.
    #[instrument(skip_all, level = "debug")]
    pub async fn run(self, intent: ImportIntent) -> CliResult<ImportOutcome> {
        let (view, events) = TerminalView::new(intent);
        self.presenter.bind(view.clone())?;

        let presenter = self.presenter.clone();
        let outcome = self.drive(&view, events).await;
        let unbound = presenter.unbind(view);

        let outcome = outcome?;
        unbound?;
        Ok(outcome)
    }

    async fn drive(
        self,
        view: &TerminalView,
        mut events: mpsc::UnboundedReceiver<UiEvent>,
    ) -> CliResult<ImportOutcome> {
        let ImportSession {
            presenter,
            permissions,
            mut permission_requests,
            prompt,
            assume_yes,
        } = self;

        let mut confirmed = 0;
        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else {
                        return Err(ApplicationError::PresenterGone.into());
                    };
                    debug!(?event, "View event");
                    match event {
                        UiEvent::Error => return Ok(ImportOutcome::Failed),
                        UiEvent::PermissionsError => return Ok(ImportOutcome::PermissionDenied),
                        UiEvent::ImportComplete => {
                            return Ok(ImportOutcome::Imported { confirmed });
                        }
                        UiEvent::Confirm(data) => {
                            let data = data.unwrap_or_default();
                            if data.is_empty() {
                                view.dismiss_dialog();
                                return Ok(ImportOutcome::NothingToImport);
                            }
                            show_import_preview(&mut io::stdout(), &data)?;
                            let accepted = assume_yes
                                || ask(&prompt, format!("Import {}?", data)).await?;
                            view.dismiss_dialog();
                            if !accepted {
                                return Ok(ImportOutcome::Declined);
                            }
                            confirmed = data.len();
                            presenter.import_data(data)?;
                        }
                    }
                }
                Some(request_id) = permission_requests.recv() => {
                    let granted =
                        ask(&prompt, "Allow access to shared storage?".to_string()).await?;
                    permissions.record_answer(granted);
                    presenter.on_permission_result(request_id, granted)?;
                }
            }
        }
    }
}

/// Prompts on the blocking pool so the presenter keeps running
async fn ask(prompt: &Arc<dyn Prompt>, question: String) -> CliResult<bool> {
    let prompt = prompt.clone();
    tokio::task::spawn_blocking(move || prompt.confirm(&question))
        .await
        .map_err(|e| CliError::Other(format!("Prompt failed: {}", e)))?
        .map_err(CliError::Io)
}

pub fn print_outcome(outcome: ImportOutcome) {
    match outcome {
        ImportOutcome::Imported { confirmed } => println!(
            "{}",
            format!("Import complete: {} confirmed bookmarks", confirmed).green()
        ),
        ImportOutcome::NothingToImport => println!("{}", "Nothing to import".yellow()),
        ImportOutcome::Declined => println!("{}", "Aborting...".red()),
        ImportOutcome::Failed => eprintln!("{}", "Error: Could not import bookmarks".red()),
        ImportOutcome::PermissionDenied => eprintln!(
            "{}",
            "Error: Storage permission is required to read this file".red()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::import_presenter::{ImportPresenter, PresenterDeps};
    use crate::application::services::{ContentResolverAdapter, ImportPipeline};
    use crate::config::PermissionPolicy;
    use crate::domain::import_source::ImportSource;
    use crate::infrastructure::json_codec::JsonBookmarkCodec;
    use crate::infrastructure::preferences::InMemoryPreferenceStore;
    use crate::util::testing::{init_test_env, GatedImporter, ScriptedContentResolver};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const ONE_BOOKMARK: &[u8] = br#"[{"url": "https://a.example", "title": "A"}]"#;

    #[derive(Debug)]
    struct ScriptedPrompt {
        answers: Mutex<VecDeque<bool>>,
        questions: Mutex<Vec<String>>,
        broken: bool,
    }

    impl ScriptedPrompt {
        fn new(answers: &[bool]) -> Arc<Self> {
            Arc::new(Self {
                answers: Mutex::new(answers.iter().copied().collect()),
                questions: Mutex::new(Vec::new()),
                broken: false,
            })
        }

        /// Terminal that fails on read, e.g. closed stdin
        fn broken() -> Arc<Self> {
            Arc::new(Self {
                answers: Mutex::new(VecDeque::new()),
                questions: Mutex::new(Vec::new()),
                broken: true,
            })
        }
    }

    impl Prompt for ScriptedPrompt {
        fn confirm(&self, question: &str) -> io::Result<bool> {
            self.questions.lock().unwrap().push(question.to_string());
            if self.broken {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdin closed"));
            }
            Ok(self.answers.lock().unwrap().pop_front().unwrap_or(false))
        }
    }

    fn session(
        resolver: ScriptedContentResolver,
        importer: Arc<GatedImporter>,
        policy: PermissionPolicy,
        prompt: Arc<ScriptedPrompt>,
        assume_yes: bool,
    ) -> (ImportSession, PresenterHandle) {
        let pipeline = ImportPipeline::new(
            ContentResolverAdapter::new(Arc::new(resolver)),
            Arc::new(JsonBookmarkCodec::new()),
        );
        let (gateway, requests) = PolicyPermissionGateway::new(policy);
        let permissions = Arc::new(gateway);
        let presenter = ImportPresenter::spawn(PresenterDeps {
            pipeline,
            importer,
            permissions: permissions.clone(),
            preferences: Arc::new(InMemoryPreferenceStore::new()),
        });
        let session = ImportSession::new(
            presenter.clone(),
            permissions,
            requests,
            prompt,
            assume_yes,
        );
        (session, presenter)
    }

    fn intent() -> ImportIntent {
        ImportIntent::with_data(ImportSource::parse("file:///sdcard/bookmarks.json").unwrap())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn given_direct_access_and_yes_flag_when_run_then_imported_without_prompt() {
        let _ = init_test_env();
        let importer = GatedImporter::new();
        let prompt = ScriptedPrompt::new(&[]);
        let resolver = ScriptedContentResolver::new().with_descriptor_bytes(ONE_BOOKMARK);
        let (session, presenter) = session(
            resolver,
            importer.clone(),
            PermissionPolicy::Ask,
            prompt.clone(),
            true,
        );

        let outcome = session.run(intent()).await.unwrap();

        assert_eq!(outcome, ImportOutcome::Imported { confirmed: 1 });
        assert_eq!(importer.imported().len(), 1);
        assert!(prompt.questions.lock().unwrap().is_empty());
        assert!(!presenter.snapshot().await.unwrap().attached);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn given_shared_storage_when_user_grants_and_confirms_then_imported() {
        let _ = init_test_env();
        let importer = GatedImporter::new();
        let prompt = ScriptedPrompt::new(&[true, true]);
        let resolver = ScriptedContentResolver::new()
            .with_descriptor_failure()
            .with_stream_bytes(ONE_BOOKMARK);
        let (session, _presenter) = session(
            resolver,
            importer.clone(),
            PermissionPolicy::Ask,
            prompt.clone(),
            false,
        );

        let outcome = session.run(intent()).await.unwrap();

        assert_eq!(outcome, ImportOutcome::Imported { confirmed: 1 });
        let questions = prompt.questions.lock().unwrap().clone();
        assert_eq!(questions.len(), 2);
        assert!(questions[0].contains("shared storage"));
        assert!(questions[1].starts_with("Import 1 bookmarks"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn given_user_declines_confirmation_when_run_then_declined_and_nothing_imported() {
        let _ = init_test_env();
        let importer = GatedImporter::new();
        let prompt = ScriptedPrompt::new(&[false]);
        let resolver = ScriptedContentResolver::new().with_descriptor_bytes(ONE_BOOKMARK);
        let (session, _presenter) =
            session(resolver, importer.clone(), PermissionPolicy::Ask, prompt, false);

        let outcome = session.run(intent()).await.unwrap();

        assert_eq!(outcome, ImportOutcome::Declined);
        assert_eq!(outcome.exit_code(), exitcode::CANCEL);
        assert!(importer.imported().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn given_denied_policy_when_direct_access_fails_then_permission_denied() {
        let _ = init_test_env();
        let prompt = ScriptedPrompt::new(&[]);
        let resolver = ScriptedContentResolver::new().with_descriptor_failure();
        let (session, _presenter) = session(
            resolver,
            GatedImporter::new(),
            PermissionPolicy::Denied,
            prompt,
            false,
        );

        let outcome = session.run(intent()).await.unwrap();

        assert_eq!(outcome, ImportOutcome::PermissionDenied);
        assert_eq!(outcome.exit_code(), exitcode::PERMISSION);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn given_absent_resource_when_run_then_nothing_to_import() {
        let _ = init_test_env();
        let prompt = ScriptedPrompt::new(&[]);
        let resolver = ScriptedContentResolver::new().with_descriptor_absent();
        let (session, _presenter) =
            session(resolver, GatedImporter::new(), PermissionPolicy::Ask, prompt, false);

        let outcome = session.run(intent()).await.unwrap();

        assert_eq!(outcome, ImportOutcome::NothingToImport);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn given_prompt_fails_when_run_then_error_and_view_detached() {
        let _ = init_test_env();
        let resolver = ScriptedContentResolver::new().with_descriptor_bytes(ONE_BOOKMARK);
        let (session, presenter) = session(
            resolver,
            GatedImporter::new(),
            PermissionPolicy::Ask,
            ScriptedPrompt::broken(),
            false,
        );

        let result = session.run(intent()).await;

        assert!(matches!(result, Err(CliError::Io(_))));
        assert!(!presenter.snapshot().await.unwrap().attached);
    }
}
