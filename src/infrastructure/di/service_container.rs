use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::import_presenter::PresenterDeps;
use crate::application::services::{ContentResolverAdapter, ImportPipeline};
use crate::config::Settings;
use crate::infrastructure::content_resolver::FsContentResolver;
use crate::infrastructure::json_codec::JsonBookmarkCodec;
use crate::infrastructure::permission::PolicyPermissionGateway;
use crate::infrastructure::preferences::TomlPreferenceStore;
use crate::infrastructure::repositories::sqlite::repository::SqliteBookmarkImporter;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, instrument};

/// Production service container - single source of truth for service creation
pub struct ServiceContainer {
    pub pipeline: ImportPipeline,
    pub importer: Arc<SqliteBookmarkImporter>,
    pub permissions: Arc<PolicyPermissionGateway>,
    pub preferences: Arc<TomlPreferenceStore>,
    permission_requests: Option<mpsc::UnboundedReceiver<i32>>,
}

impl ServiceContainer {
    /// Create all services with explicit dependency injection
    #[instrument(skip_all, level = "debug")]
    pub fn new(config: &Settings) -> ApplicationResult<Self> {
        let pipeline = Self::create_pipeline(config);
        let importer = Self::create_importer(&config.db_url)?;
        let preferences = Arc::new(TomlPreferenceStore::open(&config.state_file));
        let (gateway, permission_requests) =
            PolicyPermissionGateway::new(config.storage_permission);
        debug!(policy = %config.storage_permission, "Services created");

        Ok(Self {
            pipeline,
            importer,
            permissions: Arc::new(gateway),
            preferences,
            permission_requests: Some(permission_requests),
        })
    }

    /// Resolve and decode only; needs no database
    pub fn create_pipeline(config: &Settings) -> ImportPipeline {
        let resolver = Arc::new(FsContentResolver::new(&config.private_dir));
        ImportPipeline::new(
            ContentResolverAdapter::new(resolver),
            Arc::new(JsonBookmarkCodec::new()),
        )
    }

    fn create_importer(db_url: &str) -> ApplicationResult<Arc<SqliteBookmarkImporter>> {
        if !Path::new(db_url).exists() {
            return Err(ApplicationError::Validation(format!(
                "Database not found at '{}'. Create one with 'bkimport create-db <path>' or set BKIMPORT_DB_URL",
                db_url
            )));
        }

        // Runs all pending migrations
        let importer = SqliteBookmarkImporter::from_url(db_url).map_err(|e| {
            ApplicationError::Other(format!("Failed to open bookmark database: {}", e))
        })?;
        Ok(Arc::new(importer))
    }

    pub fn presenter_deps(&self) -> PresenterDeps {
        PresenterDeps {
            pipeline: self.pipeline.clone(),
            importer: self.importer.clone(),
            permissions: self.permissions.clone(),
            preferences: self.preferences.clone(),
        }
    }

    /// Receiving end of the permission requests; handed out once
    pub fn take_permission_requests(&mut self) -> Option<mpsc::UnboundedReceiver<i32>> {
        self.permission_requests.take()
    }
}

impl std::fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("pipeline", &self.pipeline)
            .field("importer", &self.importer)
            .field("permissions", &self.permissions)
            .field("preferences", &self.preferences)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PermissionPolicy;
    use crate::domain::services::permission::PermissionGateway;
    use tempfile::TempDir;

    fn settings(dir: &TempDir) -> Settings {
        Settings {
            db_url: dir.path().join("bkimport.db").to_string_lossy().to_string(),
            state_file: dir.path().join("state.toml"),
            private_dir: dir.path().join("private"),
            storage_permission: PermissionPolicy::Granted,
        }
    }

    #[test]
    fn given_missing_database_when_new_then_validation_error() {
        let dir = TempDir::new().unwrap();
        let result = ServiceContainer::new(&settings(&dir));
        assert!(matches!(result, Err(ApplicationError::Validation(_))));
    }

    #[test]
    fn given_existing_database_when_new_then_services_follow_settings() {
        let dir = TempDir::new().unwrap();
        let config = settings(&dir);
        SqliteBookmarkImporter::from_url(&config.db_url).unwrap();

        let mut container = ServiceContainer::new(&config).unwrap();

        assert!(container.permissions.has_storage_write_permission());
        assert!(container.take_permission_requests().is_some());
        assert!(container.take_permission_requests().is_none());
    }
}
