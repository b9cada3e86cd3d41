use assert_cmd::prelude::*;
use assert_cmd::Command;
use bkimport::exitcode;
use bkimport::infrastructure::repositories::sqlite::repository::SqliteBookmarkImporter;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const BOOKMARKS: &str = r#"[
  {"url": "https://www.rust-lang.org", "title": "Rust", "tags": ["lang", "rust"]},
  {"url": "https://docs.rs", "title": "Docs.rs", "description": "crate docs"}
]"#;

/// Isolated home, database, state file and access scopes for one test
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("private")).unwrap();
        fs::create_dir_all(dir.path().join("sdcard")).unwrap();
        Self { dir }
    }

    fn db_path(&self) -> PathBuf {
        self.dir.path().join("bkimport.db")
    }

    fn with_db(self) -> Self {
        SqliteBookmarkImporter::from_url(self.db_path().to_str().unwrap()).unwrap();
        self
    }

    fn private_file(&self, name: &str, content: &str) -> PathBuf {
        self.write(&self.dir.path().join("private").join(name), content)
    }

    fn shared_file(&self, name: &str, content: &str) -> PathBuf {
        self.write(&self.dir.path().join("sdcard").join(name), content)
    }

    fn write(&self, path: &Path, content: &str) -> PathBuf {
        fs::write(path, content).unwrap();
        path.to_path_buf()
    }

    fn cmd(&self, permission: &str) -> Command {
        let mut cmd = Command::cargo_bin("bkimport").unwrap();
        cmd.env("HOME", self.dir.path())
            .env("BKIMPORT_DB_URL", self.db_path())
            .env("BKIMPORT_STATE_FILE", self.dir.path().join("state.toml"))
            .env("BKIMPORT_PRIVATE_DIR", self.dir.path().join("private"))
            .env("BKIMPORT_STORAGE_PERMISSION", permission);
        cmd
    }

    fn stored_bookmarks(&self) -> i64 {
        SqliteBookmarkImporter::from_url(self.db_path().to_str().unwrap())
            .unwrap()
            .count()
            .unwrap()
    }
}

#[test]
fn given_debug_flags_when_run_without_command_then_success() {
    let sandbox = Sandbox::new();
    sandbox.cmd("ask").args(["-d", "-d"]).assert().success();
}

#[test]
fn given_new_path_when_create_db_then_database_created() {
    let sandbox = Sandbox::new();
    let path = sandbox.dir.path().join("nested/new.db");

    sandbox
        .cmd("ask")
        .args(["create-db", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Database created"));
    assert!(path.exists());
}

#[test]
fn given_existing_database_when_create_db_then_fails() {
    let sandbox = Sandbox::new().with_db();

    sandbox
        .cmd("ask")
        .args(["create-db", sandbox.db_path().to_str().unwrap()])
        .assert()
        .code(exitcode::USAGE)
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn given_env_overrides_when_show_config_then_effective_values_printed() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd("granted")
        .arg("show-config")
        .assert()
        .success()
        .stdout(predicate::str::contains(sandbox.db_path().to_str().unwrap()))
        .stdout(predicate::str::contains("storage_permission = \"granted\""));
}

#[test]
fn given_generate_config_flag_then_default_config_printed() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd("ask")
        .arg("--generate-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("db_url"));
}

#[test]
fn given_private_file_when_import_with_yes_then_bookmarks_stored() {
    let sandbox = Sandbox::new().with_db();
    let file = sandbox.private_file("bookmarks.json", BOOKMARKS);

    sandbox
        .cmd("denied")
        .args(["import", "--yes", file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Import complete: 2 confirmed bookmarks"));
    assert_eq!(sandbox.stored_bookmarks(), 2);
}

#[test]
fn given_shared_file_and_denied_policy_when_import_then_permission_exit_code() {
    let sandbox = Sandbox::new().with_db();
    let file = sandbox.shared_file("bookmarks.json", BOOKMARKS);

    sandbox
        .cmd("denied")
        .args(["import", "--yes", file.to_str().unwrap()])
        .assert()
        .code(exitcode::PERMISSION)
        .stderr(predicate::str::contains("Storage permission"));
    assert_eq!(sandbox.stored_bookmarks(), 0);
}

#[test]
fn given_shared_file_when_user_grants_and_confirms_then_bookmarks_stored() {
    let sandbox = Sandbox::new().with_db();
    let file = sandbox.shared_file("bookmarks.json", BOOKMARKS);

    sandbox
        .cmd("ask")
        .args(["import", file.to_str().unwrap()])
        .write_stdin("y\ny\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Allow access to shared storage?"))
        .stdout(predicate::str::contains("Import complete: 2 confirmed bookmarks"));
    assert_eq!(sandbox.stored_bookmarks(), 2);
    assert!(fs::read_to_string(sandbox.dir.path().join("state.toml"))
        .unwrap()
        .contains("true"));
}

#[test]
fn given_shared_file_when_user_denies_permission_then_permission_exit_code() {
    let sandbox = Sandbox::new().with_db();
    let file = sandbox.shared_file("bookmarks.json", BOOKMARKS);

    sandbox
        .cmd("ask")
        .args(["import", file.to_str().unwrap()])
        .write_stdin("n\n")
        .assert()
        .code(exitcode::PERMISSION);
    assert_eq!(sandbox.stored_bookmarks(), 0);
}

#[test]
fn given_private_file_when_user_declines_then_cancelled_and_nothing_stored() {
    let sandbox = Sandbox::new().with_db();
    let file = sandbox.private_file("bookmarks.json", BOOKMARKS);

    sandbox
        .cmd("ask")
        .args(["import", file.to_str().unwrap()])
        .write_stdin("n\n")
        .assert()
        .code(exitcode::CANCEL);
    assert_eq!(sandbox.stored_bookmarks(), 0);
}

#[test]
fn given_no_locator_when_import_then_error_exit_code() {
    let sandbox = Sandbox::new().with_db();

    sandbox
        .cmd("ask")
        .arg("import")
        .assert()
        .code(exitcode::DATAERR)
        .stderr(predicate::str::contains("Could not import"));
}

#[test]
fn given_missing_shared_file_when_import_then_nothing_to_import() {
    let sandbox = Sandbox::new().with_db();
    let missing = sandbox.dir.path().join("sdcard/missing.json");

    sandbox
        .cmd("granted")
        .args(["import", missing.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to import"));
}

#[test]
fn given_missing_database_when_import_then_usage_error() {
    let sandbox = Sandbox::new();
    let file = sandbox.private_file("bookmarks.json", BOOKMARKS);

    sandbox
        .cmd("ask")
        .args(["import", "--yes", file.to_str().unwrap()])
        .assert()
        .code(exitcode::USAGE)
        .stderr(predicate::str::contains("Database not found"));
}

#[test]
fn given_private_file_when_preview_then_json_printed_and_nothing_stored() {
    let sandbox = Sandbox::new().with_db();
    let file = sandbox.private_file("bookmarks.json", BOOKMARKS);

    sandbox
        .cmd("ask")
        .args(["preview", file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://www.rust-lang.org"))
        .stdout(predicate::str::contains("crate docs"));
    assert_eq!(sandbox.stored_bookmarks(), 0);
}

#[test]
fn given_malformed_file_when_preview_then_data_error() {
    let sandbox = Sandbox::new();
    let file = sandbox.private_file("broken.json", "{ not json");

    sandbox
        .cmd("granted")
        .args(["preview", file.to_str().unwrap()])
        .assert()
        .code(exitcode::DATAERR);
}
