#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Binary run from `dir`, with no inherited stackcheck settings.
pub fn stackcheck_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("stackcheck").expect("stackcheck binary not found");
    cmd.current_dir(dir.path())
        .env_remove("STACKCHECK_CONFIG")
        .env_remove("STACKCHECK_PROFILE")
        .env_remove("STACKCHECK__PROBES__TIMEOUT_SECS")
        .env_remove("RUST_LOG");
    cmd
}

pub fn repository_dir(dir: &TempDir) -> PathBuf {
    dir.path().join("repository")
}

/// Profile `main` with every service on an unreachable endpoint.
pub fn write_config(dir: &TempDir) -> PathBuf {
    write_config_with_status_command(dir, None)
}

/// Same as [`write_config`], with a daemon status command.
pub fn write_config_with_status_command(dir: &TempDir, command: Option<&[&str]>) -> PathBuf {
    let status_command = match command {
        Some(command) => format!(
            "      status_command: [{}]\n",
            command
                .iter()
                .map(|arg| format!("\"{arg}\""))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        None => String::new(),
    };
    let repository = repository_dir(dir);
    std::fs::create_dir_all(&repository).unwrap();

    let config = format!(
        r#"default_profile: main
probes:
  timeout_secs: 1
profiles:
  main:
    repository_uri: "file://{repository}"
    database:
      username: u
      password: secret
      host: 127.0.0.1
      port: 1
      database_name: db
    broker:
      host: 127.0.0.1
      port: 1
    daemon:
      pid_file: "{pid_file}"
{status_command}"#,
        repository = repository.display(),
        pid_file = dir.path().join("daemon.pid").display(),
    );

    write(dir.path(), "configuration.yaml", &config)
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// Write a `.env` file into the working directory used by [`stackcheck_cmd`].
pub fn write_dotenv(dir: &TempDir, contents: &str) -> PathBuf {
    write(dir.path(), ".env", contents)
}
