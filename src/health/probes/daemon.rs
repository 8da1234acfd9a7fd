use super::{ServiceProbe, DAEMON};
use crate::configuration::DaemonSettings;
use crate::health::errors::ProbeError;
use crate::health::models::CheckResult;
use crate::health::profile::ProfileContext;
use crate::helpers::CommandExecutor;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;

/// Operations the daemon probe needs from a daemon client.
pub trait DaemonClient: Send + Sync {
    /// Remove a pid file left behind by a daemon that is no longer alive.
    fn delete_stale_pid_file(&self) -> Result<(), ProbeError>;

    fn status_text(&self) -> Result<String, ProbeError>;

    fn is_running(&self) -> Result<bool, ProbeError>;
}

/// Daemon client driven by the daemon's pid file.
///
/// Liveness is checked with `kill -0 <pid>`. The status text comes from the
/// configured status command when there is one.
pub struct PidFileDaemonClient {
    settings: DaemonSettings,
    executor: Arc<dyn CommandExecutor>,
}

impl PidFileDaemonClient {
    pub fn new(settings: DaemonSettings, executor: Arc<dyn CommandExecutor>) -> Self {
        Self { settings, executor }
    }

    fn pid_file(&self) -> Result<&Path, ProbeError> {
        self.settings
            .pid_file
            .as_deref()
            .ok_or_else(|| ProbeError::Daemon("no pid file configured".to_string()))
    }

    /// `None` when there is no pid file.
    fn read_pid(&self) -> Result<Option<u32>, ProbeError> {
        let path = self.pid_file()?;
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)?;
        parse_pid(&contents).map(Some).ok_or_else(|| {
            ProbeError::Daemon(format!("invalid pid file {}", path.display()))
        })
    }

    /// Only ESRCH means the process is gone. EPERM means it exists under
    /// another user.
    fn process_alive(&self, pid: u32) -> Result<bool, ProbeError> {
        let pid = pid.to_string();
        let output = self.executor.execute("kill", &["-0", &pid])?;
        if output.success() {
            return Ok(true);
        }

        let stderr = output.stderr.to_lowercase();
        if stderr.contains("no such process") {
            Ok(false)
        } else if stderr.contains("not permitted") {
            Ok(true)
        } else {
            Err(ProbeError::CommandFailed {
                command: format!("kill -0 {pid}"),
                exit_code: output.exit_code,
                stderr: output.stderr,
            })
        }
    }

    fn started_at(&self) -> Result<DateTime<Utc>, ProbeError> {
        let modified = std::fs::metadata(self.pid_file()?)?.modified()?;
        Ok(DateTime::<Utc>::from(modified))
    }

    fn run_status_command(&self, command: &[String]) -> Result<String, ProbeError> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| ProbeError::Daemon("empty status command".to_string()))?;
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        let output = self.executor.execute(program, &args)?;
        if !output.success() {
            return Err(ProbeError::CommandFailed {
                command: command.join(" "),
                exit_code: output.exit_code,
                stderr: output.stderr,
            });
        }
        Ok(output.stdout)
    }
}

fn parse_pid(contents: &str) -> Option<u32> {
    contents.trim().parse::<u32>().ok().filter(|pid| *pid > 0)
}

impl DaemonClient for PidFileDaemonClient {
    fn delete_stale_pid_file(&self) -> Result<(), ProbeError> {
        let path = self.pid_file()?;
        if !path.exists() {
            return Ok(());
        }

        let contents = std::fs::read_to_string(path)?;
        if let Some(pid) = parse_pid(&contents) {
            if self.process_alive(pid)? {
                return Ok(());
            }
        }

        std::fs::remove_file(path)?;
        tracing::info!(pid_file = %path.display(), "Deleted stale pid file");
        Ok(())
    }

    fn status_text(&self) -> Result<String, ProbeError> {
        if let Some(command) = &self.settings.status_command {
            return self.run_status_command(command);
        }

        match self.read_pid()? {
            Some(pid) if self.process_alive(pid)? => Ok(format!(
                "Daemon is running as PID {} since {}",
                pid,
                self.started_at()?.format("%Y-%m-%d %H:%M:%S UTC")
            )),
            _ => Ok("The daemon is not running".to_string()),
        }
    }

    fn is_running(&self) -> Result<bool, ProbeError> {
        match self.read_pid()? {
            Some(pid) => self.process_alive(pid),
            None => Ok(false),
        }
    }
}

/// Clears stale state, then reports liveness with the first status line.
pub struct DaemonProbe;

#[async_trait]
impl ServiceProbe for DaemonProbe {
    fn service(&self) -> &'static str {
        DAEMON
    }

    #[tracing::instrument(name = "Check daemon", skip(self, ctx))]
    async fn probe(&self, ctx: &ProfileContext) -> CheckResult {
        let client = ctx.daemon_client();
        let limit = ctx.probe_timeout;

        // client calls block on the filesystem and child processes
        let task = tokio::task::spawn_blocking(move || query_daemon(client.as_ref()));
        let queried = match tokio::time::timeout(limit, task).await {
            Ok(Ok(queried)) => queried,
            Ok(Err(e)) => Err(ProbeError::Daemon(format!("status task failed: {e}"))),
            Err(_) => Err(ProbeError::Timeout(limit)),
        };

        match queried {
            Ok((true, status)) => CheckResult::up(self.service(), status),
            Ok((false, status)) => CheckResult::down(self.service(), status),
            Err(e) => {
                tracing::warn!("Daemon check failed: {}", e);
                CheckResult::error(self.service(), "Error getting daemon status").with_cause(e)
            }
        }
    }
}

fn query_daemon(client: &dyn DaemonClient) -> Result<(bool, String), ProbeError> {
    client.delete_stale_pid_file()?;
    let status = first_line(&client.status_text()?);
    let running = client.is_running()?;
    Ok((running, status))
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or_default().trim_end().to_string()
}
