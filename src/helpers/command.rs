use crate::health::errors::ProbeError;
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CommandExecutor: abstraction for running external commands
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Result of executing a command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Abstraction over process execution.
///
/// Production: `ShellExecutor` spawns the process.
/// Tests: stub executors return canned output without side effects.
pub trait CommandExecutor: Send + Sync {
    fn execute(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ProbeError>;
}

/// Spawns the process for real.
///
/// With a time limit set, a child still running at the deadline is killed
/// and the call fails with [`ProbeError::Timeout`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellExecutor {
    limit: Option<Duration>,
}

/// How often a bounded child is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

impl ShellExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(limit: Duration) -> Self {
        Self { limit: Some(limit) }
    }

    fn wait_bounded(&self, child: &mut Child, limit: Duration) -> Result<ExitStatus, ProbeError> {
        let deadline = Instant::now() + limit;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                // the child may exit between try_wait and kill
                let _ = child.kill();
                let _ = child.wait();
                return Err(ProbeError::Timeout(limit));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

fn drain(pipe: Option<impl Read + Send + 'static>) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).to_string()
    })
}

impl CommandExecutor for ShellExecutor {
    fn execute(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ProbeError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ProbeError::CommandFailed {
                command: format!("{} {}", program, args.join(" ")),
                exit_code: -1,
                stderr: e.to_string(),
            })?;

        // pipes are drained while the child runs
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match self.limit {
            Some(limit) => self.wait_bounded(&mut child, limit)?,
            None => child.wait()?,
        };

        Ok(CommandOutput {
            exit_code: status.code().unwrap_or(-1),
            stdout: stdout.join().unwrap_or_default(),
            stderr: stderr.join().unwrap_or_default(),
        })
    }
}
