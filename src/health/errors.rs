use std::fmt;
use std::time::Duration;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ProfileError: the profile could not be resolved (fatal for a run)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug)]
pub enum ProfileError {
    /// Configuration file missing or malformed
    Config(config::ConfigError),
    /// Requested profile is not configured
    NotFound { name: String },
    /// No explicit, default or sole profile to pick
    NoActiveProfile,
    /// A profile attribute is missing or unusable
    InvalidAttribute { attribute: &'static str, reason: String },
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "Failed to read configuration: {err}"),
            Self::NotFound { name } => write!(f, "Profile '{name}' is not configured"),
            Self::NoActiveProfile => write!(
                f,
                "No profile selected: set default_profile or pass --profile"
            ),
            Self::InvalidAttribute { attribute, reason } => {
                write!(f, "Invalid profile attribute '{attribute}': {reason}")
            }
        }
    }
}

impl std::error::Error for ProfileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for ProfileError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ProbeError: a backend call failed inside a probe
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug)]
pub enum ProbeError {
    Database(sqlx::Error),
    Broker(lapin::Error),
    Timeout(Duration),
    CommandFailed { command: String, exit_code: i32, stderr: String },
    Daemon(String),
    Io(std::io::Error),
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database(err) => write!(f, "Database error: {err}"),
            Self::Broker(err) => write!(f, "Broker error: {err}"),
            Self::Timeout(limit) => write!(f, "Timed out after {}s", limit.as_secs_f32()),
            Self::CommandFailed {
                command,
                exit_code,
                stderr,
            } => {
                write!(f, "Command '{command}' failed with exit code {exit_code}")?;
                if !stderr.trim().is_empty() {
                    write!(f, ": {}", stderr.trim())?;
                }
                Ok(())
            }
            Self::Daemon(msg) => write!(f, "Daemon error: {msg}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for ProbeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(err) => Some(err),
            Self::Broker(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for ProbeError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err)
    }
}

impl From<lapin::Error> for ProbeError {
    fn from(err: lapin::Error) -> Self {
        Self::Broker(err)
    }
}

impl From<std::io::Error> for ProbeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
