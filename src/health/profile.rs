//! Profile resolution: the bundle of connection data every probe needs.

use crate::configuration::{
    get_configuration, load_configuration, BrokerSettings, DatabaseSettings, ProfileSettings,
    Settings,
};
use crate::health::errors::ProfileError;
use crate::health::probes::daemon::{DaemonClient, PidFileDaemonClient};
use crate::helpers::ShellExecutor;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Source of the active profile, resolved once per run.
pub trait ProfileSource {
    fn resolve(&self) -> Result<ProfileContext, ProfileError>;
}

/// Resolved profile. Read-only once built; owned by a single run.
pub struct ProfileContext {
    pub name: String,
    pub repository_uri: Option<String>,
    pub database: DatabaseSettings,
    pub broker: BrokerSettings,
    /// Upper bound each probe applies to its own work.
    pub probe_timeout: Duration,
    daemon: Arc<dyn DaemonClient>,
}

impl ProfileContext {
    pub fn new(
        name: impl Into<String>,
        settings: ProfileSettings,
        probe_timeout: Duration,
        daemon: Arc<dyn DaemonClient>,
    ) -> Self {
        Self {
            name: name.into(),
            repository_uri: settings.repository_uri,
            database: settings.database,
            broker: settings.broker,
            probe_timeout,
            daemon,
        }
    }

    pub fn daemon_client(&self) -> Arc<dyn DaemonClient> {
        Arc::clone(&self.daemon)
    }

    /// Local directory of the file repository.
    ///
    /// Accepts `file://` URIs and absolute paths.
    pub fn repository_path(&self) -> Result<PathBuf, ProfileError> {
        let uri = self
            .repository_uri
            .as_deref()
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
            .ok_or_else(|| invalid_repository("not set"))?;

        if let Ok(parsed) = url::Url::parse(uri) {
            if parsed.scheme() != "file" {
                return Err(invalid_repository(format!(
                    "unsupported scheme '{}'",
                    parsed.scheme()
                )));
            }
            return parsed
                .to_file_path()
                .map_err(|_| invalid_repository(format!("'{uri}' is not a local path")));
        }

        let path = PathBuf::from(uri);
        if path.is_absolute() {
            Ok(path)
        } else {
            Err(invalid_repository(format!("'{uri}' is not absolute")))
        }
    }
}

fn invalid_repository(reason: impl Into<String>) -> ProfileError {
    ProfileError::InvalidAttribute {
        attribute: "repository_uri",
        reason: reason.into(),
    }
}

impl fmt::Debug for ProfileContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileContext")
            .field("name", &self.name)
            .field("repository_uri", &self.repository_uri)
            .field("database", &self.database.endpoint())
            .field("broker", &self.broker.redacted_url())
            .field("probe_timeout", &self.probe_timeout)
            .finish_non_exhaustive()
    }
}

/// Pick the active profile: explicit name, then `default_profile`, then the
/// only configured profile.
pub fn select_profile(
    settings: &Settings,
    requested: Option<&str>,
) -> Result<(String, ProfileSettings), ProfileError> {
    let name = match requested.or(settings.default_profile.as_deref()) {
        Some(name) => name.to_string(),
        None if settings.profiles.len() == 1 => settings
            .profiles
            .keys()
            .next()
            .cloned()
            .ok_or(ProfileError::NoActiveProfile)?,
        None => return Err(ProfileError::NoActiveProfile),
    };

    let profile = settings
        .profiles
        .get(&name)
        .cloned()
        .ok_or_else(|| ProfileError::NotFound { name: name.clone() })?;

    Ok((name, profile))
}

/// Reads the profile from the configuration file.
pub struct ConfigProfileSource {
    path: Option<PathBuf>,
    profile: Option<String>,
}

impl ConfigProfileSource {
    /// `path: None` falls back to `$STACKCHECK_CONFIG` / `configuration.*`.
    pub fn new(path: Option<PathBuf>, profile: Option<String>) -> Self {
        Self { path, profile }
    }
}

impl ProfileSource for ConfigProfileSource {
    #[tracing::instrument(name = "Resolve profile", skip(self))]
    fn resolve(&self) -> Result<ProfileContext, ProfileError> {
        let settings = match &self.path {
            Some(path) => load_configuration(path)?,
            None => get_configuration()?,
        };
        let (name, profile) = select_profile(&settings, self.profile.as_deref())?;
        tracing::debug!(profile = %name, "Profile selected");

        let probe_timeout = Duration::from_secs(settings.probes.timeout_secs);
        let executor = ShellExecutor::with_timeout(probe_timeout);
        let daemon = PidFileDaemonClient::new(profile.daemon.clone(), Arc::new(executor));
        Ok(ProfileContext::new(
            name,
            profile,
            probe_timeout,
            Arc::new(daemon),
        ))
    }
}
