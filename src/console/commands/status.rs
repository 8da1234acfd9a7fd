use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use crate::console::commands::CallableTrait;
use crate::health::{
    ConfigProfileSource, ExitCode, HealthSequencer, ProbeSet, RunOptions, RunOutcome,
    StatusReporter,
};
use crate::telemetry::LogLevelControl;

/// `stackcheck status [--rabbitmq] [--daemon] [--profile NAME] [--json]`
///
/// Checks the profile, repository and database, plus the broker and daemon
/// when asked for.
pub struct StatusCommand {
    pub config: Option<PathBuf>,
    pub profile: Option<String>,
    pub options: RunOptions,
    pub json: bool,
    log: LogLevelControl,
}

impl StatusCommand {
    pub fn new(
        config: Option<PathBuf>,
        profile: Option<String>,
        options: RunOptions,
        json: bool,
        log: LogLevelControl,
    ) -> Self {
        Self {
            config,
            profile,
            options,
            json,
            log,
        }
    }
}

/// Write the whole outcome as one JSON document.
pub fn render_json<W: Write>(outcome: &RunOutcome, out: &mut W) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, outcome)?;
    writeln!(out)
}

impl CallableTrait for StatusCommand {
    fn call(&self) -> Result<ExitCode, Box<dyn std::error::Error>> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let stdout = io::stdout();
        let reporter = StatusReporter::new(!self.json && stdout.is_terminal());
        let sequencer = HealthSequencer::new(
            ConfigProfileSource::new(self.config.clone(), self.profile.clone()),
            ProbeSet::live(self.log.clone()),
            reporter,
        );

        let outcome = if self.json {
            runtime.block_on(sequencer.run(self.options, &mut io::sink()))
        } else {
            runtime.block_on(sequencer.run(self.options, &mut stdout.lock()))
        };
        // a blocking task abandoned at its deadline must not hold up exit
        runtime.shutdown_background();

        let outcome = outcome?;
        if self.json {
            render_json(&outcome, &mut stdout.lock())?;
        }

        tracing::info!(exit_code = outcome.exit_code.code(), "Status check finished");
        Ok(outcome.exit_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{CheckResult, ProbeError, ProfileContext, ProfileError, ProfileSource};
    use crate::health::probes::{DaemonProbe, RepositoryProbe};
    use crate::health::probes::{BrokerConnector, BrokerProbe, DatabaseConnector, DatabaseProbe};
    use crate::configuration::DatabaseSettings;
    use async_trait::async_trait;

    struct Fails;

    impl ProfileSource for Fails {
        fn resolve(&self) -> Result<ProfileContext, ProfileError> {
            Err(ProfileError::NotFound {
                name: "prod".to_string(),
            })
        }
    }

    struct Refused;

    #[async_trait]
    impl DatabaseConnector for Refused {
        async fn ping(&self, _settings: &DatabaseSettings) -> Result<(), ProbeError> {
            Err(ProbeError::Io(io::Error::from(io::ErrorKind::ConnectionRefused)))
        }
    }

    #[async_trait]
    impl BrokerConnector for Refused {
        async fn connect_and_close(&self, _url: &str) -> Result<(), ProbeError> {
            Err(ProbeError::Io(io::Error::from(io::ErrorKind::ConnectionRefused)))
        }
    }

    #[tokio::test]
    async fn test_render_json_fatal_outcome() {
        let sequencer = HealthSequencer::new(
            Fails,
            ProbeSet::new(
                RepositoryProbe,
                DatabaseProbe::new(Refused, LogLevelControl::disabled()),
                BrokerProbe::new(Refused, LogLevelControl::disabled()),
                DaemonProbe,
            ),
            StatusReporter::plain(),
        );
        let outcome = sequencer
            .run(RunOptions::new(true, true), &mut io::sink())
            .await
            .unwrap();

        let mut out = Vec::new();
        render_json(&outcome, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["exit_code"], "critical");
        assert_eq!(value["profile"]["service"], "profile");
        assert_eq!(value["profile"]["state"], "error");
        assert_eq!(value["profile"]["detail"], "Unable to read profile");
        assert_eq!(value["profile"]["cause_detail"], "Profile 'prod' is not configured");
        assert_eq!(value["checks"].as_array().unwrap().len(), 0);
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_render_json_skips_missing_cause() {
        let mut outcome = RunOutcome::resolved(CheckResult::up("profile", "On profile default"));
        outcome.record(CheckResult::up("repository", "/srv/repo"));

        let mut out = Vec::new();
        render_json(&outcome, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["exit_code"], "success");
        assert!(value["checks"][0].get("cause_detail").is_none());
    }
}
