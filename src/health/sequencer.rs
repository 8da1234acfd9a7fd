//! Ordered probe execution and exit-code aggregation.
//!
//! Only a failed profile stops a run. Every later probe is an independent
//! diagnostic: its failure escalates the exit code but the run continues,
//! so one invocation reports on every requested service.

use crate::health::models::{CheckResult, RunOutcome};
use crate::health::probes::{
    AmqpConnector, BrokerProbe, DaemonProbe, DatabaseProbe, PgConnector, RepositoryProbe,
    ServiceProbe, PROFILE,
};
use crate::health::profile::{ProfileContext, ProfileSource};
use crate::health::reporter::StatusReporter;
use crate::telemetry::LogLevelControl;
use std::io::{self, Write};

/// Which optional probes a run includes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    include_broker: bool,
    include_daemon: bool,
}

impl RunOptions {
    /// Asking for the daemon also runs the broker probe before it.
    pub fn new(include_broker: bool, include_daemon: bool) -> Self {
        Self {
            include_broker: include_broker || include_daemon,
            include_daemon,
        }
    }

    pub fn include_broker(&self) -> bool {
        self.include_broker
    }

    pub fn include_daemon(&self) -> bool {
        self.include_daemon
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    ProfileResolved,
    RepositoryChecked,
    DatabaseChecked,
    BrokerChecked,
    DaemonChecked,
    Done,
    /// Profile resolution failed; nothing else ran.
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    Repository,
    Database,
    Broker,
    Daemon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Resolve the profile, then move to `resolved` or `failed`.
    ResolveProfile { resolved: Stage, failed: Stage },
    /// Run the probe, then move to the given stage whatever it reports.
    Probe(ProbeKind, Stage),
    Finish,
}

/// The escalation table: the step to take from `stage`. `None` once the
/// run is over.
pub fn next_step(stage: Stage, options: RunOptions) -> Option<Step> {
    match stage {
        Stage::Init => Some(Step::ResolveProfile {
            resolved: Stage::ProfileResolved,
            failed: Stage::Fatal,
        }),
        Stage::ProfileResolved => Some(Step::Probe(ProbeKind::Repository, Stage::RepositoryChecked)),
        Stage::RepositoryChecked => Some(Step::Probe(ProbeKind::Database, Stage::DatabaseChecked)),
        Stage::DatabaseChecked if options.include_broker => {
            Some(Step::Probe(ProbeKind::Broker, Stage::BrokerChecked))
        }
        Stage::BrokerChecked if options.include_daemon => {
            Some(Step::Probe(ProbeKind::Daemon, Stage::DaemonChecked))
        }
        Stage::DatabaseChecked | Stage::BrokerChecked | Stage::DaemonChecked => Some(Step::Finish),
        Stage::Done | Stage::Fatal => None,
    }
}

pub struct ProbeSet {
    repository: Box<dyn ServiceProbe>,
    database: Box<dyn ServiceProbe>,
    broker: Box<dyn ServiceProbe>,
    daemon: Box<dyn ServiceProbe>,
}

impl ProbeSet {
    pub fn new(
        repository: impl ServiceProbe + 'static,
        database: impl ServiceProbe + 'static,
        broker: impl ServiceProbe + 'static,
        daemon: impl ServiceProbe + 'static,
    ) -> Self {
        Self {
            repository: Box::new(repository),
            database: Box::new(database),
            broker: Box::new(broker),
            daemon: Box::new(daemon),
        }
    }

    /// Probes backed by the real database, broker and daemon clients.
    pub fn live(log: LogLevelControl) -> Self {
        Self::new(
            RepositoryProbe,
            DatabaseProbe::new(PgConnector, log.clone()),
            BrokerProbe::new(AmqpConnector, log),
            DaemonProbe,
        )
    }

    fn get(&self, kind: ProbeKind) -> &dyn ServiceProbe {
        match kind {
            ProbeKind::Repository => self.repository.as_ref(),
            ProbeKind::Database => self.database.as_ref(),
            ProbeKind::Broker => self.broker.as_ref(),
            ProbeKind::Daemon => self.daemon.as_ref(),
        }
    }
}

pub struct HealthSequencer<S> {
    source: S,
    probes: ProbeSet,
    reporter: StatusReporter,
}

impl<S: ProfileSource> HealthSequencer<S> {
    pub fn new(source: S, probes: ProbeSet, reporter: StatusReporter) -> Self {
        Self {
            source,
            probes,
            reporter,
        }
    }

    /// Run every applicable check, writing one status line per check to `out`.
    ///
    /// Only write errors on `out` are returned; check failures end up in
    /// the outcome.
    pub async fn run<W: Write + ?Sized>(
        &self,
        options: RunOptions,
        out: &mut W,
    ) -> io::Result<RunOutcome> {
        let mut stage = Stage::Init;
        let mut ctx: Option<ProfileContext> = None;
        let mut outcome: Option<RunOutcome> = None;

        while let Some(step) = next_step(stage, options) {
            stage = match step {
                Step::ResolveProfile { resolved, failed } => match self.source.resolve() {
                    Ok(profile) => {
                        let line = CheckResult::up(PROFILE, format!("On profile {}", profile.name));
                        self.emit(out, &line)?;
                        ctx = Some(profile);
                        outcome = Some(RunOutcome::resolved(line));
                        resolved
                    }
                    Err(e) => {
                        tracing::warn!("Profile resolution failed: {}", e);
                        let line =
                            CheckResult::error(PROFILE, "Unable to read profile").with_cause(e);
                        self.emit(out, &line)?;
                        outcome = Some(RunOutcome::fatal(line));
                        failed
                    }
                },
                Step::Probe(kind, next) => {
                    let (Some(ctx), Some(outcome)) = (ctx.as_ref(), outcome.as_mut()) else {
                        return Err(out_of_order(stage));
                    };
                    let result = self.probes.get(kind).probe(ctx).await;
                    self.emit(out, &result)?;
                    outcome.record(result);
                    next
                }
                Step::Finish => Stage::Done,
            };
        }

        let outcome = outcome.ok_or_else(|| out_of_order(stage))?;
        tracing::debug!(stage = ?stage, exit_code = ?outcome.exit_code, "Run finished");
        Ok(outcome)
    }

    fn emit<W: Write + ?Sized>(&self, out: &mut W, result: &CheckResult) -> io::Result<()> {
        writeln!(out, "{}", self.reporter.format_result(result))?;
        out.flush()
    }
}

fn out_of_order(stage: Stage) -> io::Error {
    io::Error::new(
        io::ErrorKind::Other,
        format!("probe step reached without a resolved profile at {stage:?}"),
    )
}
