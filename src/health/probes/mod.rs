//! One probe per dependency kind.
//!
//! A probe is total: backend failures are folded into the returned
//! [`CheckResult`], never propagated to the sequencer.

use crate::health::errors::ProbeError;
use crate::health::models::CheckResult;
use crate::health::profile::ProfileContext;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

pub mod broker;
pub mod daemon;
pub mod database;
pub mod repository;

pub use broker::{AmqpConnector, BrokerConnector, BrokerProbe};
pub use daemon::{DaemonClient, DaemonProbe, PidFileDaemonClient};
pub use database::{DatabaseConnector, DatabaseProbe, PgConnector};
pub use repository::RepositoryProbe;

pub const PROFILE: &str = "profile";
pub const REPOSITORY: &str = "repository";
pub const DATABASE: &str = "postgres";
pub const BROKER: &str = "rabbitmq";
pub const DAEMON: &str = "daemon";

#[async_trait]
pub trait ServiceProbe: Send + Sync {
    /// Name shown in the status line.
    fn service(&self) -> &'static str;

    async fn probe(&self, ctx: &ProfileContext) -> CheckResult;
}

/// Run a backend call under the probe's time limit.
pub(crate) async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, ProbeError>>,
) -> Result<T, ProbeError> {
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or(Err(ProbeError::Timeout(limit)))
}
