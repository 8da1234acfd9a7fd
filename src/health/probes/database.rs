use super::{bounded, ServiceProbe, DATABASE};
use crate::configuration::DatabaseSettings;
use crate::health::errors::ProbeError;
use crate::health::models::CheckResult;
use crate::health::profile::ProfileContext;
use crate::telemetry::LogLevelControl;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgSslMode};
use sqlx::Connection;

#[async_trait]
pub trait DatabaseConnector: Send + Sync {
    /// Open a connection, run a trivial query and close it.
    async fn ping(&self, settings: &DatabaseSettings) -> Result<(), ProbeError>;
}

/// PostgreSQL connector backed by sqlx.
pub struct PgConnector;

#[async_trait]
impl DatabaseConnector for PgConnector {
    async fn ping(&self, settings: &DatabaseSettings) -> Result<(), ProbeError> {
        let options = PgConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .username(&settings.username)
            .password(&settings.password)
            .database(&settings.database_name)
            .ssl_mode(PgSslMode::Prefer);

        let mut connection = PgConnection::connect_with(&options).await?;
        sqlx::query("SELECT 1 as health_check")
            .execute(&mut connection)
            .await?;
        connection.close().await?;

        Ok(())
    }
}

/// An unreachable database is reported DOWN, not ERROR.
pub struct DatabaseProbe {
    connector: Box<dyn DatabaseConnector>,
    log: LogLevelControl,
}

impl DatabaseProbe {
    pub fn new(connector: impl DatabaseConnector + 'static, log: LogLevelControl) -> Self {
        Self {
            connector: Box::new(connector),
            log,
        }
    }
}

#[async_trait]
impl ServiceProbe for DatabaseProbe {
    fn service(&self) -> &'static str {
        DATABASE
    }

    #[tracing::instrument(name = "Check database", skip(self, ctx))]
    async fn probe(&self, ctx: &ProfileContext) -> CheckResult {
        let endpoint = ctx.database.endpoint();

        let attempt = {
            // driver logging stays silent for the attempt only
            let _quiet = self.log.quiet();
            bounded(ctx.probe_timeout, self.connector.ping(&ctx.database)).await
        };

        match attempt {
            Ok(()) => CheckResult::up(self.service(), format!("Connected as {endpoint}")),
            Err(e) => {
                tracing::warn!("Database check failed: {}", e);
                CheckResult::down(self.service(), format!("Unable to connect as {endpoint}")).with_cause(e)
            }
        }
    }
}
