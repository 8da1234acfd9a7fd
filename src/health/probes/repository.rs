use super::{ServiceProbe, REPOSITORY};
use crate::health::models::CheckResult;
use crate::health::profile::ProfileContext;
use async_trait::async_trait;

/// Reads the repository location off the profile.
pub struct RepositoryProbe;

#[async_trait]
impl ServiceProbe for RepositoryProbe {
    fn service(&self) -> &'static str {
        REPOSITORY
    }

    #[tracing::instrument(name = "Check repository", skip(self, ctx))]
    async fn probe(&self, ctx: &ProfileContext) -> CheckResult {
        match ctx.repository_path() {
            Ok(path) => CheckResult::up(self.service(), path.display().to_string()),
            Err(e) => {
                tracing::warn!("Repository check failed: {}", e);
                CheckResult::error(self.service(), "Error with repo folder").with_cause(e)
            }
        }
    }
}
