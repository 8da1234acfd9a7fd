use std::path::PathBuf;

use crate::console::commands::CallableTrait;
use crate::health::{ConfigProfileSource, ExitCode, ProfileContext, ProfileSource};

/// `stackcheck profile [--profile NAME]`
///
/// Prints the resolved profile without running any probe. Passwords are
/// masked.
pub struct ProfileCommand {
    pub config: Option<PathBuf>,
    pub profile: Option<String>,
}

impl ProfileCommand {
    pub fn new(config: Option<PathBuf>, profile: Option<String>) -> Self {
        Self { config, profile }
    }
}

pub fn describe(ctx: &ProfileContext) -> String {
    let repository = match ctx.repository_path() {
        Ok(path) => path.display().to_string(),
        Err(e) => format!("<{e}>"),
    };

    [
        ("Profile", ctx.name.clone()),
        ("Repository", repository),
        (
            "Database",
            format!("{}/{}", ctx.database.endpoint(), ctx.database.database_name),
        ),
        ("Broker", ctx.broker.redacted_url()),
        ("Timeout", format!("{}s", ctx.probe_timeout.as_secs())),
    ]
    .iter()
    .map(|(key, value)| format!("{:<12}{}", format!("{key}:"), value))
    .collect::<Vec<_>>()
    .join("\n")
}

impl CallableTrait for ProfileCommand {
    fn call(&self) -> Result<ExitCode, Box<dyn std::error::Error>> {
        let source = ConfigProfileSource::new(self.config.clone(), self.profile.clone());
        let ctx = source.resolve()?;
        println!("{}", describe(&ctx));
        Ok(ExitCode::Success)
    }
}
