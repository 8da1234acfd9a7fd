use tracing::subscriber::set_global_default;
use tracing::Subscriber;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, reload, EnvFilter, Registry};

use anyhow::Context;

/// Filter applied while a probe runs in quiet mode.
const QUIET_DIRECTIVE: &str = "off";

type FilterHandle = reload::Handle<EnvFilter, Registry>;

pub fn get_subscriber(
    name: String,
    env_filter: String,
) -> (impl Subscriber + Send + Sync, LogLevelControl) {
    // RUST_LOG wins over the level picked on the command line
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));
    let (filter_layer, handle) = reload::Layer::new(env_filter);

    // Status lines own stdout, so log records go to stderr.
    let formatting_layer = BunyanFormattingLayer::new(name, std::io::stderr);

    let subscriber = Registry::default()
        .with(filter_layer)
        .with(JsonStorageLayer)
        .with(formatting_layer);

    (subscriber, LogLevelControl::new(handle))
}

pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) -> anyhow::Result<()> {
    // redirect `log` records from client libraries to the tracing subscriber
    LogTracer::init().context("Failed to set logger.")?;
    set_global_default(subscriber).context("Failed to set subscriber.")?;
    Ok(())
}

/// Runtime control over the installed log filter.
///
/// A disabled control (no subscriber installed, or tests) hands out
/// guards that do nothing.
#[derive(Clone, Default)]
pub struct LogLevelControl {
    handle: Option<FilterHandle>,
}

impl LogLevelControl {
    pub fn new(handle: FilterHandle) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    /// Silence all logging until the returned guard is dropped.
    pub fn quiet(&self) -> QuietGuard {
        let Some(handle) = self.handle.clone() else {
            return QuietGuard::noop();
        };

        let mut previous = None;
        let swapped = handle.modify(|filter| {
            previous = Some(std::mem::replace(filter, EnvFilter::new(QUIET_DIRECTIVE)));
        });
        if let Err(err) = swapped {
            tracing::debug!("Unable to enter quiet mode: {}", err);
            return QuietGuard::noop();
        }

        QuietGuard {
            handle: Some(handle),
            previous,
        }
    }
}

/// Restores the previous log filter on drop.
#[must_use = "logging is restored as soon as the guard is dropped"]
pub struct QuietGuard {
    handle: Option<FilterHandle>,
    previous: Option<EnvFilter>,
}

impl QuietGuard {
    fn noop() -> Self {
        Self {
            handle: None,
            previous: None,
        }
    }
}

impl Drop for QuietGuard {
    fn drop(&mut self) {
        if let (Some(handle), Some(previous)) = (self.handle.take(), self.previous.take()) {
            if let Err(err) = handle.modify(|filter| *filter = previous) {
                tracing::warn!("Failed to restore log level: {}", err);
            }
        }
    }
}
