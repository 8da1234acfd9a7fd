pub mod errors;
pub mod models;
pub mod probes;
pub mod profile;
pub mod reporter;
pub mod sequencer;

pub use errors::{ProbeError, ProfileError};
pub use models::{CheckResult, ExitCode, RunOutcome, ServiceState};
pub use probes::ServiceProbe;
pub use profile::{select_profile, ConfigProfileSource, ProfileContext, ProfileSource};
pub use reporter::{symbol, StatusReporter};
pub use sequencer::{next_step, HealthSequencer, ProbeKind, ProbeSet, RunOptions, Stage, Step};
