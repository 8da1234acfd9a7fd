mod callable;
pub mod profile;
pub mod status;

pub use callable::*;
pub use profile::ProfileCommand;
pub use status::StatusCommand;
