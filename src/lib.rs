pub mod configuration;
pub mod console;
pub mod health;
pub mod helpers;
pub mod telemetry;
