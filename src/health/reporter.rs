//! Status line rendering.

use crate::health::models::{CheckResult, ServiceState};
use colored::Colorize;

/// Width of the `service:` column.
const SERVICE_WIDTH: usize = 12;

#[derive(Debug, Clone, Copy)]
pub struct StatusReporter {
    color: bool,
}

impl StatusReporter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    /// `✔ postgres:    Connected as aiida@localhost:5432`
    pub fn format(&self, service: &str, state: ServiceState, detail: &str) -> String {
        let label = format!("{service}:");
        format!(
            "{} {:<width$} {}",
            self.marker(state),
            label,
            detail,
            width = SERVICE_WIDTH
        )
    }

    pub fn format_result(&self, result: &CheckResult) -> String {
        self.format(result.service(), result.state(), result.detail())
    }

    fn marker(&self, state: ServiceState) -> String {
        let symbol = symbol(state);
        if !self.color {
            return symbol.to_string();
        }
        match state {
            ServiceState::Up => symbol.green().to_string(),
            ServiceState::Down => symbol.red().to_string(),
            ServiceState::Error => symbol.yellow().to_string(),
        }
    }
}

pub fn symbol(state: ServiceState) -> &'static str {
    match state {
        ServiceState::Up => "✔",
        ServiceState::Down => "✘",
        ServiceState::Error => "⚠",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_plain_line() {
        let line = StatusReporter::plain().format(
            "postgres",
            ServiceState::Up,
            "Connected as aiida@localhost:5432",
        );
        assert_eq!(line, "✔ postgres:    Connected as aiida@localhost:5432");
    }

    #[test]
    fn test_every_state_has_a_distinct_marker() {
        let markers = [
            symbol(ServiceState::Up),
            symbol(ServiceState::Down),
            symbol(ServiceState::Error),
        ];
        assert_ne!(markers[0], markers[1]);
        assert_ne!(markers[0], markers[2]);
        assert_ne!(markers[1], markers[2]);
    }

    #[test]
    fn test_format_result_uses_detail_not_cause() {
        let result = CheckResult::error("rabbitmq", "Unable to connect to rabbitmq")
            .with_cause("IO error: Connection refused");
        let line = StatusReporter::plain().format_result(&result);
        assert_eq!(line, "⚠ rabbitmq:    Unable to connect to rabbitmq");
    }

    #[test]
    fn test_long_service_names_are_not_truncated() {
        let line = StatusReporter::plain().format("object-storage", ServiceState::Down, "offline");
        assert_eq!(line, "✘ object-storage: offline");
    }

    #[test]
    fn test_colored_line_keeps_symbol_and_detail() {
        let line = StatusReporter::new(true).format("daemon", ServiceState::Down, "not running");
        assert!(line.contains("✘"));
        assert!(line.ends_with("daemon:      not running"));
    }
}
