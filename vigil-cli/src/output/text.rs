//! Text output formatting with colors.

use chrono::Local;
use std::path::Path;
use std::time::Duration;
use vigil_core::{CheckResult, CheckSpec, CheckStatus};
use vigil_store::Config;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats one result as a single line, padding the name to `width`.
    pub fn format_result(&self, result: &CheckResult, width: usize) -> String {
        let symbol = self.status_color(result.status, result.status.symbol());
        let status = self.status_color(result.status, &format!("{:<7}", result.status.label()));
        let elapsed = self.dim(&format!("({})", format_elapsed(result.duration)));

        format!(
            "{symbol} {:<width$}  {status} {} {elapsed}",
            result.name, result.message
        )
    }

    /// Formats every result plus a summary line.
    pub fn format_results(&self, results: &[CheckResult]) -> String {
        if results.is_empty() {
            return "No checks configured".to_string();
        }

        let width = results.iter().map(|r| r.name.len()).max().unwrap_or(0);
        let mut lines: Vec<String> = results
            .iter()
            .map(|r| self.format_result(r, width))
            .collect();

        let count = |status| results.iter().filter(|r| r.status == status).count();
        lines.push(String::new());
        lines.push(format!(
            "{} checks: {} up, {} down, {} unknown {}",
            results.len(),
            count(CheckStatus::Up),
            count(CheckStatus::Down),
            count(CheckStatus::Unknown),
            self.dim(&format!("at {}", Local::now().format("%H:%M:%S")))
        ));

        lines.join("\n")
    }

    /// Formats the effective configuration.
    pub fn format_config(&self, config: &Config, path: &Path) -> String {
        let mut lines = vec![
            self.bold("Vigil Configuration"),
            "─".repeat(40),
            String::new(),
            format!("Config file:    {}", path.display()),
            format!("Log level:      {}", config.log_level),
            format!("API port:       {}", config.api_port),
            format!(
                "Shutdown grace: {}",
                humantime::format_duration(config.shutdown_grace)
            ),
            String::new(),
            format!("Checks ({}):", config.checks.len()),
        ];

        for spec in &config.checks {
            lines.push(self.format_spec(spec));
        }

        lines.join("\n")
    }

    fn format_spec(&self, spec: &CheckSpec) -> String {
        let mut line = format!(
            "  • {} ({}) {}",
            self.bold(&spec.name),
            spec.kind,
            spec.target
        );
        let mut details = vec![
            format!("every {}", humantime::format_duration(spec.interval)),
            format!("timeout {}", humantime::format_duration(spec.timeout)),
        ];
        if spec.kind == vigil_core::CheckKind::Http {
            details.push(format!("expect {}", spec.expected_status()));
        }
        if !spec.kind.is_supported() {
            details.push(self.yellow("unsupported type"));
        }
        line.push_str(&self.dim(&format!(" [{}]", details.join(", "))));
        line
    }

    fn status_color(&self, status: CheckStatus, text: &str) -> String {
        match status {
            CheckStatus::Up => self.paint(GREEN, text),
            CheckStatus::Down => self.paint(RED, text),
            CheckStatus::Unknown => self.paint(YELLOW, text),
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

/// Milliseconds below a second, humantime above.
pub(super) fn format_elapsed(duration: Duration) -> String {
    if duration < Duration::from_secs(1) {
        format!("{}ms", duration.as_millis())
    } else {
        let rounded = Duration::from_millis(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX));
        humantime::format_duration(rounded).to_string()
    }
}
