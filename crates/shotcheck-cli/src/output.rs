//! Terminal output for record / verify runs

use crate::config::CliConfig;
use console::{style, Term};
use shotcheck::{Mismatch, RecordSummary, VerificationResult, VerificationSummary};

/// Prints run results to stdout
#[derive(Debug)]
pub struct Reporter {
    term: Term,
    use_color: bool,
    quiet: bool,
    verbose: bool,
}

impl Reporter {
    /// Create a reporter for the given configuration
    #[must_use]
    pub fn new(config: &CliConfig) -> Self {
        Self {
            term: Term::stdout(),
            use_color: config.color.should_color(),
            quiet: config.verbosity.is_quiet(),
            verbose: config.verbosity.is_verbose(),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        let _ = self.term.write_line(&self.line("✓", "PASS", message, Status::Pass));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        let _ = self.term.write_line(&self.line("✗", "FAIL", message, Status::Fail));
    }

    /// Summarize a record run
    pub fn recorded(&self, summary: &RecordSummary) {
        if self.verbose {
            for path in &summary.written {
                let _ = self.term.write_line(&format!("  {}", path.display()));
            }
        }
        self.success(&format!("Recorded {} screenshot(s)", summary.written.len()));
    }

    /// Summarize a successful verify run
    pub fn verified(&self, summary: &VerificationSummary) {
        if self.verbose {
            for result in &summary.results {
                if let VerificationResult::Match { name } = result {
                    self.success(name);
                }
            }
        }
        self.success(&format!("Verified {} screenshot(s)", summary.compared));
    }

    /// List mismatching screenshots
    pub fn mismatches(&self, mismatches: &[Mismatch]) {
        for mismatch in mismatches {
            let score = mismatch
                .rms
                .map_or_else(|| "size changed".to_string(), |rms| format!("rms {rms:.4}"));
            self.failure(&format!("{} ({score})", mismatch.name));
        }
    }

    fn line(&self, symbol: &str, plain: &str, message: &str, status: Status) -> String {
        if !self.use_color {
            return format!("{plain} {message}");
        }
        let prefix = match status {
            Status::Pass => style(symbol).green().bold(),
            Status::Fail => style(symbol).red().bold(),
        };
        format!("{prefix} {message}")
    }
}

#[derive(Debug, Clone, Copy)]
enum Status {
    Pass,
    Fail,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{ColorChoice, Verbosity};

    fn plain() -> Reporter {
        Reporter::new(&CliConfig::new().with_color(ColorChoice::Never))
    }

    #[test]
    fn test_plain_prefixes() {
        let reporter = plain();
        assert_eq!(reporter.line("✓", "PASS", "ok", Status::Pass), "PASS ok");
        assert_eq!(reporter.line("✗", "FAIL", "bad", Status::Fail), "FAIL bad");
    }

    #[test]
    fn test_colored_prefix_keeps_message() {
        let reporter = Reporter::new(&CliConfig::new().with_color(ColorChoice::Always));
        assert!(reporter
            .line("✓", "PASS", "home", Status::Pass)
            .ends_with(" home"));
    }

    #[test]
    fn test_quiet_flags() {
        let reporter = Reporter::new(
            &CliConfig::new()
                .with_verbosity(Verbosity::Quiet)
                .with_color(ColorChoice::Never),
        );
        assert!(reporter.quiet);
        assert!(!reporter.verbose);
    }
}
