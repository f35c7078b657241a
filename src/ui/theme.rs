//! Visual theme and styling.

use console::Style;

use crate::check::Outcome;

/// Colors used by the terminal front end.
#[derive(Debug, Clone)]
pub struct ReviewTheme {
    /// Style for success messages (green).
    pub success: Style,
    /// Style for warning messages (orange).
    pub warning: Style,
    /// Style for error messages (red bold).
    pub error: Style,
    /// Style for dim/secondary text.
    pub dim: Style,
    /// Style for highlighted text (bold).
    pub highlight: Style,
    /// Style for headers (magenta bold).
    pub header: Style,
    /// Glyph style for passed checks.
    pub pass: Style,
    /// Glyph style for failed checks.
    pub fail: Style,
    /// Glyph style for checks awaiting a manual verdict.
    pub pending: Style,
    /// Glyph style for checks that do not apply.
    pub not_applicable: Style,
}

impl Default for ReviewTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewTheme {
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            dim: Style::new().dim(),
            highlight: Style::new().bold(),
            header: Style::new().bold().magenta(),
            pass: Style::new().green(),
            fail: Style::new().red().bold(),
            pending: Style::new().color256(208),
            not_applicable: Style::new().dim(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            dim: Style::new(),
            highlight: Style::new(),
            header: Style::new(),
            pass: Style::new(),
            fail: Style::new(),
            pending: Style::new(),
            not_applicable: Style::new(),
        }
    }

    pub fn outcome_style(&self, outcome: Outcome) -> &Style {
        match outcome {
            Outcome::Pass => &self.pass,
            Outcome::Fail => &self.fail,
            Outcome::Pending => &self.pending,
            Outcome::NotApplicable => &self.not_applicable,
        }
    }

    /// The outcome's glyph in its color.
    pub fn format_outcome(&self, outcome: Outcome) -> String {
        self.outcome_style(outcome)
            .apply_to(outcome.glyph())
            .to_string()
    }

    /// Color the leading glyph of a report result line.
    ///
    /// Lines that do not start with a glyph come back unchanged.
    pub fn format_report_line(&self, line: &str) -> String {
        for outcome in [
            Outcome::Pass,
            Outcome::Fail,
            Outcome::Pending,
            Outcome::NotApplicable,
        ] {
            if let Some(rest) = line.strip_prefix(outcome.glyph()) {
                return format!("{}{}", self.format_outcome(outcome), rest);
            }
        }
        line.to_string()
    }

    /// Format a success message (icon + text in green).
    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    /// Format a warning message (icon + text in orange).
    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    /// Format an error message (icon + text in red bold).
    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    /// Format a header banner.
    pub fn format_header(&self, title: &str) -> String {
        format!("{}", self.header.apply_to(format!("== {} ==", title)))
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}
