//! Terminal UI.

use console::Term;
use std::io::Write;

use super::{should_use_colors, OutputMode, ReviewTheme, UserInterface};

/// Terminal UI implementation.
///
/// Reports go to stdout so they can be piped; status messages, warnings and
/// errors go to stderr.
pub struct TerminalUI {
    out: Term,
    status: Term,
    theme: ReviewTheme,
    mode: OutputMode,
}

impl TerminalUI {
    /// Create a new terminal UI.
    pub fn new(mode: OutputMode) -> Self {
        let theme = if should_use_colors() {
            ReviewTheme::new()
        } else {
            ReviewTheme::plain()
        };

        Self {
            out: Term::stdout(),
            status: Term::stderr(),
            theme,
            mode,
        }
    }

    pub fn theme(&self) -> &ReviewTheme {
        &self.theme
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.status, "{}", msg).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.status, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        writeln!(self.status, "{}", self.theme.format_warning(msg)).ok();
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.status, "{}", self.theme.format_error(msg)).ok();
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            writeln!(self.status, "{}", self.theme.format_header(title)).ok();
        }
    }

    fn report(&mut self, text: &str) {
        for line in text.lines() {
            writeln!(self.out, "{}", self.theme.format_report_line(line)).ok();
        }
    }

    fn is_interactive(&self) -> bool {
        self.status.is_term()
    }
}

/// Create the UI for the given output mode.
pub fn create_ui(mode: OutputMode) -> Box<dyn UserInterface> {
    Box::new(TerminalUI::new(mode))
}
