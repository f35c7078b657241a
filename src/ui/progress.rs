//! Check run progress display.

use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::scheduler::{CheckRecord, RunObserver};

const TEMPLATE: &str = "{spinner:.magenta} [{pos}/{len}] {wide_msg}";

/// Progress bar on stderr advanced by the scheduler.
pub struct CheckProgress {
    bar: ProgressBar,
    start_time: Instant,
    failed: usize,
}

impl CheckProgress {
    /// Create a progress display; `visible` false draws nothing.
    pub fn new(visible: bool) -> Self {
        let bar = if visible {
            let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
            bar.set_style(
                ProgressStyle::default_bar()
                    .template(TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "),
            );
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        } else {
            ProgressBar::hidden()
        };

        Self {
            bar,
            start_time: Instant::now(),
            failed: 0,
        }
    }

    /// Create without drawing (for quiet mode and non-terminals).
    pub fn hidden() -> Self {
        Self::new(false)
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Remove the bar and return the run time.
    pub fn finish(self) -> Duration {
        self.bar.finish_and_clear();
        self.start_time.elapsed()
    }
}

impl RunObserver for CheckProgress {
    fn check_started(&mut self, name: &str, position: usize, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(position as u64);
        self.bar.set_message(name.to_string());
    }

    fn check_finished(&mut self, record: &CheckRecord) {
        if record.is_failed() {
            self.failed += 1;
        }
        self.bar.inc(1);
    }
}

/// Format a duration for display.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", d.as_millis())
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = secs / 60.0;
        format!("{:.1}m", mins)
    }
}
