//! Progress bar for a running derivation.

use indicatif::{ProgressBar, ProgressStyle};

use crate::constants::PROGRESS_SCALE;

pub struct DeriveProgress {
    bar: ProgressBar,
}

impl DeriveProgress {
    /// A bar on stderr, or a no-op bar when `visible` is false.
    pub fn new(visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::new(PROGRESS_SCALE)
        } else {
            ProgressBar::hidden()
        };
        let style = ProgressStyle::with_template("{spinner} {msg} [{bar:30}] {percent:>3}% {elapsed}")
            .map(|style| style.progress_chars("=> "))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.set_message("Stretching key");
        Self { bar }
    }

    /// Show `fraction` (0..=1) of the work as done.
    pub fn update(&self, fraction: f64) {
        let position = (fraction.clamp(0.0, 1.0) * PROGRESS_SCALE as f64).round() as u64;
        self.bar.set_position(position);
        self.bar.tick();
    }

    pub fn restarted(&self) {
        self.bar.set_message("Restarting");
        self.bar.set_position(0);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    pub fn abandon(&self, message: &'static str) {
        self.bar.abandon_with_message(message);
    }
}
