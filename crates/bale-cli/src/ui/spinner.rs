//! Spinner shown while a variant builds.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::Style;

use super::messages::paint;

/// Spinner for one variant build.
///
/// Hidden when stderr is not an attended terminal, so callers never branch on
/// whether it is visible.
///
/// ```no_run
/// use bale_cli::ui::Spinner;
///
/// let spinner = Spinner::new("Building standalone.js", true);
/// spinner.finish("Built standalone.js");
/// ```
pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str, visible: bool) -> Self {
        let pb = if visible {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        // The template is a literal; the fallback keeps the default style.
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style.tick_strings(&["◐", "◓", "◑", "◒", "✓"]));
        }
        pb.set_message(message.to_string());
        if visible {
            pb.enable_steady_tick(Duration::from_millis(100));
        }

        Self { pb }
    }

    pub fn is_hidden(&self) -> bool {
        self.pb.is_hidden()
    }

    /// Stop spinning and leave a success line behind.
    pub fn finish(&self, message: &str) {
        self.pb
            .finish_with_message(format!("{} {}", paint("✓", Style::new().green()), message));
    }

    /// Stop spinning and remove the line.
    pub fn clear(&self) {
        self.pb.finish_and_clear();
    }
}
