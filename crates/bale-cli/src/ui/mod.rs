//! Terminal output: status lines and a spinner for the variant being built.
//!
//! Everything goes to stderr. stdout is reserved for `bale list`.

mod messages;
mod spinner;

pub use messages::{error, info, skipped, success, warning};
pub use spinner::Spinner;

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "TRAVIS"]
        .iter()
        .any(|var| std::env::var(var).is_ok())
}

/// Whether colored output should be used.
///
/// Respects `NO_COLOR` and `FORCE_COLOR`, then falls back to whether stderr
/// is an attended terminal.
pub fn should_use_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }
    console::user_attended_stderr()
}

/// Apply the color decision to every styled writer.
pub fn init_colors(no_color: bool) {
    let enabled = !no_color && should_use_color();
    owo_colors::set_override(enabled);
    console::set_colors_enabled_stderr(enabled);
}

/// Spinners only make sense on an attended terminal outside CI.
pub fn use_spinner(quiet: bool) -> bool {
    !quiet && !is_ci() && console::user_attended_stderr()
}
