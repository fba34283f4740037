//! Status lines.

use owo_colors::{OwoColorize, Stream, Style};

/// Style `text` for stderr, honoring the color override set at startup.
pub(crate) fn paint(text: &str, style: Style) -> String {
    text.if_supports_color(Stream::Stderr, |t| t.style(style))
        .to_string()
}

pub fn success(message: &str) {
    eprintln!("{} {}", paint("✓", Style::new().green().bold()), message);
}

pub fn info(message: &str) {
    eprintln!("{} {}", paint("ℹ", Style::new().blue().bold()), message);
}

/// A variant excluded by `--file` or `--playground`.
pub fn skipped(message: &str) {
    eprintln!(
        "{} {}",
        paint("-", Style::new().dimmed()),
        paint(message, Style::new().dimmed())
    );
}

pub fn warning(message: &str) {
    eprintln!(
        "{} {}",
        paint("⚠", Style::new().yellow().bold()),
        paint(message, Style::new().yellow())
    );
}

pub fn error(message: &str) {
    eprintln!(
        "{} {}",
        paint("✗", Style::new().red().bold()),
        paint(message, Style::new().red())
    );
}
