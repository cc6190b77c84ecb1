//! Status messages for terminal output.
//!
//! Everything goes to stderr so stdout stays clean for annotated source and
//! JSON reports.

use console::style;

/// Print a success message to stderr.
///
/// ```no_run
/// use vedit_cli::ui::success;
///
/// success("Annotated 12 files");
/// ```
pub fn success(message: &str) {
    eprintln!("{} {}", style("✓").green().bold(), message);
}

/// Print an info message to stderr.
pub fn info(message: &str) {
    eprintln!("{} {}", style("ℹ").blue().bold(), message);
}

/// Print a warning message to stderr.
pub fn warning(message: &str) {
    eprintln!("{} {}", style("⚠").yellow().bold(), style(message).yellow());
}

/// Disable styling globally when colors are off.
pub fn init_colors(no_color: bool) {
    if no_color || !crate::logger::should_use_colors() {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }
}
