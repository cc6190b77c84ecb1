//! Logging infrastructure for the vedit CLI.
//!
//! Structured logging through `tracing`. Verbosity comes from the global
//! `--verbose`/`--quiet` flags, falling back to `RUST_LOG`.
//!
//! # Example
//!
//! ```rust,no_run
//! use vedit_cli::logger::init_logger;
//! use tracing::{debug, info};
//!
//! init_logger(false, false, false);
//!
//! info!("Starting mutation server");
//! debug!("Resolved {}", "@/data/prices");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used by `--verbose`.
pub const VERBOSE_FILTER: &str =
    "vedit=debug,vedit_cli=debug,vedit_analysis=debug,vedit_annotate=debug,vedit_config=debug,tower_http=debug";

/// Filter used when neither a flag nor `RUST_LOG` is given.
pub const DEFAULT_FILTER: &str = "vedit=info,vedit_cli=info,vedit_analysis=warn,vedit_annotate=info";

/// Initialize the tracing subscriber with the specified options.
///
/// Call once at the start of the program, before any logging occurs.
///
/// The level is chosen in this order:
/// 1. `--verbose`: DEBUG for vedit crates
/// 2. `--quiet`: ERROR only
/// 3. `RUST_LOG`
/// 4. [`DEFAULT_FILTER`]
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && should_use_colors())
        .with_writer(std::io::stderr)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

/// Check if colored output should be enabled.
///
/// - `NO_COLOR`: if set, disables colors
/// - `FORCE_COLOR`: if set, forces colors even in non-TTY
pub fn should_use_colors() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    console::Term::stderr().features().colors_supported()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_should_use_colors_respects_no_color() {
        unsafe {
            std::env::set_var("NO_COLOR", "1");
            std::env::set_var("FORCE_COLOR", "1");
        }
        assert!(!should_use_colors());
        unsafe {
            std::env::remove_var("NO_COLOR");
            std::env::remove_var("FORCE_COLOR");
        }
    }

    #[test]
    #[serial]
    fn test_should_use_colors_respects_force_color() {
        unsafe {
            std::env::remove_var("NO_COLOR");
            std::env::set_var("FORCE_COLOR", "1");
        }
        assert!(should_use_colors());
        unsafe {
            std::env::remove_var("FORCE_COLOR");
        }
    }

    #[test]
    fn test_filters_parse() {
        let _verbose = EnvFilter::new(VERBOSE_FILTER);
        let _default = EnvFilter::new(DEFAULT_FILTER);
    }
}
