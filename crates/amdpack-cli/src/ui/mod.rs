//! Terminal output: status messages and human-readable formatting.
//!
//! ```no_run
//! use amdpack_cli::ui;
//!
//! ui::init_colors(false);
//! ui::success("Bundled dist/index.js");
//! ui::error("Compiler exited with code 2");
//! ```

mod format;
mod messages;

pub use format::{format_duration, format_size};
pub use messages::{debug, error, info, success, warning};

/// Check if color output should be enabled.
///
/// `NO_COLOR` wins over `FORCE_COLOR`; otherwise colors follow whether
/// stderr is a terminal.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::user_attended_stderr()
}

/// Apply the color decision to `owo-colors` for the rest of the process.
pub fn init_colors(no_color: bool) {
    owo_colors::set_override(!no_color && should_use_color());
}
