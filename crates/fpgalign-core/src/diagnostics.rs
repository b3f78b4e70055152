//! User-facing diagnostic messages.
//!
//! These are deliberately separate from `tracing`'s leveled log output: two
//! specific message classes — `[Error] ` and `[Warning] ` prefixes, colored
//! when stderr is a terminal — are meant for a user running the CLI to see
//! regardless of `RUST_LOG`. `tracing` remains the channel for the
//! structured progress/debug output the ambient stack adds on top.

use colored::Colorize;

/// Prints a warning to stderr with the `[Warning] ` prefix, yellow when
/// stderr is a TTY. Used when a reference shorter than `window_size`
/// contributes no minimizers.
pub fn warn_user(message: &str) {
    let prefix = "[Warning] ";
    if atty_stderr() {
        eprintln!("{}{}", prefix.yellow(), message);
    } else {
        eprintln!("{prefix}{message}");
    }
}

/// Prints a fatal error to stderr with the `[Error] ` prefix, red when
/// stderr is a TTY. Callers exit with a nonzero status immediately after.
pub fn print_error(message: &str) {
    let prefix = "[Error] ";
    if atty_stderr() {
        eprintln!("{}{}", prefix.red(), message);
    } else {
        eprintln!("{prefix}{message}");
    }
}

fn atty_stderr() -> bool {
    use std::io::IsTerminal;
    std::io::stderr().is_terminal()
}
