//! ui::output
//!
//! Status and error reporting for the CLI.
//!
//! # Design
//!
//! Status lines go to stdout and are dropped under `--quiet`. Warnings,
//! errors and `--debug` notes go to stderr. A failed command prints one line: `refused:` when a
//! case entry point or observer vetoed the mutation, `error:` for anything
//! else (bad input, unreadable files).

use std::fmt::Display;

use crate::case::CaseError;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Status lines suppressed
    Quiet,
    Normal,
    /// Normal output plus `[debug]` notes
    Debug,
}

impl Verbosity {
    /// Quiet wins over debug.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }

    fn shows_status(self) -> bool {
        self != Verbosity::Quiet
    }
}

/// Print a status line, such as the outcome of an edit.
pub fn status(message: impl Display, verbosity: Verbosity) {
    if verbosity.shows_status() {
        println!("{}", message);
    }
}

/// Print a note only shown under `--debug`.
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("[debug] {}", message);
    }
}

/// Print a warning.
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity.shows_status() {
        eprintln!("warning: {}", message);
    }
}

/// Report the error a command failed with. Always shown.
pub fn error(err: &anyhow::Error) {
    eprintln!("{}", error_line(err));
}

fn error_line(err: &anyhow::Error) -> String {
    match err.downcast_ref::<CaseError>() {
        Some(CaseError::Rejected(rejected)) => format!("refused: {rejected}"),
        _ => format!("error: {err:#}"),
    }
}
