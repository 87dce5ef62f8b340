// src/errors/mod.rs
//! Structured error reporting for the wrapper generator.
//!
//! Errors are grouped per pipeline stage the way the stages themselves are
//! split into modules. Everything except [`Error::Silent`] and
//! [`Error::Bug`] is reported with an `ERROR:` prefix on stderr; `Bug`
//! uses `BUG:` and a distinct exit code, and warnings use `WARN:` without
//! aborting the run.

pub mod analyze;
pub mod input;
pub mod parse;
pub mod resolve;

use std::path::PathBuf;

use thiserror::Error;

pub use analyze::{AnalyzeError, ImportConflict};
pub use input::InputError;
pub use parse::ParseError;
pub use resolve::{LoadError, ResolveError};

/// Filesystem failures around the input and output files.
#[derive(Error, Debug)]
pub enum FsError {
    #[error("failed to stat infile {path}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("infile {path} is not a file")]
    NotRegular { path: PathBuf },

    #[error("failed to get an absolute path of the infile {path}")]
    Absolutize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write source to outfile {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level error of one generator invocation.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Fs(#[from] FsError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Analyze(#[from] AnalyzeError),

    #[error(transparent)]
    ImportConflict(#[from] ImportConflict),

    /// Context wrapper naming the input that failed to resolve.
    #[error("failed to resolve {what} {sym}")]
    ResolveContext {
        what: &'static str,
        sym: String,
        #[source]
        source: ResolveError,
    },

    /// The caller asked for help; exit nonzero without a diagnostic line.
    #[error("")]
    Silent,

    /// Internal invariant violation.
    #[error("{0}")]
    Bug(String),
}

/// Shorthand for internal invariant violations.
pub fn bug(msg: impl Into<String>) -> Error {
    Error::Bug(msg.into())
}

/// Render an error and its source chain as a single `: `-joined line.
pub fn render_chain(err: &dyn std::error::Error) -> String {
    let mut line = err.to_string();
    let mut cur = err.source();
    while let Some(src) = cur {
        let text = src.to_string();
        if !text.is_empty() {
            line.push_str(": ");
            line.push_str(&text);
        }
        cur = src.source();
    }
    line
}

/// Print a warning with the `WARN:` prefix; the run continues.
pub fn warn(msg: impl AsRef<str>) {
    eprintln!("WARN: {}", msg.as_ref());
}

/// Report a top-level error and return the process exit code for it.
pub fn report(err: &Error) -> u8 {
    match err {
        Error::Silent => 1,
        Error::Bug(msg) => {
            eprintln!("BUG: {msg}");
            2
        }
        _ => {
            eprintln!("ERROR: {}", render_chain(err));
            1
        }
    }
}
