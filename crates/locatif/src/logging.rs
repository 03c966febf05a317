//! Tracing setup.
//!
//! Log lines go to stderr. `RUST_LOG` replaces the filter derived from the
//! command-line flags when it is set.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How much the binary logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only (`-q`).
    Quiet,
    /// Startup, writes and failures.
    #[default]
    Normal,
    /// Adds per-request traces and storage details (`-v`).
    Verbose,
    /// Everything (`-vv` and up).
    Trace,
}

impl Verbosity {
    /// Map the `-v` count and `-q` flag. `-q` wins.
    #[must_use]
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, _) => Self::Trace,
        }
    }

    /// The most detailed level shown.
    #[must_use]
    pub fn level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Filter for this crate and the HTTP trace layer, e.g.
    /// `locatif=INFO,tower_http=INFO`.
    #[must_use]
    pub fn directives(self) -> String {
        let level = self.level();
        format!("locatif={level},tower_http={level}")
    }
}

/// Install the global subscriber.
///
/// A second call keeps the first subscriber.
///
/// ```no_run
/// use locatif::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::from_flags(1, false));
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directives()));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(false)
                .with_line_number(false),
        )
        .try_init();
    if installed.is_err() {
        tracing::debug!("Logging already initialized");
    }
}
