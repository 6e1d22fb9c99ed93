//! Logging for the `notebook` binary and library.
//!
//! Server and client commands share one tracing subscriber writing to
//! stderr, so `--format json` output on stdout stays machine-readable.
//! HTTP request spans from `tower_http` follow the crate's own level.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How much the CLI logs, chosen with `-q` and `-v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// `-q`: errors only.
    Quiet,
    /// No flags: lifecycle events such as notes created and servers started.
    #[default]
    Normal,
    /// `-v`: every request and snapshot.
    Verbose,
    /// `-vv` or more: wire-level detail.
    Trace,
}

impl Verbosity {
    /// Pick a level from the CLI flags. `quiet` wins over any `-v`.
    #[must_use]
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, _) => Self::Trace,
        }
    }

    /// The most detailed level that gets through.
    #[must_use]
    pub fn level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// The filter directive used when `RUST_LOG` is not set.
    #[must_use]
    pub fn default_directive(self) -> String {
        let level = self.level();
        format!("notebook={level},tower_http={level}")
    }
}

fn env_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.default_directive()))
}

/// Install the global subscriber.
///
/// `RUST_LOG`, when set, replaces the directive derived from `verbosity`.
/// Only the first call has any effect.
///
/// ```no_run
/// use notebook::{init_logging, logging::Verbosity};
///
/// // What `notebook -v serve` does.
/// init_logging(Verbosity::from_flags(false, 1));
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let _ = tracing_subscriber::registry()
        .with(env_filter(verbosity))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(false)
                .with_line_number(false),
        )
        .try_init();
}

/// Route warnings from code under test through the test harness.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("notebook=warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_overrides_verbose_flags() {
        assert_eq!(Verbosity::from_flags(true, 0), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(true, 3), Verbosity::Quiet);
    }

    #[test]
    fn test_each_v_raises_detail() {
        assert_eq!(Verbosity::from_flags(false, 0), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(false, 1), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(false, 2), Verbosity::Trace);
        assert_eq!(Verbosity::from_flags(false, 9), Verbosity::Trace);
    }

    #[test]
    fn test_levels_are_ordered() {
        let levels: Vec<Level> = [
            Verbosity::Quiet,
            Verbosity::Normal,
            Verbosity::Verbose,
            Verbosity::Trace,
        ]
        .into_iter()
        .map(Verbosity::level)
        .collect();
        assert_eq!(
            levels,
            vec![Level::ERROR, Level::INFO, Level::DEBUG, Level::TRACE]
        );
    }

    #[test]
    fn test_directive_covers_http_spans() {
        assert_eq!(
            Verbosity::Verbose.default_directive(),
            "notebook=DEBUG,tower_http=DEBUG"
        );
        assert_eq!(
            Verbosity::Quiet.default_directive(),
            "notebook=ERROR,tower_http=ERROR"
        );
    }

    #[test]
    fn test_directive_parses_as_filter() {
        for verbosity in [Verbosity::Normal, Verbosity::Trace] {
            assert!(EnvFilter::try_new(verbosity.default_directive()).is_ok());
        }
    }

    #[test]
    fn test_repeated_init_is_harmless() {
        init_test_logging();
        init_logging(Verbosity::Normal);
        init_logging(Verbosity::Trace);
    }
}
