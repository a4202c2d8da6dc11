//! Utilities: logging setup (verbosity flags -> tracing filter).
//!
//! Key items:
//!   init_logging / derive_level
//!
//! Logs go to stderr; stdout is reserved for command output.

/// Logging helpers.
pub mod logging {
    use tracing_subscriber::EnvFilter;

    /// Overrides the level derived from `-v` / `-q` when set (any `EnvFilter` directive).
    pub const LOG_ENV: &str = "CMDTREE_LOG";

    #[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
    pub enum LogLevel {
        Error = 0,
        Info = 1,
        Debug = 2,
        Trace = 3,
    }

    impl LogLevel {
        pub fn as_directive(&self) -> &'static str {
            match self {
                LogLevel::Error => "error",
                LogLevel::Info => "info",
                LogLevel::Debug => "debug",
                LogLevel::Trace => "trace",
            }
        }
    }

    pub fn derive_level(verbose: u8, quiet: bool) -> LogLevel {
        if quiet {
            return LogLevel::Error;
        }
        match verbose {
            0 => LogLevel::Info,
            1 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    /// Install the global subscriber. Safe to call more than once.
    pub fn init_logging(level: LogLevel) {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(level >= LogLevel::Debug)
            .with_writer(std::io::stderr)
            .try_init();
    }
}

pub use logging::{derive_level, init_logging};

#[cfg(test)]
mod tests {
    use super::logging::LogLevel;
    use super::*;

    #[test]
    fn quiet_wins_over_verbose() {
        assert_eq!(derive_level(2, true), LogLevel::Error);
    }

    #[test]
    fn verbosity_steps() {
        assert_eq!(derive_level(0, false), LogLevel::Info);
        assert_eq!(derive_level(1, false), LogLevel::Debug);
        assert_eq!(derive_level(5, false), LogLevel::Trace);
        assert_eq!(LogLevel::Debug.as_directive(), "debug");
    }

    #[test]
    fn init_twice_is_harmless() {
        init_logging(LogLevel::Error);
        init_logging(LogLevel::Trace);
    }
}
