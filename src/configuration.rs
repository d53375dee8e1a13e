//! Config for the dealer and player processes
//!
//! Configuration can be created programmatically using [`Configuration::new()`] or by reading
//! environment variables using [`Configuration::from_env()`].
//!
//! # Environment Variables
//!
//! The following environment variables can be used to override configuration values. All
//! values are optional. Set flags to `"true"` (case-insensitive) to enable them.
//!
//! - `RACE_VERBOSE`: Print the final scores (default: `true`)
//! - `RACE_LOG`: Enable logging to a file (default: `false`)
//! - `RACE_STRATEGY`: Player strategy, `a` (cascade) or `b` (convert) (default: `a`)
//! - `RACE_DEBUG_PLAYER_STDERR`: Keep the stderr of spawned players (default: `false`)
//! - `RACE_SHUTDOWN_TIMEOUT_MS`: How long the dealer waits for players to hang up (default: `1000`)

use std::time::Duration;

use tracing::warn;

use crate::strategy::StrategyKind;

/// Configuration for dealer and player behaviors.
#[derive(Debug, Clone, Copy)]
pub struct Configuration {
    pub(crate) verbose: bool,
    pub(crate) log: bool,
    pub(crate) strategy: StrategyKind,
    pub(crate) debug_player_stderr: bool,
    pub(crate) shutdown_timeout: Duration,
}

impl Configuration {
    /// Create a new configuration with default parameters.
    ///
    /// By default:
    /// - Final scores are printed to stdout.
    /// - Logging to file is disabled.
    /// - Players use the cascade strategy.
    /// - Player stderr output is discarded.
    /// - The dealer waits up to one second for players to hang up.
    pub fn new() -> Self {
        Self {
            verbose: true,
            log: false,
            strategy: StrategyKind::Cascade,
            debug_player_stderr: false,
            shutdown_timeout: Duration::from_millis(1000),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Unset or unreadable variables keep their default value.
    pub fn from_env() -> Self {
        fn get_env_flag(var: &str, default: bool) -> bool {
            match std::env::var(var) {
                Ok(val) => val.eq_ignore_ascii_case("true"),
                Err(_) => default,
            }
        }

        let defaults = Self::new();
        let strategy = match std::env::var("RACE_STRATEGY") {
            Ok(val) => val.parse().unwrap_or_else(|e| {
                warn!("{e}, using {}", defaults.strategy);
                defaults.strategy
            }),
            Err(_) => defaults.strategy,
        };
        let shutdown_timeout = std::env::var("RACE_SHUTDOWN_TIMEOUT_MS")
            .ok()
            .and_then(|val| val.parse().ok())
            .map_or(defaults.shutdown_timeout, Duration::from_millis);

        Self {
            verbose: get_env_flag("RACE_VERBOSE", defaults.verbose),
            log: get_env_flag("RACE_LOG", defaults.log),
            strategy,
            debug_player_stderr: get_env_flag("RACE_DEBUG_PLAYER_STDERR", defaults.debug_player_stderr),
            shutdown_timeout,
        }
    }

    /// Enable or disable printing of the final scores.
    pub fn with_verbose(mut self, value: bool) -> Self {
        self.verbose = value;
        self
    }

    /// Enable or disable logging to file.
    pub fn with_log(mut self, value: bool) -> Self {
        self.log = value;
        self
    }

    /// Select the strategy used by players.
    pub fn with_strategy(mut self, value: StrategyKind) -> Self {
        self.strategy = value;
        self
    }

    /// Enable or disable player stderr output (debug purposes only).
    pub fn with_debug_player_stderr(mut self, value: bool) -> Self {
        self.debug_player_stderr = value;
        self
    }

    /// How long the dealer waits for sessions to end once the game is over.
    pub fn with_shutdown_timeout(mut self, value: Duration) -> Self {
        self.shutdown_timeout = value;
        self
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn log(&self) -> bool {
        self.log
    }

    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    pub fn debug_player_stderr(&self) -> bool {
        self.debug_player_stderr
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod configuration_tests {
    use super::*;

    #[test]
    fn builders() {
        let config = Configuration::new()
            .with_verbose(false)
            .with_log(true)
            .with_strategy(StrategyKind::Convert)
            .with_shutdown_timeout(Duration::from_millis(5));
        assert!(!config.verbose());
        assert!(config.log());
        assert_eq!(config.strategy(), StrategyKind::Convert);
        assert!(!config.debug_player_stderr());
        assert_eq!(config.shutdown_timeout, Duration::from_millis(5));
    }
}
