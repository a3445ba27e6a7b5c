//! Error types for the dispatcher.
//!
//! - [`ParseError`]: a single inbound line could not be turned into an event. Recovered
//!   locally by the gateway (logged, line skipped).
//! - [`ConfigError`]: the settings describe a system that cannot run. Raised before
//!   anything is spawned.
//!
//! Transport failures are not typed here; they travel as `anyhow::Error` with context
//! and end the task that hit them.

use thiserror::Error;

/// Why an inbound protocol line was discarded.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Blank line.
    #[error("empty line")]
    Empty,

    /// Leading token is not a known verb.
    #[error("unknown verb {0:?}")]
    UnknownVerb(String),

    /// Wrong number of arguments for the verb.
    #[error("verb '{verb}' expects {expected} arguments, got {got}")]
    ArgCount {
        /// The verb being parsed.
        verb: char,
        /// Arguments the verb takes.
        expected: usize,
        /// Arguments on the line.
        got: usize,
    },

    /// Argument is not a number of the expected kind.
    #[error("argument {0:?} is not a valid number")]
    NotNumeric(String),

    /// Car ID outside `1..=N`.
    #[error("car {0} does not exist")]
    UnknownCar(i64),

    /// Floor outside `0..=top`.
    #[error("floor {0} is outside the building")]
    FloorOutOfRange(i64),

    /// Hall call direction other than `1` or `-1`.
    #[error("direction {0} is neither 1 nor -1")]
    BadDirection(i64),
}

/// Settings that cannot produce a running system.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// N = 0.
    #[error("fleet must contain at least one car")]
    EmptyFleet,

    /// Top floor negative or colliding with the stop sentinel.
    #[error("top floor {0} is not usable")]
    TopFloor(i32),

    /// Tolerance must be in `0..50` so two floors never overlap.
    #[error("arrival tolerance {0} must be in 0..50")]
    Tolerance(i32),

    /// Tick period of zero would spin.
    #[error("tick period must be non-zero")]
    ZeroTick,

    /// Command-line value could not be parsed.
    #[error("invalid value {value:?} for '{key}'")]
    BadArgument {
        /// The `key` part of `key::value`.
        key: String,
        /// The rejected value.
        value: String,
    },

    /// Settings file could not be read.
    #[error("could not read settings file {path}: {source}")]
    Read {
        /// Path given on the command line.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Settings file is not valid JSON for [`crate::config::Settings`].
    #[error("invalid settings file: {0}")]
    Json(#[from] serde_json::Error),
}
