//! # config.rs – Centralized Parameter Store
//!
//! This module holds the static rig parameters and the runtime [`Settings`].
//! Constants are the defaults; [`Settings`] is what the running system actually uses,
//! built from an optional JSON file and `key::value` command-line overrides (see [crate::init]).

use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

//
// ──────────────────────────────────────────────────────────────
//   1. NETWORK SETTINGS
// ──────────────────────────────────────────────────────────────
//

/// Host the rig/simulator listens on
pub const DEFAULT_HOST: &str = "localhost";

/// Port the rig/simulator listens on
pub const DEFAULT_PORT: u16 = 4711;

/// Delay between connection attempts while the rig is not up yet
pub const RECONNECT_DELAY: Duration = Duration::from_millis(100);

/// Upper bound on a single outbound write before the connection is considered broken
pub const WRITE_TIMEOUT: Duration = Duration::from_millis(1000);

//
// ──────────────────────────────────────────────────────────────
//   2. FLEET & FLOOR PARAMETERS
// ──────────────────────────────────────────────────────────────
//

/// Default number of cars in the fleet
pub const DEFAULT_NUM_CARS: u8 = 1;

/// Default top floor (rig numbering, floors are `0..=top`)
pub const DEFAULT_TOP_FLOOR: i32 = 5;

/// Internal floor scale. Floor 4 is stored as 400.
pub const FLOOR_SCALE: i32 = 100;

/// Maximum scaled distance still counted as "arrived" (inclusive)
pub const ARRIVAL_TOLERANCE: i32 = 6;

/// Panel argument meaning "stop now" instead of a destination floor
pub const STOP_SENTINEL: i32 = 32000;

//
// ──────────────────────────────────────────────────────────────
//   3. TIMING
// ──────────────────────────────────────────────────────────────
//

/// Period of each car's control loop
pub const TICK_PERIOD: Duration = Duration::from_millis(10);

/// How long the doors stay open on arrival
pub const DOOR_OPEN_DWELL: Duration = Duration::from_millis(2000);

/// Hold after the door-close command before the car moves on
pub const DOOR_CLOSE_DWELL: Duration = Duration::from_millis(500);

//
// ──────────────────────────────────────────────────────────────
//   4. LOGGING CONFIGURATION
// ──────────────────────────────────────────────────────────────
//

/// Enable/disable printing of errors
pub static PRINT_ERR_ON: AtomicBool = AtomicBool::new(true);

/// Enable/disable printing of warnings
pub static PRINT_WARN_ON: AtomicBool = AtomicBool::new(true);

/// Enable/disable printing of success messages
pub static PRINT_OK_ON: AtomicBool = AtomicBool::new(true);

/// Enable/disable printing of general info
pub static PRINT_INFO_ON: AtomicBool = AtomicBool::new(true);

/// Enable/disable the fleet table printed after every hall call assignment
pub static PRINT_FLEET_ON: AtomicBool = AtomicBool::new(false);

//
// ──────────────────────────────────────────────────────────────
//   5. RUNTIME SETTINGS
// ──────────────────────────────────────────────────────────────
//

/// Runtime settings. Every field falls back to the constants above when missing
/// from the settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Number of cars, IDs are `1..=cars`
    pub cars: u8,
    /// Highest floor in rig numbering
    pub top_floor: i32,
    /// Rig host
    pub host: String,
    /// Rig port
    pub port: u16,
    /// Arrival tolerance in scaled units
    pub tolerance: i32,
    /// Control loop period in milliseconds
    pub tick_ms: u64,
    /// Door-open dwell in milliseconds
    pub door_open_ms: u64,
    /// Door-close dwell in milliseconds
    pub door_close_ms: u64,
    /// Outbound write timeout in milliseconds
    pub write_timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cars: DEFAULT_NUM_CARS,
            top_floor: DEFAULT_TOP_FLOOR,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            tolerance: ARRIVAL_TOLERANCE,
            tick_ms: TICK_PERIOD.as_millis() as u64,
            door_open_ms: DOOR_OPEN_DWELL.as_millis() as u64,
            door_close_ms: DOOR_CLOSE_DWELL.as_millis() as u64,
            write_timeout_ms: WRITE_TIMEOUT.as_millis() as u64,
        }
    }
}

impl Settings {
    /// Reads settings from a JSON file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Rejects configurations the dispatcher cannot run with.
    ///
    /// An empty fleet is rejected here so the assignment algorithm never has to
    /// handle "no candidate" at call time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cars == 0 {
            return Err(ConfigError::EmptyFleet);
        }
        if self.top_floor < 0 || self.top_floor >= STOP_SENTINEL {
            return Err(ConfigError::TopFloor(self.top_floor));
        }
        if !(0..FLOOR_SCALE / 2).contains(&self.tolerance) {
            return Err(ConfigError::Tolerance(self.tolerance));
        }
        if self.tick_ms == 0 {
            return Err(ConfigError::ZeroTick);
        }
        Ok(())
    }

    /// `host:port` of the rig
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Timing parameters handed to every car loop
    pub fn timing(&self) -> Timing {
        Timing {
            tick: Duration::from_millis(self.tick_ms),
            door_open: Duration::from_millis(self.door_open_ms),
            door_close: Duration::from_millis(self.door_close_ms),
            tolerance: self.tolerance,
        }
    }

    /// Input limits the gateway validates against
    pub fn limits(&self) -> Limits {
        Limits { cars: self.cars, top_floor: self.top_floor, tolerance: self.tolerance }
    }

    /// Outbound write timeout
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

/// Per-car timing and arrival parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Control loop period
    pub tick: Duration,
    /// Door-open hold
    pub door_open: Duration,
    /// Door-close hold
    pub door_close: Duration,
    /// Arrival tolerance, scaled units
    pub tolerance: i32,
}

impl Default for Timing {
    fn default() -> Self {
        Settings::default().timing()
    }
}

/// Range checks for inbound protocol arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Valid car IDs are `1..=cars`
    pub cars: u8,
    /// Valid floors are `0..=top_floor`
    pub top_floor: i32,
    /// Overshoot allowed on a position report past either end of the shaft, scaled units
    pub tolerance: i32,
}
