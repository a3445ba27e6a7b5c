//! Startup: argument parsing and connecting to the rig.

use std::path::Path;
use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::Result;
use tokio::net::TcpStream;
use tokio::time::sleep;

use crate::config::{self, Settings};
use crate::error::ConfigError;
use crate::print;

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Startup {
    /// Run with these settings
    Run(Settings),
    /// Print usage and exit
    Help,
}

/// Builds [`Settings`] from the command line.
///
/// Arguments use the `key::value` form. `config::<path>` loads a JSON settings file first;
/// every other key overrides it, regardless of order.
///
/// `cars::N` &rarr; number of cars
/// `top::F` &rarr; top floor
/// `host::H`, `port::P` &rarr; rig address
/// `tolerance::T` &rarr; arrival tolerance, scaled units
/// `tick_ms::`, `door_open_ms::`, `door_close_ms::` &rarr; timing
/// `print_err|print_warn|print_ok|print_info|print_fleet::(true/false)` &rarr; print switches
/// `debug::true` &rarr; Disables all prints except error messages
/// `help` &rarr; Displays all possible arguments without starting the program
///
/// `args` excludes the program name.
///
/// ## Errors
/// A value that does not parse, an unreadable settings file, or settings that fail
/// [`Settings::validate`].
pub fn parse_args(args: &[String]) -> Result<Startup, ConfigError> {
    if args.iter().any(|arg| arg.eq_ignore_ascii_case("help")) {
        return Ok(Startup::Help);
    }

    let pairs: Vec<(String, &str)> = args
        .iter()
        .filter_map(|arg| arg.split_once("::"))
        .map(|(key, value)| (key.to_lowercase(), value))
        .collect();

    let mut settings = match pairs.iter().find(|(key, _)| key == "config") {
        Some((_, path)) => Settings::from_file(Path::new(path))?,
        None => Settings::default(),
    };

    for (key, value) in &pairs {
        let is_true = value.eq_ignore_ascii_case("true");
        match key.as_str() {
            "cars" => settings.cars = number(key, value)?,
            "top" => settings.top_floor = number(key, value)?,
            "host" => settings.host = value.to_string(),
            "port" => settings.port = number(key, value)?,
            "tolerance" => settings.tolerance = number(key, value)?,
            "tick_ms" => settings.tick_ms = number(key, value)?,
            "door_open_ms" => settings.door_open_ms = number(key, value)?,
            "door_close_ms" => settings.door_close_ms = number(key, value)?,
            "print_err" => config::PRINT_ERR_ON.store(is_true, Ordering::Relaxed),
            "print_warn" => config::PRINT_WARN_ON.store(is_true, Ordering::Relaxed),
            "print_ok" => config::PRINT_OK_ON.store(is_true, Ordering::Relaxed),
            "print_info" => config::PRINT_INFO_ON.store(is_true, Ordering::Relaxed),
            "print_fleet" => config::PRINT_FLEET_ON.store(is_true, Ordering::Relaxed),
            "debug" if is_true => {
                // Debug modus: kun error-meldingar
                config::PRINT_WARN_ON.store(false, Ordering::Relaxed);
                config::PRINT_OK_ON.store(false, Ordering::Relaxed);
                config::PRINT_INFO_ON.store(false, Ordering::Relaxed);
                config::PRINT_FLEET_ON.store(false, Ordering::Relaxed);
            }
            "config" | "debug" => {}
            _ => print::warn(format!("Ignoring unknown argument '{}'", key)),
        }
    }

    settings.validate()?;
    Ok(Startup::Run(settings))
}

/// Usage text for `help`.
pub fn usage() -> &'static str {
    "Available arguments:
  cars::N                number of cars (default 1)
  top::F                 top floor (default 5)
  host::H  port::P       rig address (default localhost:4711)
  tolerance::T           arrival tolerance in 1/100 floor (default 6)
  tick_ms::  door_open_ms::  door_close_ms::
  config::path.json      load settings from a JSON file
  print_err|print_warn|print_ok|print_info|print_fleet::true/false
  debug::true            only error messages
  help"
}

fn number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::BadArgument {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Connects to the rig, retrying every `delay` until it accepts.
pub async fn connect_with_retry(address: &str, delay: Duration) -> TcpStream {
    let mut attempts: u32 = 0;
    loop {
        match TcpStream::connect(address).await {
            Ok(stream) => {
                print::ok(format!("Connected to rig at {}", address));
                return stream;
            }
            Err(e) => {
                if attempts == 0 {
                    print::info(format!("Waiting for rig at {}: {}", address, e));
                }
                attempts = attempts.saturating_add(1);
                sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn overrides_apply_over_defaults() {
        let startup = parse_args(&args(&["cars::3", "top::9", "port::5000", "tick_ms::20"])).unwrap();
        let Startup::Run(settings) = startup else { panic!("expected Run") };
        assert_eq!(settings.cars, 3);
        assert_eq!(settings.top_floor, 9);
        assert_eq!(settings.port, 5000);
        assert_eq!(settings.tick_ms, 20);
        assert_eq!(settings.host, config::DEFAULT_HOST);
    }

    #[test]
    fn help_wins() {
        assert_eq!(parse_args(&args(&["cars::2", "help"])).unwrap(), Startup::Help);
    }

    #[test]
    fn zero_cars_is_rejected() {
        assert!(matches!(parse_args(&args(&["cars::0"])), Err(ConfigError::EmptyFleet)));
    }

    #[test]
    fn non_numeric_value_is_rejected() {
        assert!(matches!(
            parse_args(&args(&["cars::many"])),
            Err(ConfigError::BadArgument { .. })
        ));
    }

    #[test]
    fn missing_settings_file_is_reported() {
        assert!(matches!(
            parse_args(&args(&["config::/nonexistent/settings.json"])),
            Err(ConfigError::Read { .. })
        ));
    }

    #[tokio::test]
    async fn connects_once_the_rig_listens() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let accept = tokio::spawn(async move { listener.accept().await.map(|_| ()) });
        let stream = connect_with_retry(&address, Duration::from_millis(10)).await;
        assert!(stream.peer_addr().is_ok());
        accept.await.unwrap().unwrap();
    }
}
