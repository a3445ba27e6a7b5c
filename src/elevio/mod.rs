//! ## Elevator I/O module for the rig connection
//!
//! This module holds everything that crosses the wire between the rig and the core:
//! the scaled [`FloorLevel`], directions, the inbound [`Event`] parsed from a text line,
//! and the outbound [`Command`] written back.
//!
//! The wire format is line-oriented, space-separated ASCII:
//!
//! | Inbound | Meaning |
//! |---|---|
//! | `f <car> <pos>` | position report, `pos` is a fractional floor |
//! | `b <floor> <±1>` | hall call |
//! | `p <car> <floor>` | panel press, or stop if `floor` is the stop sentinel |
//! | `v ...` | velocity notice, ignored |
//!
//! | Outbound | Meaning |
//! |---|---|
//! | `m <car> <1/0/-1>` | motor up / stop / down |
//! | `d <car> <±1>` | door open / close |
//! | `s <car> <floor>` | floor display |

pub mod writer;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{self, Limits};
use crate::error::ParseError;

/// A floor position scaled by [`config::FLOOR_SCALE`].
///
/// Fractional position reports become integers here, so "arrived" is a tolerance
/// comparison on integers instead of float equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct FloorLevel(i32);

impl FloorLevel {
    /// Ground floor.
    pub const GROUND: FloorLevel = FloorLevel(0);

    /// Scales a rig floor number.
    pub fn from_floor(floor: i32) -> Self {
        FloorLevel(floor * config::FLOOR_SCALE)
    }

    /// Scales a fractional rig position, truncating toward zero.
    pub fn from_position(position: f64) -> Self {
        FloorLevel((position * config::FLOOR_SCALE as f64) as i32)
    }

    /// Wraps an already scaled value.
    pub const fn from_raw(raw: i32) -> Self {
        FloorLevel(raw)
    }

    /// The scaled value.
    pub fn raw(self) -> i32 {
        self.0
    }

    /// Nearest rig floor number, used for the display.
    pub fn floor_number(self) -> i32 {
        (self.0 + config::FLOOR_SCALE / 2).div_euclid(config::FLOOR_SCALE)
    }

    /// `true` if `other` is at most `tolerance` scaled units away. Inclusive.
    pub fn within(self, other: FloorLevel, tolerance: i32) -> bool {
        (self.0 - other.0).abs() <= tolerance
    }
}

impl fmt::Display for FloorLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Travel direction of a car, or the direction a hall call asks for.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// The other way.
    pub fn reverse(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

/// Motor command. Wire values `1`, `0`, `-1`.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Motor {
    Down = -1,
    Stop = 0,
    Up = 1,
}

impl From<Direction> for Motor {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => Motor::Up,
            Direction::Down => Motor::Down,
        }
    }
}

/// Door command. Wire values `1` (open) and `-1` (close).
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Door {
    Close = -1,
    Open = 1,
}

/// A parsed inbound line.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// `f`: car reports its position.
    Position {
        /// Reporting car
        car: u8,
        /// Scaled position
        level: FloorLevel,
    },
    /// `b`: landing button.
    HallCall {
        /// Scaled floor
        floor: FloorLevel,
        /// Requested direction
        direction: Direction,
    },
    /// `p`: panel button with a destination.
    CarCall {
        /// Car whose panel was pressed
        car: u8,
        /// Scaled destination
        floor: FloorLevel,
    },
    /// `p` with the stop sentinel.
    Stop {
        /// Car to stop
        car: u8,
    },
    /// `v`: informational only.
    Velocity,
}

/// An outbound command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `m <car> <dir>`
    Move {
        /// Target car
        car: u8,
        /// Motor direction
        motor: Motor,
    },
    /// `d <car> <±1>`
    Door {
        /// Target car
        car: u8,
        /// Open or close
        door: Door,
    },
    /// `s <car> <floor>`
    Display {
        /// Target car
        car: u8,
        /// Unscaled floor number
        floor: i32,
    },
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Command::Move { car, motor } => write!(f, "m {} {}", car, motor as i8),
            Command::Door { car, door } => write!(f, "d {} {}", car, door as i8),
            Command::Display { car, floor } => write!(f, "s {} {}", car, floor),
        }
    }
}

/// Parses one inbound line into an [`Event`].
///
/// Car IDs, floors, positions and directions are checked against `limits` here, so nothing
/// downstream has to validate.
///
/// ## Example
/// ```
/// use elevatordispatch::config::Limits;
/// use elevatordispatch::elevio::{parse_line, Event, Direction, FloorLevel};
///
/// let limits = Limits { cars: 2, top_floor: 5, tolerance: 6 };
/// let event = parse_line("b 3 1", &limits).unwrap();
/// assert_eq!(event, Event::HallCall { floor: FloorLevel::from_floor(3), direction: Direction::Up });
/// assert!(parse_line("x 1 2", &limits).is_err());
/// ```
pub fn parse_line(line: &str, limits: &Limits) -> Result<Event, ParseError> {
    let mut tokens = line.split_whitespace();
    let verb = tokens.next().ok_or(ParseError::Empty)?;
    let args: Vec<&str> = tokens.collect();

    match verb {
        "f" => {
            expect_args('f', &args, 2)?;
            let car = parse_car(args[0], limits)?;
            let position: f64 = args[1]
                .parse()
                .ok()
                .filter(|p: &f64| p.is_finite())
                .ok_or_else(|| ParseError::NotNumeric(args[1].to_string()))?;
            let level = FloorLevel::from_position(position);
            let top = FloorLevel::from_floor(limits.top_floor).raw();
            if level.raw() < -limits.tolerance || level.raw() > top + limits.tolerance {
                return Err(ParseError::FloorOutOfRange(position.trunc() as i64));
            }
            Ok(Event::Position { car, level })
        }
        "b" => {
            expect_args('b', &args, 2)?;
            let floor = parse_floor(args[0], limits)?;
            let direction = match parse_int(args[1])? {
                1 => Direction::Up,
                -1 => Direction::Down,
                other => return Err(ParseError::BadDirection(other)),
            };
            Ok(Event::HallCall { floor, direction })
        }
        "p" => {
            expect_args('p', &args, 2)?;
            let car = parse_car(args[0], limits)?;
            if parse_int(args[1])? == config::STOP_SENTINEL as i64 {
                return Ok(Event::Stop { car });
            }
            let floor = parse_floor(args[1], limits)?;
            Ok(Event::CarCall { car, floor })
        }
        "v" => Ok(Event::Velocity),
        other => Err(ParseError::UnknownVerb(other.to_string())),
    }
}

fn expect_args(verb: char, args: &[&str], expected: usize) -> Result<(), ParseError> {
    if args.len() != expected {
        return Err(ParseError::ArgCount { verb, expected, got: args.len() });
    }
    Ok(())
}

fn parse_int(token: &str) -> Result<i64, ParseError> {
    token.parse().map_err(|_| ParseError::NotNumeric(token.to_string()))
}

fn parse_car(token: &str, limits: &Limits) -> Result<u8, ParseError> {
    let id = parse_int(token)?;
    if id < 1 || id > limits.cars as i64 {
        return Err(ParseError::UnknownCar(id));
    }
    Ok(id as u8)
}

fn parse_floor(token: &str, limits: &Limits) -> Result<FloorLevel, ParseError> {
    let floor = parse_int(token)?;
    if floor < 0 || floor > limits.top_floor as i64 {
        return Err(ParseError::FloorOutOfRange(floor));
    }
    Ok(FloorLevel::from_floor(floor as i32))
}
