//! ## Printing Module
//!
//! This module is only here to make logging in the terminal easier to read.
//! It prints in appropriate colors depending on the situation, each level gated by its
//! switch in [crate::config]. It also provides a table view of the fleet.
use std::sync::atomic::{AtomicBool, Ordering};

use ansi_term::Colour::{self, Green, Red, Yellow};
use prettytable::{row, Table};

use crate::config;
use crate::elevator_logic::Quote;
use crate::elevio::FloorLevel;
use crate::world_view::{CarBehaviour, CarState};

fn enabled(flag: &AtomicBool) -> bool {
    flag.load(Ordering::Relaxed)
}

/// Prints an error message in red to the terminal.
///
/// If [config::PRINT_ERR_ON] is `false`, the message will not be printed.
///
/// ## Terminal output
/// - "\[ERROR\]:   {}", msg
///
/// ## Example
/// ```
/// use elevatordispatch::print;
///
/// print::err("Something went wrong!".to_string());
/// ```
pub fn err(msg: String) {
    if enabled(&config::PRINT_ERR_ON) {
        eprintln!("{}{}", Red.paint("[ERROR]:   "), Red.paint(msg));
    }
}

/// Prints a warning message in yellow to the terminal.
///
/// If [config::PRINT_WARN_ON] is `false`, the message will not be printed.
///
/// ## Terminal output
/// - "\[WARNING\]: {}", msg
pub fn warn(msg: String) {
    if enabled(&config::PRINT_WARN_ON) {
        println!("{}{}", Yellow.paint("[WARNING]: "), Yellow.paint(msg));
    }
}

/// Prints a success message in green to the terminal.
///
/// If [config::PRINT_OK_ON] is `false`, the message will not be printed.
///
/// ## Terminal output
/// - "\[OK\]:      {}", msg
pub fn ok(msg: String) {
    if enabled(&config::PRINT_OK_ON) {
        println!("{}{}", Green.paint("[OK]:      "), Green.paint(msg));
    }
}

/// Prints an informational message in light blue to the terminal.
///
/// If [config::PRINT_INFO_ON] is `false`, the message will not be printed.
///
/// ## Terminal output
/// - "\[INFO\]:    {}", msg
pub fn info(msg: String) {
    if enabled(&config::PRINT_INFO_ON) {
        let light_blue = Colour::RGB(102, 178, 255);
        println!("{}{}", light_blue.paint("[INFO]:    "), light_blue.paint(msg));
    }
}

/// Prints every car's quote and the winner of a hall call.
pub fn assignment(floor: FloorLevel, quotes: &[Quote], winner: u8) {
    if !enabled(&config::PRINT_INFO_ON) {
        return;
    }
    let costs: Vec<String> = quotes
        .iter()
        .map(|q| format!("#{}={}{}", q.car, q.cost, if q.idle { " (idle)" } else { "" }))
        .collect();
    info(format!(
        "Hall call at floor {}: {} ===> car #{} got the job",
        floor.floor_number(),
        costs.join(", "),
        winner
    ));
}

/// Prints the fleet as a table: one row per car with floor, behaviour and both queues.
///
/// Only printed when [config::PRINT_FLEET_ON] is `true`.
pub fn fleet(cars: &[CarState]) {
    if !enabled(&config::PRINT_FLEET_ON) {
        return;
    }

    let mut table = Table::new();
    table.add_row(row!["Car", "Floor", "State", "Target", "Up queue", "Down queue"]);
    for car in cars {
        let state = match car.behaviour() {
            CarBehaviour::MovingUp => Green.paint("UP"),
            CarBehaviour::MovingDown => Yellow.paint("DOWN"),
            CarBehaviour::Idle => Colour::White.paint("IDLE"),
        };
        let target = car
            .target
            .map(|t| t.floor_number().to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(row![
            car.id,
            format!("{} ({})", car.floor.floor_number(), car.floor),
            state.to_string(),
            target,
            queue_text(car.up_queue.as_slice()),
            queue_text(car.down_queue.as_slice())
        ]);
    }
    table.printstd();
}

fn queue_text(stops: &[FloorLevel]) -> String {
    let floors: Vec<String> = stops.iter().map(|s| s.floor_number().to_string()).collect();
    format!("[{}]", floors.join(", "))
}
