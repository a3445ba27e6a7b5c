//! # Car logic
//!
//! One [`Car`] per elevator. The car owns its [`CarState`] behind a per-car lock, which is
//! taken by three parties:
//! - the car's own control loop ([`Car::run`]),
//! - the dispatcher routing requests and position reports into it,
//! - the dispatcher asking for a [`Quote`] while assigning a hall call.
//!
//! The lock is never held across an `.await` on I/O or a dwell, so a car with its doors
//! open still answers cost queries and accepts new requests.

pub mod queue;
pub mod request;

use anyhow::Result;
use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::config::Timing;
use crate::elevio::writer::CommandWriter;
use crate::elevio::{Command, Direction, Door, FloorLevel, Motor};
use crate::print;
use crate::world_view::CarState;

/// A car's answer to "what would it cost you to take this hall call?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    /// Quoting car
    pub car: u8,
    /// Stops before the call would be served, see [`request::cost`]
    pub cost: usize,
    /// Whether the car was idle when quoting
    pub idle: bool,
    /// Whether the exact (floor, direction) pair is already in the car's queue
    pub holds: bool,
}

/// What the control loop remembers between ticks.
#[derive(Debug, Default)]
struct LoopMemory {
    last_target: Option<FloorLevel>,
    displayed: Option<i32>,
}

/// Outcome of choosing the next destination in a tick.
enum Step {
    Move(Command),
    ServeHere(FloorLevel),
    Hold,
}

/// One elevator: its state, its share of the outbound sink and its timing.
pub struct Car {
    id: u8,
    state: Mutex<CarState>,
    writer: CommandWriter,
    timing: Timing,
}

impl Car {
    /// Creates an idle car at the ground floor.
    pub fn new(id: u8, writer: CommandWriter, timing: Timing) -> Self {
        Self {
            id,
            state: Mutex::new(CarState::new(id)),
            writer,
            timing,
        }
    }

    /// Car ID, `1..=N`.
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Queues a hall call in the queue matching `direction`.
    ///
    /// Returns `false` if the floor was already queued there.
    pub async fn add_external_request(&self, floor: FloorLevel, direction: Direction) -> bool {
        let mut car = self.state.lock().await;
        let inserted = car.queue_mut(direction).insert(floor);
        car.idle = false;
        inserted
    }

    /// Queues a panel press on the sweep that passes `floor`.
    ///
    /// Returns the queue it went into, or `None` if the car is exactly at `floor`.
    pub async fn add_car_call(&self, floor: FloorLevel) -> Option<Direction> {
        let mut car = self.state.lock().await;
        let direction = request::classify_car_call(&car, floor)?;
        car.queue_mut(direction).insert(floor);
        car.idle = false;
        Some(direction)
    }

    /// Records a position report.
    pub async fn set_floor(&self, level: FloorLevel) {
        self.state.lock().await.floor = level;
    }

    /// Cost of serving a hall call at `floor` going `direction`.
    pub async fn cost(&self, floor: FloorLevel, direction: Direction) -> usize {
        let car = self.state.lock().await;
        request::cost(&car, floor, direction, self.timing.tolerance)
    }

    /// Cost, idle flag and duplicate check, read under one lock.
    pub async fn quote(&self, floor: FloorLevel, direction: Direction) -> Quote {
        let car = self.state.lock().await;
        Quote {
            car: self.id,
            cost: request::cost(&car, floor, direction, self.timing.tolerance),
            idle: car.idle,
            holds: car.queue(direction).contains(floor),
        }
    }

    /// Stops the motor now, regardless of the queues.
    pub async fn stop(&self) -> Result<()> {
        print::warn(format!("Car {} stop requested", self.id));
        self.writer.send(Command::Move { car: self.id, motor: Motor::Stop }).await
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> CarState {
        self.state.lock().await.clone()
    }

    /// Runs the control loop until the outbound connection fails.
    ///
    /// ## Errors
    /// Only transport errors from the command writer end the loop.
    pub async fn run(&self) -> Result<()> {
        let mut memory = LoopMemory::default();
        loop {
            sleep(self.timing.tick).await;
            self.tick(&mut memory).await?;
        }
    }

    /// One pass of the control loop: display, arrival, next destination.
    async fn tick(&self, memory: &mut LoopMemory) -> Result<()> {
        let (floor, arrived) = {
            let car = self.state.lock().await;
            let arrived = car.target.filter(|target| car.floor.within(*target, self.timing.tolerance));
            (car.floor, arrived)
        };

        let shown = floor.floor_number();
        if memory.displayed != Some(shown) {
            self.writer.send(Command::Display { car: self.id, floor: shown }).await?;
            memory.displayed = Some(shown);
        }

        if let Some(stop) = arrived {
            self.serve(stop).await?;
            // Motor is stopped now, so the next destination must be re-announced.
            memory.last_target = None;
        }

        let step = {
            let mut car = self.state.lock().await;
            match request::next_destination(&car) {
                Some(destination) if car.floor.within(destination, self.timing.tolerance) => {
                    // Already at the stop, so no move command.
                    car.target = Some(destination);
                    car.idle = false;
                    Step::ServeHere(destination)
                }
                Some(destination) => {
                    car.target = Some(destination);
                    if memory.last_target != Some(destination) {
                        memory.last_target = Some(destination);
                        car.direction = request::heading(car.floor, destination);
                        car.idle = false;
                        Step::Move(Command::Move { car: self.id, motor: car.direction.into() })
                    } else {
                        Step::Hold
                    }
                }
                None => {
                    car.target = None;
                    car.idle = true;
                    Step::Hold
                }
            }
        };

        match step {
            Step::Move(command) => self.writer.send(command).await?,
            Step::ServeHere(stop) => {
                self.serve(stop).await?;
                memory.last_target = None;
            }
            Step::Hold => {}
        }
        Ok(())
    }

    /// Stop, cycle the doors and clear `stop` from both queues.
    ///
    /// Queues are cleared after the dwell, so a request for `stop` that comes in while the
    /// doors are open is served by this same door cycle.
    async fn serve(&self, stop: FloorLevel) -> Result<()> {
        print::ok(format!("Car {} arrived at floor {}", self.id, stop.floor_number()));
        self.writer.send(Command::Move { car: self.id, motor: Motor::Stop }).await?;
        self.writer.send(Command::Door { car: self.id, door: Door::Open }).await?;
        sleep(self.timing.door_open).await;
        self.writer.send(Command::Door { car: self.id, door: Door::Close }).await?;
        sleep(self.timing.door_close).await;

        let mut car = self.state.lock().await;
        car.up_queue.remove(stop);
        car.down_queue.remove(stop);
        car.target = None;
        Ok(())
    }
}
