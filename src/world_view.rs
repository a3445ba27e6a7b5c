//! # World view of a single car
//!
//! [`CarState`] is the mutable state each car keeps behind its own lock. Cloned, it is also
//! the read-only snapshot handed to diagnostics and tests.

use serde::Serialize;

use crate::elevator_logic::queue::SweepQueue;
use crate::elevio::{Direction, FloorLevel};

/// Externally visible behaviour, derived from `(direction, idle)`.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CarBehaviour {
    MovingUp,
    MovingDown,
    Idle,
}

/// State of one car.
#[derive(Debug, Clone, Serialize)]
pub struct CarState {
    /// Car ID, `1..=N`
    pub id: u8,
    /// Last reported position, scaled
    pub floor: FloorLevel,
    /// Current sweep direction
    pub direction: Direction,
    /// `true` iff nothing is queued and no target is pursued
    pub idle: bool,
    /// Stops served on the way up, ascending
    pub up_queue: SweepQueue,
    /// Stops served on the way down, descending
    pub down_queue: SweepQueue,
    /// Stop currently driven towards
    pub target: Option<FloorLevel>,
}

impl CarState {
    /// A car parked idle at the ground floor, facing up.
    pub fn new(id: u8) -> Self {
        Self {
            id,
            floor: FloorLevel::GROUND,
            direction: Direction::Up,
            idle: true,
            up_queue: SweepQueue::new(Direction::Up),
            down_queue: SweepQueue::new(Direction::Down),
            target: None,
        }
    }

    /// Queue serving `direction`.
    pub fn queue(&self, direction: Direction) -> &SweepQueue {
        match direction {
            Direction::Up => &self.up_queue,
            Direction::Down => &self.down_queue,
        }
    }

    /// Mutable queue serving `direction`.
    pub fn queue_mut(&mut self, direction: Direction) -> &mut SweepQueue {
        match direction {
            Direction::Up => &mut self.up_queue,
            Direction::Down => &mut self.down_queue,
        }
    }

    /// `true` if `floor` is in either queue.
    pub fn is_queued(&self, floor: FloorLevel) -> bool {
        self.up_queue.contains(floor) || self.down_queue.contains(floor)
    }

    /// Total number of queued stops.
    pub fn queued(&self) -> usize {
        self.up_queue.len() + self.down_queue.len()
    }

    /// Moving up, moving down or idle, as shown in the fleet table.
    pub fn behaviour(&self) -> CarBehaviour {
        match (self.idle, self.direction) {
            (true, _) => CarBehaviour::Idle,
            (false, Direction::Up) => CarBehaviour::MovingUp,
            (false, Direction::Down) => CarBehaviour::MovingDown,
        }
    }
}
