//! Direction-ordered stop queue.
//!
//! An up queue is kept strictly ascending and a down queue strictly descending, so the
//! head is always the first stop of the sweep. Inserting a floor that is already queued
//! does nothing.

use serde::Serialize;

use crate::elevio::{Direction, FloorLevel};

/// Sorted, duplicate-free list of stops for one sweep direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepQueue {
    direction: Direction,
    stops: Vec<FloorLevel>,
}

impl SweepQueue {
    /// Empty queue ordered for `direction`.
    pub fn new(direction: Direction) -> Self {
        Self { direction, stops: Vec::new() }
    }

    /// Inserts `floor` at its sorted position. Returns `false` if it was already queued.
    pub fn insert(&mut self, floor: FloorLevel) -> bool {
        let search = match self.direction {
            Direction::Up => self.stops.binary_search(&floor),
            Direction::Down => self.stops.binary_search_by(|probe| floor.cmp(probe)),
        };
        match search {
            Ok(_) => false,
            Err(index) => {
                self.stops.insert(index, floor);
                true
            }
        }
    }

    /// Removes `floor` if present.
    pub fn remove(&mut self, floor: FloorLevel) -> bool {
        match self.stops.iter().position(|stop| *stop == floor) {
            Some(index) => {
                self.stops.remove(index);
                true
            }
            None => false,
        }
    }

    /// First stop of the sweep.
    pub fn head(&self) -> Option<FloorLevel> {
        self.stops.first().copied()
    }

    /// Whether `floor` is queued.
    pub fn contains(&self, floor: FloorLevel) -> bool {
        self.stops.contains(&floor)
    }

    /// First stop strictly beyond `from` in this queue's direction.
    pub fn next_beyond(&self, from: FloorLevel) -> Option<FloorLevel> {
        self.stops.iter().copied().find(|stop| match self.direction {
            Direction::Up => *stop > from,
            Direction::Down => *stop < from,
        })
    }

    /// Number of stops strictly between `a` and `b`, in either order.
    pub fn count_between(&self, a: FloorLevel, b: FloorLevel) -> usize {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        self.stops.iter().filter(|stop| **stop > low && **stop < high).count()
    }

    /// Sweep direction of this queue.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Number of queued stops.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Whether no stop is queued.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// The stops in sweep order.
    pub fn as_slice(&self) -> &[FloorLevel] {
        &self.stops
    }
}
