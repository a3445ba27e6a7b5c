//! Request evaluation and destination logic.
//!
//! This module holds the decisions a car makes about its queues, as plain functions over a
//! [`CarState`] snapshot:
//! - which stop to drive to next ([`next_destination`]),
//! - how expensive a new hall call would be for this car ([`cost`]),
//! - which queue a panel press belongs in ([`classify_car_call`]).
//!
//! The functions are stateless so they can be called under the car's lock without
//! awaiting anything, and tested without a runtime.
//!
//! # Cost model
//! The cost is the number of stops the car makes before it can serve the call, in the
//! spirit of a LOOK sweep:
//! - `0` when the car is idle, already at the floor, or already has the floor queued.
//! - Same direction, ahead on the sweep: stops queued between here and there.
//! - Same direction, behind: every queued stop (finish this sweep and the next).
//! - Opposite direction: stops left on the current sweep.

use crate::elevio::{Direction, FloorLevel};
use crate::world_view::CarState;

/// Chooses the stop the car should drive towards.
///
/// Priority:
/// 1. Nearest stop strictly ahead in the current direction.
/// 2. Head of the opposite queue (the car reverses).
/// 3. Head of the current queue, whose stops all lie behind the car.
///
/// Returns `None` when both queues are empty.
pub fn next_destination(car: &CarState) -> Option<FloorLevel> {
    let forward = car.queue(car.direction);
    forward
        .next_beyond(car.floor)
        .or_else(|| car.queue(car.direction.reverse()).head())
        .or_else(|| forward.head())
}

/// Direction to drive from `from` to reach `to`.
pub fn heading(from: FloorLevel, to: FloorLevel) -> Direction {
    if from > to {
        Direction::Down
    } else {
        Direction::Up
    }
}

/// Whether `target` lies ahead of the car on its current sweep.
pub fn is_ahead(car: &CarState, target: FloorLevel) -> bool {
    match car.direction {
        Direction::Up => target > car.floor,
        Direction::Down => target < car.floor,
    }
}

/// Stops before `car` could serve a hall call at `target` going `requested`.
///
/// Lower is better. See the module docs for the cases.
pub fn cost(car: &CarState, target: FloorLevel, requested: Direction, tolerance: i32) -> usize {
    if car.idle || car.floor.within(target, tolerance) || car.is_queued(target) {
        return 0;
    }

    let current = car.queue(car.direction);
    if requested == car.direction {
        if is_ahead(car, target) {
            current.count_between(car.floor, target)
        } else {
            car.queued()
        }
    } else {
        current.len()
    }
}

/// Queue a panel press for `floor` belongs in.
///
/// A destination above the car is served on an up sweep, one below on a down sweep,
/// whichever way the car is heading now. `None` if the car is exactly at `floor`.
pub fn classify_car_call(car: &CarState, floor: FloorLevel) -> Option<Direction> {
    use std::cmp::Ordering;

    match floor.cmp(&car.floor) {
        Ordering::Greater => Some(Direction::Up),
        Ordering::Less => Some(Direction::Down),
        Ordering::Equal => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lvl(raw: i32) -> FloorLevel {
        FloorLevel::from_raw(raw)
    }

    fn busy_car(floor: i32, direction: Direction, up: &[i32], down: &[i32]) -> CarState {
        let mut car = CarState::new(1);
        car.floor = lvl(floor);
        car.direction = direction;
        car.idle = false;
        for raw in up {
            car.up_queue.insert(lvl(*raw));
        }
        for raw in down {
            car.down_queue.insert(lvl(*raw));
        }
        car
    }

    #[test]
    fn destination_prefers_stops_ahead() {
        let car = busy_car(300, Direction::Up, &[100, 400, 600], &[200]);
        assert_eq!(next_destination(&car), Some(lvl(400)));
    }

    #[test]
    fn destination_reverses_when_nothing_is_ahead() {
        let car = busy_car(700, Direction::Up, &[100], &[500, 200]);
        assert_eq!(next_destination(&car), Some(lvl(500)));
    }

    #[test]
    fn destination_falls_back_to_stops_behind() {
        let car = busy_car(700, Direction::Up, &[100, 300], &[]);
        assert_eq!(next_destination(&car), Some(lvl(100)));
    }

    #[test]
    fn destination_is_none_when_empty() {
        assert_eq!(next_destination(&CarState::new(1)), None);
    }

    #[test]
    fn idle_car_costs_nothing() {
        let mut car = busy_car(300, Direction::Up, &[], &[]);
        car.idle = true;
        assert_eq!(cost(&car, lvl(0), Direction::Down, 6), 0);
    }

    #[test]
    fn queued_or_reached_floor_costs_nothing() {
        let car = busy_car(300, Direction::Up, &[400, 600], &[100]);
        assert_eq!(cost(&car, lvl(100), Direction::Up, 6), 0);
        assert_eq!(cost(&car, lvl(600), Direction::Down, 6), 0);
        assert_eq!(cost(&car, lvl(306), Direction::Down, 6), 0);
    }

    #[test]
    fn same_direction_ahead_counts_stops_in_between() {
        let car = busy_car(100, Direction::Up, &[200, 300, 400, 600], &[]);
        assert_eq!(cost(&car, lvl(500), Direction::Up, 6), 3);
        assert_eq!(cost(&car, lvl(150), Direction::Up, 6), 0);
    }

    #[test]
    fn same_direction_behind_costs_both_sweeps() {
        let car = busy_car(400, Direction::Up, &[500, 600], &[300]);
        assert_eq!(cost(&car, lvl(200), Direction::Up, 6), 3);
    }

    #[test]
    fn opposite_direction_waits_for_the_current_sweep() {
        let car = busy_car(400, Direction::Down, &[500], &[300, 200, 100]);
        assert_eq!(cost(&car, lvl(700), Direction::Up, 6), 3);
        assert_eq!(cost(&car, lvl(0), Direction::Up, 6), 3);
    }

    #[test]
    fn car_calls_split_by_side_of_the_car() {
        let up = busy_car(300, Direction::Up, &[], &[]);
        assert_eq!(classify_car_call(&up, lvl(500)), Some(Direction::Up));
        assert_eq!(classify_car_call(&up, lvl(100)), Some(Direction::Down));
        assert_eq!(classify_car_call(&up, lvl(300)), None);

        let down = busy_car(300, Direction::Down, &[], &[]);
        assert_eq!(classify_car_call(&down, lvl(100)), Some(Direction::Down));
        assert_eq!(classify_car_call(&down, lvl(500)), Some(Direction::Up));
    }

    #[test]
    fn heading_points_at_target() {
        assert_eq!(heading(lvl(300), lvl(100)), Direction::Down);
        assert_eq!(heading(lvl(100), lvl(300)), Direction::Up);
    }
}
