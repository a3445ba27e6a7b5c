//! # Manager
//!
//! Owns the fleet and routes inbound events to cars. Hall calls go through the
//! assignment algorithm in [`select`]; everything else names its car directly.
//!
//! The fleet is a fixed array created once at startup. Car `n` lives at index `n - 1`.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::Result;
use tokio::task::JoinSet;

use crate::config::{self, Settings};
use crate::elevator_logic::{Car, Quote};
use crate::elevio::writer::CommandWriter;
use crate::elevio::{Direction, Event, FloorLevel};
use crate::error::ConfigError;
use crate::print;
use crate::world_view::CarState;

/// The fixed set of cars, IDs `1..=N`.
pub struct Fleet {
    cars: Box<[Car]>,
}

impl Fleet {
    /// Builds `settings.cars` idle cars sharing `writer`.
    ///
    /// ## Errors
    /// [`ConfigError`] if the settings do not validate, most notably an empty fleet.
    pub fn new(settings: &Settings, writer: CommandWriter) -> Result<Self, ConfigError> {
        settings.validate()?;
        let timing = settings.timing();
        let cars = (1..=settings.cars)
            .map(|id| Car::new(id, writer.clone(), timing))
            .collect();
        Ok(Self { cars })
    }

    /// Car with ID `id`.
    ///
    /// IDs are validated by the gateway; an unknown ID here is a programming error.
    pub fn car(&self, id: u8) -> &Car {
        &self.cars[usize::from(id) - 1]
    }

    /// All cars in ID order.
    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    /// Number of cars.
    pub fn len(&self) -> usize {
        self.cars.len()
    }

    /// Always `false` for a validated fleet.
    pub fn is_empty(&self) -> bool {
        self.cars.is_empty()
    }
}

/// Picks the car for a hall call from the cars' quotes.
///
/// A car that already holds the exact request absorbs the re-submission. Otherwise an
/// idle car beats any busy one, then the lowest cost wins, and remaining ties go to the
/// lowest ID.
///
/// Returns `None` only for an empty slice.
pub fn select(quotes: &[Quote]) -> Option<u8> {
    if let Some(holder) = quotes.iter().filter(|q| q.holds).min_by_key(|q| q.car) {
        return Some(holder.car);
    }
    quotes
        .iter()
        .min_by_key(|q| (!q.idle, q.cost, q.car))
        .map(|q| q.car)
}

/// Routes events into the fleet. Cheap to clone.
#[derive(Clone)]
pub struct Dispatcher {
    fleet: Arc<Fleet>,
}

impl Dispatcher {
    /// Wraps a shared fleet.
    pub fn new(fleet: Arc<Fleet>) -> Self {
        Self { fleet }
    }

    /// The fleet this dispatcher routes into.
    pub fn fleet(&self) -> &Arc<Fleet> {
        &self.fleet
    }

    /// Routes one parsed inbound event.
    ///
    /// ## Errors
    /// Only a failed stop command (transport failure) is returned.
    pub async fn dispatch(&self, event: Event) -> Result<()> {
        match event {
            Event::Position { car, level } => self.report_position(car, level).await,
            Event::HallCall { floor, direction } => {
                self.handle_hall_call(floor, direction).await;
            }
            Event::CarCall { car, floor } => self.handle_car_call(car, floor).await,
            Event::Stop { car } => self.handle_stop(car).await?,
            Event::Velocity => {}
        }
        Ok(())
    }

    /// Forwards a scaled position report to its car.
    pub async fn report_position(&self, car: u8, level: FloorLevel) {
        self.fleet.car(car).set_floor(level).await;
    }

    /// Assigns a hall call to the cheapest car and queues it there.
    ///
    /// Each car is locked in turn for its quote, never two at once, so the scan is a
    /// per-car snapshot rather than an atomic view of the fleet. Returns the chosen car.
    pub async fn handle_hall_call(&self, floor: FloorLevel, direction: Direction) -> u8 {
        let mut quotes = Vec::with_capacity(self.fleet.len());
        for car in self.fleet.cars() {
            quotes.push(car.quote(floor, direction).await);
        }

        // Fleet::new rejects an empty fleet, so there is always a winner.
        let winner = select(&quotes).unwrap_or(1);
        print::assignment(floor, &quotes, winner);
        self.fleet.car(winner).add_external_request(floor, direction).await;

        if config::PRINT_FLEET_ON.load(Ordering::Relaxed) {
            print::fleet(&self.snapshot().await);
        }
        winner
    }

    /// Forwards a panel press to its car.
    pub async fn handle_car_call(&self, car: u8, floor: FloorLevel) {
        if self.fleet.car(car).add_car_call(floor).await.is_none() {
            print::info(format!("Car {} is already at floor {}", car, floor.floor_number()));
        }
    }

    /// Stops a car immediately. Not queued.
    pub async fn handle_stop(&self, car: u8) -> Result<()> {
        self.fleet.car(car).stop().await
    }

    /// Per-car copies of the fleet state, in ID order.
    pub async fn snapshot(&self) -> Vec<CarState> {
        let mut states = Vec::with_capacity(self.fleet.len());
        for car in self.fleet.cars() {
            states.push(car.snapshot().await);
        }
        states
    }

    /// Spawns one control loop per car.
    ///
    /// Each task ends only with the transport error that stopped its car.
    pub fn spawn_cars(&self) -> JoinSet<Result<()>> {
        let mut loops = JoinSet::new();
        for id in 1..=self.fleet.len() as u8 {
            let fleet = self.fleet.clone();
            loops.spawn(async move { fleet.car(id).run().await });
        }
        loops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn dispatcher(cars: u8) -> Dispatcher {
        let settings = Settings { cars, ..Settings::default() };
        let writer = CommandWriter::new(tokio::io::sink(), Duration::from_secs(1));
        Dispatcher::new(Arc::new(Fleet::new(&settings, writer).unwrap()))
    }

    fn quote(car: u8, cost: usize, idle: bool) -> Quote {
        Quote { car, cost, idle, holds: false }
    }

    #[test]
    fn lowest_cost_wins_and_ties_go_to_lowest_id() {
        assert_eq!(select(&[quote(1, 3, false), quote(2, 1, false), quote(3, 1, false)]), Some(2));
        assert_eq!(select(&[quote(1, 0, true), quote(2, 0, true)]), Some(1));
    }

    #[test]
    fn idle_beats_any_busy_car() {
        assert_eq!(select(&[quote(1, 0, false), quote(2, 0, true)]), Some(2));
        assert_eq!(select(&[quote(1, 0, false), quote(2, 5, false), quote(3, 0, true)]), Some(3));
    }

    #[test]
    fn holder_absorbs_resubmission() {
        let holder = Quote { car: 3, cost: 0, idle: false, holds: true };
        assert_eq!(select(&[quote(1, 0, true), holder]), Some(3));
    }

    #[test]
    fn empty_fleet_is_rejected() {
        let settings = Settings { cars: 0, ..Settings::default() };
        let writer = CommandWriter::new(tokio::io::sink(), Duration::from_secs(1));
        assert!(matches!(Fleet::new(&settings, writer), Err(ConfigError::EmptyFleet)));
    }

    #[tokio::test]
    async fn two_idle_cars_pick_the_lowest_id() {
        let dispatcher = dispatcher(2);
        let winner = dispatcher.handle_hall_call(FloorLevel::from_floor(3), Direction::Up).await;
        assert_eq!(winner, 1);
        let states = dispatcher.snapshot().await;
        assert!(states[0].up_queue.contains(FloorLevel::from_floor(3)));
        assert!(states[1].up_queue.is_empty());
    }

    #[tokio::test]
    async fn busy_car_hands_the_next_call_to_an_idle_one() {
        let dispatcher = dispatcher(2);
        dispatcher.handle_hall_call(FloorLevel::from_floor(3), Direction::Up).await;
        let winner = dispatcher.handle_hall_call(FloorLevel::from_floor(1), Direction::Down).await;
        assert_eq!(winner, 2);
    }

    #[tokio::test]
    async fn resubmitted_hall_call_is_not_duplicated() {
        let dispatcher = dispatcher(3);
        let first = dispatcher.handle_hall_call(FloorLevel::from_floor(4), Direction::Down).await;
        let second = dispatcher.handle_hall_call(FloorLevel::from_floor(4), Direction::Down).await;
        assert_eq!(first, second);
        let holders = dispatcher
            .snapshot()
            .await
            .iter()
            .filter(|s| s.down_queue.contains(FloorLevel::from_floor(4)))
            .count();
        assert_eq!(holders, 1);
    }

    #[tokio::test]
    async fn same_state_same_winner() {
        let a = dispatcher(3);
        let b = dispatcher(3);
        for d in [&a, &b] {
            d.handle_hall_call(FloorLevel::from_floor(2), Direction::Up).await;
            d.report_position(1, FloorLevel::from_floor(1)).await;
        }
        let wa = a.handle_hall_call(FloorLevel::from_floor(5), Direction::Down).await;
        let wb = b.handle_hall_call(FloorLevel::from_floor(5), Direction::Down).await;
        assert_eq!(wa, wb);
    }

    #[tokio::test]
    async fn events_reach_the_named_car() {
        let dispatcher = dispatcher(2);
        dispatcher.dispatch(Event::Position { car: 2, level: FloorLevel::from_raw(250) }).await.unwrap();
        dispatcher.dispatch(Event::CarCall { car: 2, floor: FloorLevel::from_floor(1) }).await.unwrap();
        dispatcher.dispatch(Event::Velocity).await.unwrap();
        dispatcher.dispatch(Event::Stop { car: 2 }).await.unwrap();

        let states = dispatcher.snapshot().await;
        assert_eq!(states[1].floor, FloorLevel::from_raw(250));
        assert!(states[1].down_queue.contains(FloorLevel::from_floor(1)));
        assert_eq!(states[0].queued(), 0);
    }
}
