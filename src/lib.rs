#![warn(missing_docs)]
//! # This projects library
//!
//! Control core for an N-car elevator rig: routes hall and panel calls to cars and runs
//! one autonomous control loop per car.
//!
//! ## Overview
//! - **config**: Handles configuration settings.
//! - **init**: Argument parsing and connecting to the rig.
//! - **print**: Colour-coded terminal logging.
//! - **error**: Parse and configuration errors.
//! - **elevio**: Wire types, line parser and the shared command writer.
//! - **world_view**: Per-car state and snapshots.
//! - **elevator_logic**: The car: queues, cost, control loop.
//! - **manager**: The fleet and the hall call assignment.
//! - **network**: Rig connection and the gateway read loop.

/// Global variables and runtime settings
pub mod config;

/// Initialize functions
pub mod init;

/// Print functions with color coding
pub mod print;

pub mod error;

/// Interface for elevator input/output over the rig protocol.
pub mod elevio;

pub mod world_view;

/// Car state machine and request handling.
pub mod elevator_logic;

/// Fleet ownership and hall call assignment.
pub mod manager;

/// Rig connection and gateway.
pub mod network;
