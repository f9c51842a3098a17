//! Error types for Astrolabe operations.
//!
//! This module provides the main error type [`AstrolabeError`] which wraps
//! the failures a host can observe when driving the layout engine.

use std::{io, time::Duration};

use thiserror::Error;

use crate::{protocol::ProtocolError, simulation::SimulationError};

/// The main error type for Astrolabe operations.
///
/// Simulation failures inside the worker never reach the host through this
/// type; they arrive as [`Event::Error`](crate::protocol::Event::Error)
/// messages instead. The `Simulation` variant is used by synchronous callers
/// that run a [`Simulation`](crate::Simulation) directly.
#[derive(Debug, Error)]
pub enum AstrolabeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Simulation error: {0}")]
    Simulation(#[from] SimulationError),

    #[error("Worker error: {0}")]
    Worker(String),

    #[error("Timed out after {0:?} waiting for the layout worker")]
    Timeout(Duration),
}
