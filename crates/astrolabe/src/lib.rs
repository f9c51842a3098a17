//! Astrolabe - Force-directed 3D layout behind an asynchronous message boundary.
//!
//! Astrolabe turns a set of entities and weighted connections into stable 3D
//! coordinates. The simulation runs on a dedicated worker thread so a host's
//! render loop only ever waits on a channel, never on the layout itself.
//!
//! # Overview
//!
//! - [`Simulation`] - Owned simulation state and the four run stages.
//! - [`dispatch`] - The command state machine applied to a simulation.
//! - [`LayoutWorker`] - A thread that owns a simulation and speaks the protocol.
//! - [`protocol`] - Commands, events, and their JSON codec.
//! - [`fallback`] - A static layout for when no worker is available.
//!
//! # Examples
//!
//! ```rust,no_run
//! use astrolabe::{
//!     LayoutWorker,
//!     config::AppConfig,
//!     model::{Connection, Entity},
//!     protocol::{Command, Event, RunRequest},
//! };
//!
//! let worker = LayoutWorker::spawn(&AppConfig::default()).expect("Failed to spawn worker");
//! assert_eq!(worker.recv().expect("Worker stopped"), Event::Ready);
//!
//! let request = RunRequest::new(
//!     vec![Entity::new("earth"), Entity::new("moon")],
//!     vec![Connection::new("earth", "moon", 1.0)],
//! );
//! worker
//!     .send(Command::ConfigureAndRun(request))
//!     .expect("Failed to send command");
//!
//! if let Event::PositionsUpdated(snapshot) = worker.recv().expect("Worker stopped") {
//!     for (id, position) in snapshot.positions_by_id() {
//!         println!("{id}: {position:?}");
//!     }
//! }
//! ```

pub mod config;
pub mod fallback;
pub mod protocol;
pub mod simulation;

mod dispatch;
mod error;
mod worker;

pub use astrolabe_core::{geometry, model};

pub use dispatch::dispatch;
pub use error::AstrolabeError;
pub use protocol::ProtocolError;
pub use simulation::{Simulation, SimulationError};
pub use worker::LayoutWorker;
