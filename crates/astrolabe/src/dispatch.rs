//! Command handling for a single simulation.
//!
//! [`dispatch`] is the engine's state machine. It runs every command to
//! completion on the calling thread and turns the outcome into the event the
//! host should receive, if any.

use log::{debug, error, info};

use crate::{
    Simulation,
    protocol::{Command, Event, Snapshot},
    simulation::SimulationError,
};

/// Applies `command` to `simulation` and returns the event to emit.
///
/// `PAUSE` produces no event. Simulation failures become [`Event::Error`];
/// the simulation stays usable afterwards.
///
/// # Examples
///
/// ```
/// use astrolabe::{
///     Simulation, dispatch,
///     protocol::{Command, Event},
/// };
///
/// let mut simulation = Simulation::default();
/// let Some(Event::PositionsUpdated(snapshot)) = dispatch(&mut simulation, Command::Reset) else {
///     panic!("RESET always reports positions");
/// };
/// assert!(snapshot.positions().is_empty());
/// assert!(snapshot.stabilized());
/// ```
pub fn dispatch(simulation: &mut Simulation, command: Command) -> Option<Event> {
    debug!(command = command.name(); "Dispatching command");

    match execute(simulation, command) {
        Ok(Some(snapshot)) => Some(Event::PositionsUpdated(snapshot)),
        Ok(None) => None,
        Err(err) => {
            error!(err:%; "Simulation run failed");
            Some(Event::Error {
                message: err.to_string(),
            })
        }
    }
}

fn execute(
    simulation: &mut Simulation,
    command: Command,
) -> Result<Option<Snapshot>, SimulationError> {
    match command {
        Command::ConfigureAndRun(request) => {
            if simulation.is_paused() {
                info!("Simulation paused, reporting current positions unchanged");
                return Ok(Some(simulation.snapshot(0, true)));
            }

            let (entities, connections, overrides) = request.into_parts();
            simulation.configure(entities, connections, &overrides);
            simulation.run().map(Some)
        }
        Command::Reset => {
            simulation.reset();
            Ok(Some(Snapshot::empty()))
        }
        Command::Pause => {
            simulation.pause();
            Ok(None)
        }
        Command::Resume => {
            simulation.resume();
            simulation.run().map(Some)
        }
    }
}
