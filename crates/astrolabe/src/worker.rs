//! Layout worker running a simulation on its own thread.
//!
//! The worker owns a [`Simulation`] exclusively. Hosts talk to it through two
//! channels: an inbound command queue and an outbound event stream. Commands
//! are processed one at a time, each to completion, so a long run is never
//! interrupted by the next command; hosts that want to stop applying layouts
//! send [`Command::Pause`].

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use log::{debug, error, info, warn};

use astrolabe_core::config::SimulationConfig;

use crate::{
    AstrolabeError, Simulation,
    config::AppConfig,
    dispatch::dispatch,
    protocol::{Command, Event},
};

/// Handle to a running layout worker.
///
/// Dropping the handle closes the command queue and waits for the worker
/// thread to finish its current command.
///
/// # Examples
///
/// ```
/// use astrolabe::{
///     LayoutWorker,
///     config::AppConfig,
///     protocol::{Command, Event},
/// };
///
/// let worker = LayoutWorker::spawn(&AppConfig::default()).unwrap();
/// assert_eq!(worker.recv().unwrap(), Event::Ready);
///
/// worker.send(Command::Reset).unwrap();
/// assert!(matches!(worker.recv().unwrap(), Event::PositionsUpdated(_)));
///
/// worker.shutdown().unwrap();
/// ```
#[derive(Debug)]
pub struct LayoutWorker {
    commands: Option<Sender<Command>>,
    events: Receiver<Event>,
    handle: Option<JoinHandle<()>>,
}

impl LayoutWorker {
    /// Starts a worker thread configured by `config`.
    ///
    /// The first event the worker emits is always [`Event::Ready`].
    ///
    /// # Errors
    ///
    /// Returns [`AstrolabeError::Io`] if the thread cannot be spawned.
    pub fn spawn(config: &AppConfig) -> Result<Self, AstrolabeError> {
        let (command_tx, command_rx) = crossbeam_channel::unbounded();
        let (event_tx, event_rx) = match config.worker().event_capacity() {
            0 => crossbeam_channel::unbounded(),
            capacity => crossbeam_channel::bounded(capacity),
        };

        let base = config.simulation_config();
        let handle = thread::Builder::new()
            .name(config.worker().thread_name().to_string())
            .spawn(move || run_loop(base, command_rx, event_tx))?;

        info!(thread_name = config.worker().thread_name(); "Layout worker spawned");

        Ok(Self {
            commands: Some(command_tx),
            events: event_rx,
            handle: Some(handle),
        })
    }

    /// Queues a command for the worker.
    ///
    /// # Errors
    ///
    /// Returns [`AstrolabeError::Worker`] if the worker has stopped.
    pub fn send(&self, command: Command) -> Result<(), AstrolabeError> {
        let commands = self
            .commands
            .as_ref()
            .ok_or_else(|| AstrolabeError::Worker("command queue is closed".to_string()))?;

        commands
            .send(command)
            .map_err(|_| AstrolabeError::Worker("layout worker is no longer running".to_string()))
    }

    /// Blocks until the next event arrives.
    ///
    /// # Errors
    ///
    /// Returns [`AstrolabeError::Worker`] if the worker has stopped and no
    /// events remain.
    pub fn recv(&self) -> Result<Event, AstrolabeError> {
        self.events
            .recv()
            .map_err(|_| AstrolabeError::Worker("layout worker is no longer running".to_string()))
    }

    /// Waits up to `timeout` for the next event.
    ///
    /// # Errors
    ///
    /// Returns [`AstrolabeError::Timeout`] when nothing arrives in time, or
    /// [`AstrolabeError::Worker`] if the worker has stopped.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Event, AstrolabeError> {
        self.events.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => AstrolabeError::Timeout(timeout),
            RecvTimeoutError::Disconnected => {
                AstrolabeError::Worker("layout worker is no longer running".to_string())
            }
        })
    }

    /// Returns the next event if one is already waiting.
    pub fn try_recv(&self) -> Option<Event> {
        self.events.try_recv().ok()
    }

    /// The outbound event stream, for hosts that `select!` over channels.
    pub fn events(&self) -> &Receiver<Event> {
        &self.events
    }

    /// Closes the command queue without waiting.
    ///
    /// The worker finishes every command already queued, then stops. Its
    /// remaining events can still be drained from [`events`](Self::events)
    /// until the stream disconnects.
    pub fn close(&mut self) {
        if self.commands.take().is_some() {
            debug!("Command queue closed");
        }
    }

    /// Closes the command queue and waits for the worker to exit.
    ///
    /// Events still in flight are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`AstrolabeError::Worker`] if the worker thread panicked.
    pub fn shutdown(mut self) -> Result<(), AstrolabeError> {
        self.stop()
    }

    fn stop(&mut self) -> Result<(), AstrolabeError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        drop(self.commands.take());

        // Unblock a worker waiting on a full bounded channel.
        for event in self.events.iter() {
            debug!(event:?; "Discarding event during shutdown");
        }

        handle
            .join()
            .map_err(|payload| AstrolabeError::Worker(panic_message(payload.as_ref())))
    }
}

impl Drop for LayoutWorker {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            error!(err:%; "Layout worker terminated abnormally");
        }
    }
}

fn run_loop(base: SimulationConfig, commands: Receiver<Command>, events: Sender<Event>) {
    info!("Layout worker started");

    let mut simulation = Simulation::new(base);

    if events.send(Event::Ready).is_err() {
        warn!("Event receiver dropped before READY");
        return;
    }

    for command in commands.iter() {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| dispatch(&mut simulation, command)));

        let event = match outcome {
            Ok(event) => event,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(message = message.as_str(); "Command panicked, resetting simulation");
                simulation = Simulation::new(base);
                Some(Event::Error { message })
            }
        };

        let Some(event) = event else {
            continue;
        };

        if events.send(event).is_err() {
            warn!("Event receiver dropped, stopping layout worker");
            break;
        }
    }

    info!("Layout worker stopped");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "layout worker panicked".to_string()
    }
}
