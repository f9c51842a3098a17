//! Configuration types for the Astrolabe layout engine.
//!
//! This module provides the configuration root a host loads before spawning
//! a [`LayoutWorker`](crate::LayoutWorker). All types implement
//! [`serde::Deserialize`] for flexible loading from external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining simulation and worker settings.
//! - [`ConfigOverrides`] - Base simulation parameters applied over built-in defaults.
//! - [`WorkerConfig`] - Controls the worker thread and its outbound channel.
//!
//! # Example
//!
//! ```
//! # use astrolabe::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.simulation_config().iterations(), 300);
//! assert_eq!(config.worker().thread_name(), "astrolabe-layout");
//! ```

use serde::Deserialize;

pub use astrolabe_core::config::{ConfigOverrides, SimulationConfig};

/// Top-level configuration combining simulation and worker settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Base simulation parameters, applied over the built-in defaults.
    #[serde(default)]
    simulation: ConfigOverrides,

    /// Worker thread settings.
    #[serde(default)]
    worker: WorkerConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    ///
    /// # Arguments
    ///
    /// * `simulation` - Base simulation overrides.
    /// * `worker` - Worker thread settings.
    pub fn new(simulation: ConfigOverrides, worker: WorkerConfig) -> Self {
        Self { simulation, worker }
    }

    /// Returns the configured simulation overrides.
    pub fn simulation(&self) -> &ConfigOverrides {
        &self.simulation
    }

    /// Returns the worker configuration.
    pub fn worker(&self) -> &WorkerConfig {
        &self.worker
    }

    /// Resolves the base [`SimulationConfig`] every run merges onto.
    pub fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig::default().merge(&self.simulation)
    }
}

/// Settings for the [`LayoutWorker`](crate::LayoutWorker) thread.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Name given to the worker thread.
    #[serde(default = "default_thread_name")]
    thread_name: String,

    /// Capacity of the outbound event channel; `0` means unbounded.
    #[serde(default)]
    event_capacity: usize,
}

fn default_thread_name() -> String {
    "astrolabe-layout".to_string()
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            thread_name: default_thread_name(),
            event_capacity: 0,
        }
    }
}

impl WorkerConfig {
    /// Creates a new [`WorkerConfig`].
    pub fn new(thread_name: impl Into<String>, event_capacity: usize) -> Self {
        Self {
            thread_name: thread_name.into(),
            event_capacity,
        }
    }

    /// Returns the worker thread name.
    pub fn thread_name(&self) -> &str {
        &self.thread_name
    }

    /// Returns the outbound channel capacity, `0` for unbounded.
    pub fn event_capacity(&self) -> usize {
        self.event_capacity
    }
}
