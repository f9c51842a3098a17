//! Message protocol between a host and the layout engine.
//!
//! Hosts send [`Command`]s and receive [`Event`]s. Both are tagged JSON
//! objects on the wire:
//!
//! ```text
//! host   → engine   {"cmd": "CONFIGURE_AND_RUN", "entities": [...], "connections": [...], "config": {...}}
//!                   {"cmd": "RESET"} | {"cmd": "PAUSE"} | {"cmd": "RESUME"}
//! engine → host     {"type": "READY"}
//!                   {"type": "POSITIONS_UPDATED", "positions": [...], "entityIds": [...], "iteration": 0, "stabilized": true}
//!                   {"type": "ERROR", "message": "..."}
//! ```
//!
//! Position buffers are flat: entity `i` occupies `positions[3i..3i + 3]`.

use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use astrolabe_core::{
    config::ConfigOverrides,
    geometry::Vec3,
    model::{Connection, Entity},
};

/// Errors from encoding or decoding protocol messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed command: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode event: {0}")]
    Encode(#[source] serde_json::Error),
}

/// A host-to-engine message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    /// Replace the graph, merge the config, and run a full layout.
    ConfigureAndRun(RunRequest),
    /// Clear all state.
    Reset,
    /// Stop applying movement until resumed.
    Pause,
    /// Clear the pause flag and rerun with the current graph.
    Resume,
}

impl Command {
    /// Wire name of the command, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ConfigureAndRun(_) => "CONFIGURE_AND_RUN",
            Self::Reset => "RESET",
            Self::Pause => "PAUSE",
            Self::Resume => "RESUME",
        }
    }
}

/// Payload of [`Command::ConfigureAndRun`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    entities: Vec<Entity>,
    #[serde(default)]
    connections: Vec<Connection>,
    #[serde(
        default,
        deserialize_with = "lenient_overrides",
        skip_serializing_if = "ConfigOverrides::is_empty"
    )]
    config: ConfigOverrides,
}

impl RunRequest {
    pub fn new(entities: Vec<Entity>, connections: Vec<Connection>) -> Self {
        Self {
            entities,
            connections,
            config: ConfigOverrides::default(),
        }
    }

    /// Sets the partial configuration for this run.
    pub fn with_config(mut self, config: ConfigOverrides) -> Self {
        self.config = config;
        self
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn config(&self) -> &ConfigOverrides {
        &self.config
    }

    /// Splits the request into its owned parts.
    pub fn into_parts(self) -> (Vec<Entity>, Vec<Connection>, ConfigOverrides) {
        (self.entities, self.connections, self.config)
    }
}

/// Reads a config object field by field, dropping fields of the wrong type.
fn lenient_overrides<'de, D>(deserializer: D) -> Result<ConfigOverrides, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(overrides_from_value(value))
}

fn overrides_from_value(value: Value) -> ConfigOverrides {
    let fields = match value {
        Value::Object(fields) => fields,
        Value::Null => return ConfigOverrides::default(),
        other => {
            warn!(config:% = other; "Ignoring non-object config");
            return ConfigOverrides::default();
        }
    };

    let accepted: Map<String, Value> = fields
        .into_iter()
        .filter(|(key, raw)| {
            let probe = Value::Object(Map::from_iter([(key.clone(), raw.clone())]));
            match serde_json::from_value::<ConfigOverrides>(probe) {
                Ok(_) => true,
                Err(err) => {
                    warn!(field = key.as_str(); "Ignoring malformed config field: {err}");
                    false
                }
            }
        })
        .collect();

    serde_json::from_value(Value::Object(accepted)).unwrap_or_default()
}

/// An engine-to-host message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    /// The engine is ready to accept commands.
    Ready,
    /// A run (or a state change) produced a new set of positions.
    PositionsUpdated(Snapshot),
    /// A command failed; the engine remains usable.
    Error { message: String },
}

/// Positions of every entity at the end of a command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    positions: Vec<f32>,
    entity_ids: Vec<String>,
    iteration: usize,
    stabilized: bool,
}

impl Snapshot {
    /// Flattens `positions` into a buffer ordered like `entity_ids`.
    pub fn new(
        entity_ids: Vec<String>,
        positions: &[Vec3],
        iteration: usize,
        stabilized: bool,
    ) -> Self {
        debug_assert_eq!(entity_ids.len(), positions.len());
        Self {
            positions: positions.iter().flat_map(|p| p.to_array()).collect(),
            entity_ids,
            iteration,
            stabilized,
        }
    }

    /// The snapshot of an empty, settled simulation.
    pub fn empty() -> Self {
        Self {
            stabilized: true,
            ..Self::default()
        }
    }

    /// Flat position buffer, three components per entity.
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn entity_ids(&self) -> &[String] {
        &self.entity_ids
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn stabilized(&self) -> bool {
        self.stabilized
    }

    /// Pairs each entity id with its position.
    ///
    /// # Examples
    ///
    /// ```
    /// # use astrolabe::{geometry::Vec3, protocol::Snapshot};
    /// let snapshot = Snapshot::new(
    ///     vec!["a".to_string(), "b".to_string()],
    ///     &[Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)],
    ///     10,
    ///     true,
    /// );
    ///
    /// let mapped: Vec<_> = snapshot.positions_by_id().collect();
    /// assert_eq!(mapped[1], ("b", Vec3::new(4.0, 5.0, 6.0)));
    /// ```
    pub fn positions_by_id(&self) -> impl Iterator<Item = (&str, Vec3)> {
        self.entity_ids
            .iter()
            .zip(self.positions.chunks_exact(3))
            .map(|(id, xyz)| (id.as_str(), Vec3::new(xyz[0], xyz[1], xyz[2])))
    }

    /// Moves the buffer and id list out of the snapshot.
    pub fn into_parts(self) -> (Vec<f32>, Vec<String>) {
        (self.positions, self.entity_ids)
    }
}

/// Decodes one JSON command.
///
/// # Errors
///
/// Returns [`ProtocolError::Decode`] when the text is not a known command.
/// Malformed fields inside `config` are not errors; they are dropped.
pub fn decode_command(text: &str) -> Result<Command, ProtocolError> {
    serde_json::from_str(text).map_err(ProtocolError::Decode)
}

/// Encodes one event as a single line of JSON.
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] if serialization fails.
pub fn encode_event(event: &Event) -> Result<String, ProtocolError> {
    serde_json::to_string(event).map_err(ProtocolError::Encode)
}
