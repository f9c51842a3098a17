//! Graph data model for layout.
//!
//! An [`Entity`] is a node subject to layout and a [`Connection`] is a
//! weighted reference between two entities. Both deserialize from the
//! camelCase JSON shape used by the message protocol.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

use crate::geometry::Vec3;

/// Coarse quadrant bias applied when seeding an entity's position.
///
/// Hints only affect the initial layout; the simulation is free to move the
/// entity anywhere afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PositionHint {
    UpperRight,
    UpperLeft,
    LowerRight,
    LowerLeft,
}

impl PositionHint {
    /// Unit direction of the quadrant in the x/y plane.
    fn direction(self) -> Vec3 {
        match self {
            Self::UpperRight => Vec3::new(1.0, 1.0, 0.0),
            Self::UpperLeft => Vec3::new(-1.0, 1.0, 0.0),
            Self::LowerRight => Vec3::new(1.0, -1.0, 0.0),
            Self::LowerLeft => Vec3::new(-1.0, -1.0, 0.0),
        }
    }

    /// Returns the quadrant direction scaled by `scale`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use astrolabe_core::{geometry::Vec3, model::PositionHint};
    /// let offset = PositionHint::UpperLeft.offset(0.5);
    /// assert_eq!(offset, Vec3::new(-0.5, 0.5, 0.0));
    /// ```
    pub fn offset(self, scale: f32) -> Vec3 {
        self.direction().scale(scale)
    }
}

impl fmt::Display for PositionHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UpperRight => "upper-right",
            Self::UpperLeft => "upper-left",
            Self::LowerRight => "lower-right",
            Self::LowerLeft => "lower-left",
        };
        f.write_str(name)
    }
}

/// Error returned when a string does not name a [`PositionHint`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown position hint `{0}`")]
pub struct UnknownHint(String);

impl FromStr for PositionHint {
    type Err = UnknownHint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "upper-right" => Ok(Self::UpperRight),
            "upper-left" => Ok(Self::UpperLeft),
            "lower-right" => Ok(Self::LowerRight),
            "lower-left" => Ok(Self::LowerLeft),
            _ => Err(UnknownHint(s.to_string())),
        }
    }
}

/// Reads an optional hint, treating unknown values as absent.
fn lenient_hint<'de, D>(deserializer: D) -> Result<Option<PositionHint>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|name| match name.parse() {
        Ok(hint) => Some(hint),
        Err(err) => {
            log::warn!(hint = name.as_str(); "Ignoring position hint: {err}");
            None
        }
    }))
}

/// A graph node subject to layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    id: String,
    #[serde(
        default,
        deserialize_with = "lenient_hint",
        skip_serializing_if = "Option::is_none"
    )]
    position_hint: Option<PositionHint>,
    /// Host-side visibility metadata; the engine never reads it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    importance: Option<f32>,
}

impl Entity {
    /// Creates an entity with no hint and no importance.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            position_hint: None,
            importance: None,
        }
    }

    /// Sets the quadrant hint used at initialization.
    pub fn with_hint(mut self, hint: PositionHint) -> Self {
        self.position_hint = Some(hint);
        self
    }

    /// Sets the importance metadata.
    pub fn with_importance(mut self, importance: f32) -> Self {
        self.importance = Some(importance);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn position_hint(&self) -> Option<PositionHint> {
        self.position_hint
    }

    pub fn importance(&self) -> Option<f32> {
        self.importance
    }
}

/// A weighted reference between two entities.
///
/// Connections only contribute attraction. An endpoint that names no current
/// entity makes the connection inert rather than invalid, and so does a
/// negative or non-finite `strength`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    from_entity_id: String,
    to_entity_id: String,
    #[serde(default = "default_strength")]
    strength: f32,
}

fn default_strength() -> f32 {
    1.0
}

impl Connection {
    /// Creates a connection with the given attraction multiplier.
    pub fn new(from: impl Into<String>, to: impl Into<String>, strength: f32) -> Self {
        Self {
            from_entity_id: from.into(),
            to_entity_id: to.into(),
            strength,
        }
    }

    pub fn from_entity_id(&self) -> &str {
        &self.from_entity_id
    }

    pub fn to_entity_id(&self) -> &str {
        &self.to_entity_id
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }
}
