//! Simulation configuration.
//!
//! [`SimulationConfig`] is the fully-resolved parameter set the engine runs
//! with. [`ConfigOverrides`] is its partial counterpart: every field is
//! optional and [`SimulationConfig::merge`] applies whatever is present onto a
//! base, so an unspecified field never loses its value.
//!
//! # Example
//!
//! ```
//! # use astrolabe_core::config::{ConfigOverrides, SimulationConfig};
//! let overrides = ConfigOverrides {
//!     iterations: Some(50),
//!     damping: Some(7.0), // outside [0, 1], ignored
//!     ..ConfigOverrides::default()
//! };
//!
//! let config = SimulationConfig::default().merge(&overrides);
//! assert_eq!(config.iterations(), 50);
//! assert_eq!(config.damping(), SimulationConfig::default().damping());
//! ```

use log::warn;
use serde::{Deserialize, Serialize};

/// Fully-resolved parameters for one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    iterations: usize,
    repulsion_strength: f32,
    attraction_strength: f32,
    damping: f32,
    min_distance: f32,
    ideal_distance: f32,
    target_range: f32,
    stabilization_threshold: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            iterations: 300,
            repulsion_strength: 2.0,
            attraction_strength: 0.5,
            damping: 0.9,
            min_distance: 1.5,
            ideal_distance: 2.0,
            target_range: 10.0,
            stabilization_threshold: 0.01,
        }
    }
}

impl SimulationConfig {
    /// Hard upper bound on integration steps.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Numerator of the inverse-square repulsion.
    pub fn repulsion_strength(&self) -> f32 {
        self.repulsion_strength
    }

    /// Spring constant applied to every connection.
    pub fn attraction_strength(&self) -> f32 {
        self.attraction_strength
    }

    /// Fraction of the net force applied per step, in `[0, 1]`.
    pub fn damping(&self) -> f32 {
        self.damping
    }

    /// Repulsion cutoff radius.
    pub fn min_distance(&self) -> f32 {
        self.min_distance
    }

    /// Rest length of connection springs.
    pub fn ideal_distance(&self) -> f32 {
        self.ideal_distance
    }

    /// Output extent along x after normalization.
    pub fn target_range(&self) -> f32 {
        self.target_range
    }

    /// Aggregate movement below which a run is converged.
    pub fn stabilization_threshold(&self) -> f32 {
        self.stabilization_threshold
    }

    /// Returns a copy with every valid override applied.
    ///
    /// Overrides outside a field's domain are logged and skipped so that the
    /// base value survives.
    pub fn merge(&self, overrides: &ConfigOverrides) -> Self {
        let mut merged = *self;

        if let Some(iterations) = overrides.iterations {
            if iterations > 0 {
                merged.iterations = iterations;
            } else {
                warn!(field = "iterations"; "Ignoring non-positive override");
            }
        }

        apply(
            &mut merged.repulsion_strength,
            overrides.repulsion_strength,
            "repulsionStrength",
            |v| v >= 0.0,
        );
        apply(
            &mut merged.attraction_strength,
            overrides.attraction_strength,
            "attractionStrength",
            |v| v >= 0.0,
        );
        apply(&mut merged.damping, overrides.damping, "damping", |v| {
            (0.0..=1.0).contains(&v)
        });
        apply(
            &mut merged.min_distance,
            overrides.min_distance,
            "minDistance",
            |v| v >= 0.0,
        );
        apply(
            &mut merged.ideal_distance,
            overrides.ideal_distance,
            "idealDistance",
            |v| v >= 0.0,
        );
        apply(
            &mut merged.target_range,
            overrides.target_range,
            "targetRange",
            |v| v > 0.0,
        );
        apply(
            &mut merged.stabilization_threshold,
            overrides.stabilization_threshold,
            "stabilizationThreshold",
            |v| v >= 0.0,
        );

        merged
    }
}

fn apply(slot: &mut f32, value: Option<f32>, field: &str, valid: impl Fn(f32) -> bool) {
    let Some(value) = value else {
        return;
    };

    if value.is_finite() && valid(value) {
        *slot = value;
    } else {
        warn!(field = field, value = value; "Ignoring out-of-range override");
    }
}

/// Partial [`SimulationConfig`]; absent fields keep the base value.
///
/// Field names are camelCase on the wire. The snake_case spelling is accepted
/// too, so a `[simulation]` table in a configuration file can use the same
/// style as the rest of the file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterations: Option<usize>,
    #[serde(alias = "repulsion_strength", skip_serializing_if = "Option::is_none")]
    pub repulsion_strength: Option<f32>,
    #[serde(alias = "attraction_strength", skip_serializing_if = "Option::is_none")]
    pub attraction_strength: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damping: Option<f32>,
    #[serde(alias = "min_distance", skip_serializing_if = "Option::is_none")]
    pub min_distance: Option<f32>,
    #[serde(alias = "ideal_distance", skip_serializing_if = "Option::is_none")]
    pub ideal_distance: Option<f32>,
    #[serde(alias = "target_range", skip_serializing_if = "Option::is_none")]
    pub target_range: Option<f32>,
    #[serde(alias = "stabilization_threshold", skip_serializing_if = "Option::is_none")]
    pub stabilization_threshold: Option<f32>,
}

impl ConfigOverrides {
    /// Returns `true` when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
