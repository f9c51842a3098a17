//! Force-directed layout simulation.
//!
//! A [`Simulation`] owns everything a run needs: the current entities and
//! connections, one position per entity, the active configuration, and the
//! pause flag. It is a plain value with no shared state, so independent
//! simulations never interfere with each other.
//!
//! A run goes through four stages:
//!
//! 1. [`initializer`] seeds a circular, non-degenerate starting layout.
//! 2. [`forces`] computes the net force on every entity for one step.
//! 3. [`integrator`] applies forces with damping and decay until the
//!    aggregate movement falls below the stabilization threshold.
//! 4. [`normalizer`] rescales the x/y plane into the configured extent.

mod forces;
mod initializer;
mod integrator;
mod normalizer;

pub use integrator::Convergence;
pub use normalizer::Y_EXTENT_RATIO;

use indexmap::IndexMap;
use log::{debug, warn};
use thiserror::Error;

use astrolabe_core::{
    config::{ConfigOverrides, SimulationConfig},
    geometry::Vec3,
    model::{Connection, Entity},
};

use crate::protocol::Snapshot;

/// Internal computation failures surfaced to hosts as `ERROR` events.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("position of entity `{entity}` became non-finite at iteration {iteration}")]
    NonFinite { entity: String, iteration: usize },

    #[error("position store holds {positions} entries for {entities} entities")]
    PositionCountMismatch { positions: usize, entities: usize },
}

/// A connection resolved to entity indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Link {
    source: usize,
    target: usize,
    strength: f32,
}

/// Owned state of one layout simulation.
///
/// # Examples
///
/// ```
/// use astrolabe::{
///     Simulation,
///     config::{ConfigOverrides, SimulationConfig},
///     model::{Connection, Entity},
/// };
///
/// let mut simulation = Simulation::new(SimulationConfig::default());
/// simulation.configure(
///     vec![Entity::new("a"), Entity::new("b")],
///     vec![Connection::new("a", "b", 1.0)],
///     &ConfigOverrides::default(),
/// );
///
/// let snapshot = simulation.run().expect("layout should converge");
/// assert_eq!(snapshot.entity_ids(), ["a", "b"]);
/// assert_eq!(snapshot.positions().len(), 6);
/// ```
#[derive(Debug, Clone)]
pub struct Simulation {
    base: SimulationConfig,
    config: SimulationConfig,
    entities: IndexMap<String, Entity>,
    links: Vec<Link>,
    positions: Vec<Vec3>,
    paused: bool,
}

impl Simulation {
    /// Creates an empty simulation whose runs merge overrides onto `base`.
    pub fn new(base: SimulationConfig) -> Self {
        Self {
            base,
            config: base,
            entities: IndexMap::new(),
            links: Vec::new(),
            positions: Vec::new(),
            paused: false,
        }
    }

    /// Replaces the whole graph and configuration.
    ///
    /// Entities keep their input order. A repeated id keeps its first slot and
    /// takes the later record. Connections whose endpoints are not both
    /// present are dropped. Positions are reseeded for the new entity set.
    pub fn configure(
        &mut self,
        entities: Vec<Entity>,
        connections: Vec<Connection>,
        overrides: &ConfigOverrides,
    ) {
        self.config = self.base.merge(overrides);

        let mut by_id = IndexMap::with_capacity(entities.len());
        for entity in entities {
            if let Some(previous) = by_id.insert(entity.id().to_string(), entity) {
                warn!(entity_id = previous.id(); "Duplicate entity id, keeping the last record");
            }
        }
        self.entities = by_id;

        let connection_count = connections.len();
        self.links = connections
            .iter()
            .filter_map(|connection| self.resolve(connection))
            .collect();

        let dropped = connection_count - self.links.len();
        if dropped > 0 {
            warn!(dropped = dropped; "Ignoring unusable connections");
        }

        debug!(
            entity_count = self.entities.len(),
            link_count = self.links.len();
            "Simulation configured"
        );

        self.initialize();
    }

    fn resolve(&self, connection: &Connection) -> Option<Link> {
        let source = self.entities.get_index_of(connection.from_entity_id())?;
        let target = self.entities.get_index_of(connection.to_entity_id())?;

        // A negative spring pushes without bound.
        let strength = connection.strength();
        if !strength.is_finite() || strength < 0.0 {
            warn!(
                from = connection.from_entity_id(),
                to = connection.to_entity_id(),
                strength = strength;
                "Ignoring connection with out-of-range strength"
            );
            return None;
        }

        Some(Link {
            source,
            target,
            strength,
        })
    }

    /// Seeds positions from the current entity order.
    pub fn initialize(&mut self) {
        self.positions = initializer::seed_positions(self.entities.values());
    }

    /// Runs the integration loop on the current positions.
    ///
    /// Positions stay in unnormalized simulation space.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError`] if the position store no longer matches
    /// the entity set or a position becomes non-finite.
    pub fn integrate(&mut self) -> Result<Convergence, SimulationError> {
        if self.positions.len() != self.entities.len() {
            return Err(SimulationError::PositionCountMismatch {
                positions: self.positions.len(),
                entities: self.entities.len(),
            });
        }

        integrator::integrate(&mut self.positions, &self.links, &self.config).map_err(|diverged| {
            SimulationError::NonFinite {
                entity: self.entity_id(diverged.index),
                iteration: diverged.iteration,
            }
        })
    }

    /// Rescales the x/y plane into the configured target extent.
    pub fn normalize(&mut self) {
        normalizer::normalize(&mut self.positions, self.config.target_range());
    }

    /// Performs a full run: initialize, integrate, normalize.
    ///
    /// On failure the positions are reseeded so the simulation holds finite
    /// values and can be used again.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError`] when the run produces invalid positions.
    pub fn run(&mut self) -> Result<Snapshot, SimulationError> {
        let result = self.run_stages();
        if result.is_err() {
            self.initialize();
        }
        result
    }

    fn run_stages(&mut self) -> Result<Snapshot, SimulationError> {
        self.initialize();
        let convergence = self.integrate()?;
        self.normalize();

        if let Some(index) = self.positions.iter().position(|p| !p.is_finite()) {
            return Err(SimulationError::NonFinite {
                entity: self.entity_id(index),
                iteration: convergence.iterations(),
            });
        }

        debug!(
            entity_count = self.entities.len(),
            iterations = convergence.iterations(),
            movement = convergence.movement(),
            stabilized = convergence.stabilized();
            "Simulation run finished"
        );

        Ok(self.snapshot(convergence.iterations(), convergence.stabilized()))
    }

    /// Clears entities, connections, positions, and the pause flag.
    pub fn reset(&mut self) {
        *self = Self::new(self.base);
    }

    /// Freezes positions; runs requested while paused leave them untouched.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Clears the pause flag. Does not start a run by itself.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Whether [`pause`](Self::pause) is in effect.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Captures the current positions in entity order.
    pub fn snapshot(&self, iteration: usize, stabilized: bool) -> Snapshot {
        Snapshot::new(
            self.entities.keys().cloned().collect(),
            &self.positions,
            iteration,
            stabilized,
        )
    }

    /// Entities in layout order.
    pub fn entities(&self) -> impl ExactSizeIterator<Item = &Entity> {
        self.entities.values()
    }

    /// Positions indexed like [`entities`](Self::entities).
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Looks up the position of an entity by id.
    pub fn position_of(&self, id: &str) -> Option<Vec3> {
        self.entities
            .get_index_of(id)
            .and_then(|index| self.positions.get(index).copied())
    }

    /// Configuration of the current (or next) run.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Number of connections that resolved to existing entities.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    fn entity_id(&self, index: usize) -> String {
        self.entities
            .get_index(index)
            .map(|(id, _)| id.clone())
            .unwrap_or_default()
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use astrolabe_core::model::PositionHint;

    use super::*;

    fn entities(ids: &[&str]) -> Vec<Entity> {
        ids.iter().map(|id| Entity::new(*id)).collect()
    }

    #[test]
    fn test_new_simulation_is_empty() {
        let simulation = Simulation::default();
        assert_eq!(simulation.entities().len(), 0);
        assert!(simulation.positions().is_empty());
        assert!(!simulation.is_paused());
    }

    #[test]
    fn test_configure_keeps_one_position_per_entity() {
        let mut simulation = Simulation::default();
        simulation.configure(entities(&["a", "b", "c"]), vec![], &ConfigOverrides::default());

        assert_eq!(simulation.positions().len(), 3);
    }

    #[test]
    fn test_duplicate_ids_collapse() {
        let mut simulation = Simulation::default();
        simulation.configure(
            vec![
                Entity::new("a"),
                Entity::new("b"),
                Entity::new("a").with_hint(PositionHint::LowerLeft),
            ],
            vec![],
            &ConfigOverrides::default(),
        );

        let ids: Vec<_> = simulation.entities().map(Entity::id).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(simulation.positions().len(), 2);
        assert_eq!(
            simulation.entities().next().unwrap().position_hint(),
            Some(PositionHint::LowerLeft)
        );
    }

    #[test]
    fn test_dangling_connections_are_dropped() {
        let mut simulation = Simulation::default();
        simulation.configure(
            entities(&["a", "b"]),
            vec![
                Connection::new("a", "b", 1.0),
                Connection::new("a", "ghost", 1.0),
                Connection::new("ghost", "b", 1.0),
            ],
            &ConfigOverrides::default(),
        );

        assert_eq!(simulation.link_count(), 1);
    }

    #[test]
    fn test_out_of_range_strengths_are_dropped() {
        let mut simulation = Simulation::default();
        simulation.configure(
            entities(&["a", "b", "c", "d"]),
            vec![
                Connection::new("a", "b", 1.0),
                Connection::new("b", "c", -1.0),
                Connection::new("c", "d", f32::NAN),
                Connection::new("d", "a", f32::INFINITY),
                Connection::new("c", "a", 0.0),
            ],
            &ConfigOverrides::default(),
        );

        assert_eq!(simulation.link_count(), 2);

        let snapshot = simulation.run().unwrap();
        assert_eq!(snapshot.entity_ids(), ["a", "b", "c", "d"]);
        assert!(snapshot.positions().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_connections_without_entities() {
        let mut simulation = Simulation::default();
        simulation.configure(
            vec![],
            vec![Connection::new("a", "b", 1.0)],
            &ConfigOverrides::default(),
        );

        assert_eq!(simulation.link_count(), 0);
        let snapshot = simulation.run().unwrap();
        assert!(snapshot.positions().is_empty());
        assert_eq!(snapshot.iteration(), 0);
        assert!(snapshot.stabilized());
    }

    #[test]
    fn test_configure_merges_onto_base_not_previous() {
        let mut simulation = Simulation::default();
        simulation.configure(
            vec![],
            vec![],
            &ConfigOverrides {
                iterations: Some(5),
                ..ConfigOverrides::default()
            },
        );
        assert_eq!(simulation.config().iterations(), 5);

        simulation.configure(vec![], vec![], &ConfigOverrides::default());
        assert_eq!(simulation.config().iterations(), 300);
    }

    #[test]
    fn test_two_entities_settle_near_ideal_distance() {
        let mut simulation = Simulation::default();
        simulation.configure(
            entities(&["a", "b"]),
            vec![Connection::new("a", "b", 1.0)],
            &ConfigOverrides {
                ideal_distance: Some(2.0),
                ..ConfigOverrides::default()
            },
        );

        simulation.integrate().unwrap();

        let a = simulation.position_of("a").unwrap();
        let b = simulation.position_of("b").unwrap();
        let distance = a.distance(b);
        assert!((distance - 2.0).abs() < 0.1, "distance was {distance}");
    }

    #[test]
    fn test_run_normalizes_extent() {
        let mut simulation = Simulation::default();
        simulation.configure(
            entities(&["a", "b", "c", "d"]),
            vec![
                Connection::new("a", "b", 1.0),
                Connection::new("b", "c", 1.0),
                Connection::new("c", "d", 1.0),
                Connection::new("d", "a", 1.0),
            ],
            &ConfigOverrides::default(),
        );

        simulation.run().unwrap();

        let xs: Vec<f32> = simulation.positions().iter().map(|p| p.x()).collect();
        let ys: Vec<f32> = simulation.positions().iter().map(|p| p.y()).collect();
        let span = |values: &[f32]| {
            values.iter().copied().fold(f32::MIN, f32::max)
                - values.iter().copied().fold(f32::MAX, f32::min)
        };

        assert_approx_eq!(f32, span(&xs), 10.0, epsilon = 1e-4);
        assert_approx_eq!(f32, span(&ys), 7.0, epsilon = 1e-4);
    }

    #[test]
    fn test_mismatched_positions_are_reported() {
        let mut simulation = Simulation::default();
        simulation.configure(entities(&["a", "b"]), vec![], &ConfigOverrides::default());
        simulation.positions.pop();

        assert_eq!(
            simulation.integrate(),
            Err(SimulationError::PositionCountMismatch {
                positions: 1,
                entities: 2
            })
        );
    }

    #[test]
    fn test_divergence_is_reported_and_recovered() {
        let mut simulation = Simulation::default();
        simulation.configure(
            entities(&["a", "b"]),
            vec![Connection::new("a", "b", f32::MAX)],
            &ConfigOverrides::default(),
        );

        let err = simulation.run().unwrap_err();
        assert!(matches!(err, SimulationError::NonFinite { .. }), "{err:?}");

        assert_eq!(simulation.positions().len(), 2);
        assert!(simulation.positions().iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut simulation = Simulation::default();
        simulation.configure(entities(&["a"]), vec![], &ConfigOverrides::default());
        simulation.pause();

        simulation.reset();

        assert_eq!(simulation.entities().len(), 0);
        assert!(simulation.positions().is_empty());
        assert!(!simulation.is_paused());
        assert_eq!(simulation.link_count(), 0);
    }

    #[test]
    fn test_run_is_deterministic() {
        let graph = || {
            (
                entities(&["a", "b", "c", "d", "e"]),
                vec![
                    Connection::new("a", "b", 1.0),
                    Connection::new("a", "c", 0.5),
                    Connection::new("d", "e", 2.0),
                ],
            )
        };

        let mut first = Simulation::default();
        let (e, c) = graph();
        first.configure(e, c, &ConfigOverrides::default());

        let mut second = Simulation::default();
        let (e, c) = graph();
        second.configure(e, c, &ConfigOverrides::default());

        assert_eq!(first.run().unwrap(), second.run().unwrap());
    }
}
