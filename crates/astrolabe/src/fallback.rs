//! Static layout for hosts that cannot reach the layout worker.
//!
//! [`static_layout`] places entities on a square grid inside the same extent
//! the normalizer produces. It is deterministic, synchronous, and never
//! touches a [`Simulation`](crate::Simulation), so a host can call it after an
//! `ERROR` event or when no worker could be started.

use astrolabe_core::{config::SimulationConfig, geometry::Vec3, model::Entity};

use crate::{protocol::Snapshot, simulation::Y_EXTENT_RATIO};

/// Fraction of a grid cell a position hint may shift an entity by.
const HINT_CELL_FRACTION: f32 = 0.25;

/// Lays entities out on a grid in input order.
///
/// The result has the same shape as a `POSITIONS_UPDATED` payload; its
/// coordinates are not expected to match a simulated layout.
///
/// # Examples
///
/// ```
/// use astrolabe::{config::SimulationConfig, fallback::static_layout, model::Entity};
///
/// let entities = [Entity::new("a"), Entity::new("b"), Entity::new("c")];
/// let snapshot = static_layout(&entities, &SimulationConfig::default());
///
/// assert_eq!(snapshot.positions().len(), 9);
/// assert!(snapshot.stabilized());
/// ```
pub fn static_layout(entities: &[Entity], config: &SimulationConfig) -> Snapshot {
    let count = entities.len();
    if count == 0 {
        return Snapshot::empty();
    }

    // Calculate approximate grid dimensions
    let columns = (count as f32).sqrt().ceil() as usize;
    let rows = count.div_ceil(columns);

    let width = config.target_range();
    let height = width * Y_EXTENT_RATIO;
    let cell_width = width / columns as f32;
    let cell_height = height / rows as f32;
    let hint_scale = cell_width.min(cell_height) * HINT_CELL_FRACTION;

    let positions: Vec<Vec3> = entities
        .iter()
        .enumerate()
        .map(|(i, entity)| {
            let row = i / columns;
            let col = i % columns;

            // Cell centers, first row at the top.
            let base = Vec3::new(
                (col as f32 + 0.5) * cell_width - width / 2.0,
                height / 2.0 - (row as f32 + 0.5) * cell_height,
                0.0,
            );

            match entity.position_hint() {
                Some(hint) => base.add(hint.offset(hint_scale)),
                None => base,
            }
        })
        .collect();

    let ids = entities.iter().map(|e| e.id().to_string()).collect();
    Snapshot::new(ids, &positions, 0, true)
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use astrolabe_core::model::PositionHint;

    use super::*;

    fn grid(count: usize) -> Vec<Entity> {
        (0..count).map(|i| Entity::new(format!("n{i}"))).collect()
    }

    #[test]
    fn test_empty() {
        let snapshot = static_layout(&[], &SimulationConfig::default());
        assert_eq!(snapshot, Snapshot::empty());
    }

    #[test]
    fn test_single_entity_is_centered() {
        let snapshot = static_layout(&grid(1), &SimulationConfig::default());
        assert_eq!(snapshot.positions(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_shape_matches_entities() {
        let entities = grid(7);
        let snapshot = static_layout(&entities, &SimulationConfig::default());

        assert_eq!(snapshot.positions().len(), 21);
        let ids: Vec<_> = entities.iter().map(|e| e.id().to_string()).collect();
        assert_eq!(snapshot.entity_ids(), ids.as_slice());
    }

    #[test]
    fn test_positions_stay_inside_extent() {
        let snapshot = static_layout(&grid(10), &SimulationConfig::default());

        for (_, p) in snapshot.positions_by_id() {
            assert!(p.x().abs() <= 5.0);
            assert!(p.y().abs() <= 3.5);
            assert_eq!(p.z(), 0.0);
        }
    }

    #[test]
    fn test_grid_rows_go_downward() {
        let snapshot = static_layout(&grid(4), &SimulationConfig::default());
        let positions: Vec<_> = snapshot.positions_by_id().map(|(_, p)| p).collect();

        // 2x2 grid: 0 1 / 2 3
        assert_approx_eq!(f32, positions[0].x(), -2.5);
        assert_approx_eq!(f32, positions[1].x(), 2.5);
        assert_approx_eq!(f32, positions[0].y(), 1.75);
        assert_approx_eq!(f32, positions[2].y(), -1.75);
    }

    #[test]
    fn test_hint_shifts_within_cell() {
        let plain = static_layout(&[Entity::new("a")], &SimulationConfig::default());
        let hinted = static_layout(
            &[Entity::new("a").with_hint(PositionHint::UpperRight)],
            &SimulationConfig::default(),
        );

        let (_, p) = plain.positions_by_id().next().unwrap();
        let (_, h) = hinted.positions_by_id().next().unwrap();
        assert!(h.x() > p.x());
        assert!(h.y() > p.y());
    }

    #[test]
    fn test_is_deterministic() {
        let entities = grid(9);
        let config = SimulationConfig::default();
        assert_eq!(
            static_layout(&entities, &config),
            static_layout(&entities, &config)
        );
    }
}
