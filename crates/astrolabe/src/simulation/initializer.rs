//! Starting layout for a simulation run.
//!
//! Entities are spread evenly around a flattened ring so that no two start on
//! the same point, which would leave their repulsion undefined.

use std::f32::consts::TAU;

use astrolabe_core::{geometry::Vec3, model::Entity};

/// Radius of the seed ring.
const SEED_RADIUS: f32 = 2.5;
/// Vertical squash applied to the ring.
const Y_SQUASH: f32 = 0.6;
/// Depth amplitude of the ring.
const Z_AMPLITUDE: f32 = 0.5;
/// Scale applied to a hint's quadrant direction.
const HINT_SCALE: f32 = 0.5;

/// Computes one seed position per entity, in iteration order.
pub(super) fn seed_positions<'a>(entities: impl ExactSizeIterator<Item = &'a Entity>) -> Vec<Vec3> {
    let count = entities.len() as f32;

    entities
        .enumerate()
        .map(|(i, entity)| {
            let angle = (i as f32 / count) * TAU;
            let base = Vec3::new(
                angle.cos() * SEED_RADIUS,
                angle.sin() * SEED_RADIUS * Y_SQUASH,
                angle.sin() * Z_AMPLITUDE,
            );

            match entity.position_hint() {
                Some(hint) => base.add(hint.offset(HINT_SCALE)),
                None => base,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use astrolabe_core::model::PositionHint;

    use super::*;

    #[test]
    fn test_empty_input() {
        let entities: Vec<Entity> = vec![];
        assert!(seed_positions(entities.iter()).is_empty());
    }

    #[test]
    fn test_single_entity_on_positive_x() {
        let entities = [Entity::new("solo")];
        let positions = seed_positions(entities.iter());

        assert_eq!(positions, [Vec3::new(2.5, 0.0, 0.0)]);
    }

    #[test]
    fn test_quarter_turn() {
        let entities: Vec<_> = (0..4).map(|i| Entity::new(format!("e{i}"))).collect();
        let positions = seed_positions(entities.iter());

        let quarter = positions[1];
        assert_approx_eq!(f32, quarter.x(), 0.0, epsilon = 1e-6);
        assert_approx_eq!(f32, quarter.y(), 1.5, epsilon = 1e-6);
        assert_approx_eq!(f32, quarter.z(), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_hint_offsets_seed() {
        let entities = [
            Entity::new("a").with_hint(PositionHint::UpperRight),
            Entity::new("b").with_hint(PositionHint::LowerLeft),
        ];
        let positions = seed_positions(entities.iter());

        assert_approx_eq!(f32, positions[0].x(), 3.0);
        assert_approx_eq!(f32, positions[0].y(), 0.5);
        assert_approx_eq!(f32, positions[1].x(), -3.0);
        assert_approx_eq!(f32, positions[1].y(), -0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_seeds_are_distinct() {
        let entities: Vec<_> = (0..12).map(|i| Entity::new(format!("e{i}"))).collect();
        let positions = seed_positions(entities.iter());

        for (i, a) in positions.iter().enumerate() {
            for b in &positions[i + 1..] {
                assert!(a.distance(*b) > 0.1);
            }
        }
    }
}
