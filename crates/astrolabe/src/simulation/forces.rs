//! Net force computation for one integration step.
//!
//! Three contributions are summed per entity:
//!
//! - pairwise inverse-square repulsion inside the `min_distance` radius,
//! - linear springs along every resolved connection,
//! - a weak pull toward the origin.
//!
//! Repulsion and spring forces have their z-component attenuated, which
//! biases the layout toward the x/y plane.

use astrolabe_core::{config::SimulationConfig, geometry::Vec3};

use super::Link;

/// Pairs closer than this exert no force on each other.
const MIN_SEPARATION: f32 = 0.1;
/// Multiplier on the z-component of pair and spring forces.
const Z_ATTENUATION: f32 = 0.3;
/// Centering coefficient on x and y.
const CENTERING_XY: f32 = -0.01;
/// Centering coefficient on z.
const CENTERING_Z: f32 = -0.02;

/// Overwrites `forces` with the net force on every entity.
///
/// `forces` must have the same length as `positions`.
pub(super) fn accumulate(
    positions: &[Vec3],
    links: &[Link],
    config: &SimulationConfig,
    forces: &mut [Vec3],
) {
    debug_assert_eq!(positions.len(), forces.len());
    forces.fill(Vec3::ZERO);

    apply_repulsion(positions, config, forces);
    apply_attraction(positions, links, config, forces);
    apply_centering(positions, forces);
}

fn apply_repulsion(positions: &[Vec3], config: &SimulationConfig, forces: &mut [Vec3]) {
    let min_distance = config.min_distance();
    let strength = config.repulsion_strength();

    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            let separation = positions[i].sub(positions[j]);
            let distance = separation.length();

            if distance < MIN_SEPARATION || distance >= min_distance {
                continue;
            }

            let magnitude = strength / (distance * distance);
            let force = separation
                .scale(magnitude / distance)
                .scale_z(Z_ATTENUATION);

            forces[i] = forces[i].add(force);
            forces[j] = forces[j].sub(force);
        }
    }
}

fn apply_attraction(
    positions: &[Vec3],
    links: &[Link],
    config: &SimulationConfig,
    forces: &mut [Vec3],
) {
    let rest_length = config.ideal_distance();
    let stiffness = config.attraction_strength();

    for link in links {
        let span = positions[link.target].sub(positions[link.source]);
        let distance = span.length();

        if distance < MIN_SEPARATION {
            continue;
        }

        // Positive when stretched: pulls the endpoints together.
        let magnitude = (distance - rest_length) * stiffness * link.strength;
        let force = span.scale(magnitude / distance).scale_z(Z_ATTENUATION);

        forces[link.source] = forces[link.source].add(force);
        forces[link.target] = forces[link.target].sub(force);
    }
}

fn apply_centering(positions: &[Vec3], forces: &mut [Vec3]) {
    for (force, position) in forces.iter_mut().zip(positions) {
        let pull = Vec3::new(
            position.x() * CENTERING_XY,
            position.y() * CENTERING_XY,
            position.z() * CENTERING_Z,
        );
        *force = force.add(pull);
    }
}
