//! Damped integration loop with convergence detection.

use log::trace;

use astrolabe_core::{config::SimulationConfig, geometry::Vec3};

use super::{Link, forces};

/// Lower bound of the cool-down factor.
const MIN_DECAY: f32 = 0.5;

/// Outcome of an integration run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Convergence {
    iterations: usize,
    movement: f32,
    stabilized: bool,
}

impl Convergence {
    /// Number of completed integration steps.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Aggregate movement of the last completed step.
    pub fn movement(&self) -> f32 {
        self.movement
    }

    /// Whether the last step moved less than the stabilization threshold.
    pub fn stabilized(&self) -> bool {
        self.stabilized
    }
}

/// A position became non-finite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Diverged {
    pub(super) index: usize,
    pub(super) iteration: usize,
}

/// Cool-down factor for step `step` of `iterations`, from `1.0` down to `0.5`.
fn decay(step: usize, iterations: usize) -> f32 {
    (1.0 - (step as f32 / iterations as f32) * 0.5).max(MIN_DECAY)
}

/// Advances `positions` until they stabilize or the iteration cap is reached.
pub(super) fn integrate(
    positions: &mut [Vec3],
    links: &[Link],
    config: &SimulationConfig,
) -> Result<Convergence, Diverged> {
    if positions.is_empty() {
        return Ok(Convergence {
            iterations: 0,
            movement: 0.0,
            stabilized: true,
        });
    }

    let iterations = config.iterations();
    let threshold = config.stabilization_threshold();
    let mut forces = vec![Vec3::ZERO; positions.len()];
    let mut movement = f32::INFINITY;
    let mut completed = 0;

    for step in 0..iterations {
        forces::accumulate(positions, links, config, &mut forces);

        let factor = config.damping() * decay(step, iterations);
        movement = 0.0;
        for (position, force) in positions.iter_mut().zip(&forces) {
            let delta = force.scale(factor);
            *position = position.add(delta);
            movement += delta.length();
        }
        completed = step + 1;

        if let Some(index) = positions.iter().position(|p| !p.is_finite()) {
            return Err(Diverged {
                index,
                iteration: completed,
            });
        }

        trace!(step = step, movement = movement; "Integration step");

        if movement < threshold {
            break;
        }
    }

    Ok(Convergence {
        iterations: completed,
        movement,
        stabilized: movement < threshold,
    })
}
