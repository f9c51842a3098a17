//! Rescaling of a finished layout into a fixed output extent.

use astrolabe_core::geometry::{Bounds, Vec3};

/// Ratio of the y extent to the x extent of a normalized layout.
pub const Y_EXTENT_RATIO: f32 = 0.7;

/// Avoids dividing by zero when every position shares a coordinate.
fn guard(range: f32) -> f32 {
    if range == 0.0 { 1.0 } else { range }
}

/// Maps x onto `[-target_range / 2, target_range / 2]` and y onto the same
/// interval scaled by [`Y_EXTENT_RATIO`]. The z-axis is left untouched.
pub(super) fn normalize(positions: &mut [Vec3], target_range: f32) {
    let Some(bounds) = Bounds::enclosing(positions.iter().copied()) else {
        return;
    };

    let range_x = guard(bounds.width());
    let range_y = guard(bounds.height());
    let extent_y = target_range * Y_EXTENT_RATIO;

    for position in positions.iter_mut() {
        let x = ((position.x() - bounds.min_x()) / range_x - 0.5) * target_range;
        let y = ((position.y() - bounds.min_y()) / range_y - 0.5) * extent_y;
        *position = position.with_x(x).with_y(y);
    }
}
