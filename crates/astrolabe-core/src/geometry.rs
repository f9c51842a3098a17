//! Geometric primitives for the layout simulation.
//!
//! This module provides the vector and bounding-box types shared by the
//! simulation engine and its hosts.
//!
//! # Overview
//!
//! - [`Vec3`] - A 3D coordinate or displacement in simulation space
//! - [`Bounds`] - An axis-aligned planar (x/y) bounding box
//!
//! # Coordinate System
//!
//! Simulation space is unnormalized and right-handed:
//!
//! ```text
//!        +Y
//!         ▲
//!         │
//!         │
//!         └──────► +X
//!        ╱
//!       ╱
//!     +Z
//! ```
//!
//! - **Origin**: The centering force pulls every entity toward `(0, 0, 0)`
//! - **X/Y**: The main layout plane, rescaled by the normalizer
//! - **Z**: Depth, attenuated by the force model and never rescaled

use serde::{Deserialize, Serialize};

/// A 3D vector representing a position or force in simulation space.
///
/// Vectors use `f32` components and provide the small set of operations the
/// force model needs.
///
/// # Examples
///
/// ```
/// # use astrolabe_core::geometry::Vec3;
/// let a = Vec3::new(1.0, 2.0, 2.0);
/// let b = Vec3::new(1.0, 0.0, 0.0);
///
/// let delta = a.sub(b);
/// assert_eq!(delta, Vec3::new(0.0, 2.0, 2.0));
/// assert_eq!(delta.length(), 8.0f32.sqrt());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    x: f32,
    y: f32,
    z: f32,
}

impl Vec3 {
    /// The zero vector.
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Creates a new vector with the specified components
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Returns the x-component of the vector
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-component of the vector
    pub fn y(self) -> f32 {
        self.y
    }

    /// Returns the z-component of the vector
    pub fn z(self) -> f32 {
        self.z
    }

    /// Creates a new vector with the specified x-component
    pub fn with_x(mut self, x: f32) -> Self {
        self.x = x;
        self
    }

    /// Creates a new vector with the specified y-component
    pub fn with_y(mut self, y: f32) -> Self {
        self.y = y;
        self
    }

    /// Checks if all components are zero
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    /// Checks that no component is NaN or infinite
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Adds another vector to this vector, returning a new vector.
    pub fn add(self, other: Vec3) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }

    /// Subtracts another vector from this vector, returning a new vector
    pub fn sub(self, other: Vec3) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }

    /// Multiplies every component by the given factor.
    ///
    /// # Examples
    ///
    /// ```
    /// # use astrolabe_core::geometry::Vec3;
    /// let v = Vec3::new(1.0, -2.0, 4.0);
    /// assert_eq!(v.scale(0.5), Vec3::new(0.5, -1.0, 2.0));
    /// ```
    pub fn scale(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
            z: self.z * factor,
        }
    }

    /// Multiplies only the z-component by the given factor
    pub fn scale_z(self, factor: f32) -> Self {
        Self {
            z: self.z * factor,
            ..self
        }
    }

    /// Euclidean length of the vector
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Euclidean distance between two points
    pub fn distance(self, other: Vec3) -> f32 {
        self.sub(other).length()
    }

    /// Returns the components as an `[x, y, z]` array
    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

/// An axis-aligned bounding box over the x/y plane.
///
/// The z-axis is deliberately absent: normalization only rescales the layout
/// plane.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates bounds from explicit extents
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Computes the planar bounds enclosing every point.
    ///
    /// Returns `None` when the iterator is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use astrolabe_core::geometry::{Bounds, Vec3};
    /// let points = [Vec3::new(-1.0, 2.0, 9.0), Vec3::new(3.0, -4.0, -9.0)];
    /// let bounds = Bounds::enclosing(points).unwrap();
    ///
    /// assert_eq!(bounds.width(), 4.0);
    /// assert_eq!(bounds.height(), 6.0);
    /// ```
    pub fn enclosing(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let seed = Self::new(first.x, first.y, first.x, first.y);

        Some(points.fold(seed, |bounds, p| Self {
            min_x: bounds.min_x.min(p.x),
            min_y: bounds.min_y.min(p.y),
            max_x: bounds.max_x.max(p.x),
            max_y: bounds.max_y.max(p.y),
        }))
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_vec3_basic_ops() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(0.5, -1.0, 1.0);

        assert_eq!(a.add(b), Vec3::new(1.5, 1.0, 4.0));
        assert_eq!(a.sub(b), Vec3::new(0.5, 3.0, 2.0));
        assert_eq!(a.scale(2.0), Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(a.scale_z(0.5), Vec3::new(1.0, 2.0, 1.5));
    }

    #[test]
    fn test_vec3_length_and_distance() {
        let v = Vec3::new(2.0, 3.0, 6.0);
        assert_approx_eq!(f32, v.length(), 7.0);

        let origin = Vec3::ZERO;
        assert_approx_eq!(f32, v.distance(origin), 7.0);
        assert_approx_eq!(f32, origin.distance(v), 7.0);
    }

    #[test]
    fn test_vec3_is_finite() {
        assert!(Vec3::new(1.0, 2.0, 3.0).is_finite());
        assert!(!Vec3::new(f32::NAN, 0.0, 0.0).is_finite());
        assert!(!Vec3::new(0.0, 0.0, f32::INFINITY).is_finite());
    }

    #[test]
    fn test_vec3_is_zero() {
        assert!(Vec3::ZERO.is_zero());
        assert!(Vec3::default().is_zero());
        assert!(!Vec3::new(0.0, 0.0, 0.1).is_zero());
    }

    #[test]
    fn test_vec3_array_conversion() {
        let v = Vec3::from([1.0, 2.0, 3.0]);
        assert_eq!(v.to_array(), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_bounds_enclosing_empty() {
        assert!(Bounds::enclosing(std::iter::empty()).is_none());
    }

    #[test]
    fn test_bounds_enclosing_single_point() {
        let bounds = Bounds::enclosing([Vec3::new(4.0, -2.0, 1.0)]).unwrap();
        assert_eq!(bounds.min_x(), 4.0);
        assert_eq!(bounds.max_x(), 4.0);
        assert_eq!(bounds.width(), 0.0);
        assert_eq!(bounds.height(), 0.0);
    }

    #[test]
    fn test_bounds_ignore_z() {
        let bounds =
            Bounds::enclosing([Vec3::new(0.0, 0.0, -100.0), Vec3::new(1.0, 1.0, 100.0)]).unwrap();
        assert_eq!(bounds, Bounds::new(0.0, 0.0, 1.0, 1.0));
    }
}
