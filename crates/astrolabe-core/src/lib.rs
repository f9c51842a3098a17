//! Astrolabe Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Astrolabe layout
//! engine and its hosts. It includes:
//!
//! - **Model**: Graph entities and weighted connections ([`model`] module)
//! - **Geometry**: 3D vectors and planar bounds ([`geometry`] module)
//! - **Config**: Simulation parameters and partial overrides ([`config`] module)

pub mod config;
pub mod geometry;
pub mod model;
