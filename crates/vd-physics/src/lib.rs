//! Rigid body physics for voodoo
//!
//! Wraps a [`rapier3d`] pipeline: boxes and spheres, point and hinge joints,
//! body-to-body contacts, and static half-space boundaries. It implements
//! [`vd_core::PhysicsBackend`] so a [`vd_core::Session`] can drive it.

pub mod config;
pub mod error;
pub mod world;

pub use config::{Boundary, WorldConfig, room_boundaries};
pub use error::{PhysicsError, Result};
pub use world::{JointRecord, PhysicsWorld};
