//! World configuration

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{PhysicsError, Result};

/// Static half-space boundary. Points satisfy `normal · p >= offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub normal: Vec3,
    pub offset: f32,
}

impl Boundary {
    /// Boundary through `point`, open towards `normal`
    pub fn new(normal: Vec3, point: Vec3) -> Self {
        let normal = normal.normalize_or_zero();
        Self {
            normal,
            offset: normal.dot(point),
        }
    }

    /// Point on the boundary plane closest to the origin
    pub fn origin(&self) -> Vec3 {
        self.normal * self.offset
    }

    /// How far `point` lies inside the solid side (positive when penetrating)
    pub fn penetration(&self, point: Vec3) -> f32 {
        self.offset - self.normal.dot(point)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    pub gravity: Vec3,
    /// Constraint solver iterations per fixed step
    pub solver_iterations: u32,
    /// Coulomb coefficient shared by every collider
    pub friction: f32,
    pub restitution: f32,
    /// Whether bodies joined by a constraint also collide with each other
    pub collide_connected: bool,
    /// Let resting bodies fall asleep until something touches them
    pub allow_sleep: bool,
    pub boundaries: Vec<Boundary>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.82, 0.0),
            solver_iterations: 10,
            friction: 0.6,
            restitution: 0.1,
            collide_connected: false,
            allow_sleep: true,
            boundaries: room_boundaries(),
        }
    }
}

impl WorldConfig {
    pub fn validate(&self) -> Result<()> {
        if self.solver_iterations == 0 {
            return Err(PhysicsError::InvalidIterations);
        }
        if !self.friction.is_finite() || self.friction < 0.0 {
            return Err(PhysicsError::InvalidFriction(self.friction));
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(PhysicsError::InvalidRestitution(self.restitution));
        }
        if !self.gravity.is_finite() {
            return Err(PhysicsError::InvalidGravity);
        }
        for (index, boundary) in self.boundaries.iter().enumerate() {
            if boundary.normal.length_squared() < 1e-6 {
                return Err(PhysicsError::DegenerateBoundary(index));
            }
        }
        Ok(())
    }
}

/// Floor, back wall, side walls and ceiling of the doll's room. The front is open.
pub fn room_boundaries() -> Vec<Boundary> {
    vec![
        Boundary::new(Vec3::Y, Vec3::ZERO),
        Boundary::new(Vec3::Z, Vec3::new(0.0, 0.0, -3.0)),
        Boundary::new(Vec3::X, Vec3::new(-3.0, 0.0, 0.0)),
        Boundary::new(Vec3::NEG_X, Vec3::new(3.0, 0.0, 0.0)),
        Boundary::new(Vec3::NEG_Y, Vec3::new(0.0, 4.5, 0.0)),
    ]
}
