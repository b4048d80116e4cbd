//! Rays, planes and rigid poses

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Rigid transform (position and orientation)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Map a point from this pose's local frame into world space
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// Map a world-space point into this pose's local frame
    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * (world - self.position)
    }

    /// Compose with a pose expressed in this pose's local frame
    pub fn compose(&self, local: &Pose) -> Pose {
        Pose {
            position: self.transform_point(local.position),
            rotation: (self.rotation * local.rotation).normalize(),
        }
    }

    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }
}

/// Half-line with a normalized direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Plane in Hessian normal form: `normal · p + constant = 0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub constant: f32,
}

impl Plane {
    pub fn from_normal_and_point(normal: Vec3, point: Vec3) -> Self {
        let normal = normal.normalize_or_zero();
        Self {
            normal,
            constant: -point.dot(normal),
        }
    }

    /// Signed distance from the plane (positive on the normal side)
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.constant
    }

    /// Move the plane by a world-space offset
    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            normal: self.normal,
            constant: self.constant - offset.dot(self.normal),
        }
    }

    /// Intersect a ray with the plane.
    ///
    /// Returns `None` when the ray is parallel to the plane (and not lying in
    /// it) or when the intersection is behind the ray origin.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<Vec3> {
        let denom = self.normal.dot(ray.direction);
        if denom.abs() < 1e-6 {
            if self.distance_to_point(ray.origin).abs() < 1e-6 {
                return Some(ray.origin);
            }
            return None;
        }

        let t = -(ray.origin.dot(self.normal) + self.constant) / denom;
        if t < 0.0 {
            return None;
        }
        Some(ray.at(t))
    }
}

/// View-aligned plane used to turn 2D pointer motion into a 3D target.
///
/// The depth offset is measured along the plane normal and stays inside
/// `[-limit, limit]`; within that range offsets compose additively.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingPlane {
    base: Plane,
    offset: f32,
}

impl TrackingPlane {
    /// Plane through `point` facing along the camera's forward direction
    pub fn new(camera_forward: Vec3, point: Vec3) -> Self {
        Self {
            base: Plane::from_normal_and_point(camera_forward, point),
            offset: 0.0,
        }
    }

    /// Push the plane along `camera_forward` by `amount`.
    ///
    /// Only the component along the plane normal moves a plane, so the
    /// translation is projected onto it. Returns the offset actually applied
    /// after clamping.
    pub fn adjust(&mut self, amount: f32, camera_forward: Vec3, limit: f32) -> f32 {
        let along = amount * camera_forward.normalize_or_zero().dot(self.base.normal);
        let limit = limit.abs();
        let next = (self.offset + along).clamp(-limit, limit);
        let applied = next - self.offset;
        self.offset = next;
        applied
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn normal(&self) -> Vec3 {
        self.base.normal
    }

    /// Current plane including the depth offset
    pub fn plane(&self) -> Plane {
        self.base.translated(self.base.normal * self.offset)
    }

    pub fn intersect(&self, ray: &Ray) -> Option<Vec3> {
        self.plane().intersect_ray(ray)
    }
}
