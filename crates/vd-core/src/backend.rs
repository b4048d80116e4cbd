//! Collaborator interfaces
//!
//! The core never integrates bodies or rasterizes anything itself. It drives
//! two collaborators through these traits:
//! - [`PhysicsBackend`] - rigid bodies, constraints, stepping
//! - [`SceneBackend`] - visuals, camera rays, ray/geometry intersection

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::geometry::{Pose, Ray};

/// Opaque physics body handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u64);

/// Opaque physics constraint handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintHandle(pub u64);

/// Opaque scene node handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// Collision shape of a rigid part
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Box with full edge lengths
    Cuboid { size: Vec3 },
    Sphere { radius: f32 },
}

impl Shape {
    pub fn cuboid(x: f32, y: f32, z: f32) -> Self {
        Shape::Cuboid {
            size: Vec3::new(x, y, z),
        }
    }

    pub fn sphere(radius: f32) -> Self {
        Shape::Sphere { radius }
    }
}

/// How a body participates in the dynamics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyKind {
    #[default]
    Dynamic,
    /// Moved only by setting its position directly
    Kinematic,
    /// Never moves
    Static,
}

/// Rigid body creation request
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDesc {
    pub kind: BodyKind,
    pub mass: f32,
    pub shape: Option<Shape>,
    pub pose: Pose,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl BodyDesc {
    pub fn dynamic(shape: Shape, mass: f32, position: Vec3) -> Self {
        Self {
            kind: BodyKind::Dynamic,
            mass,
            shape: Some(shape),
            pose: Pose::from_position(position),
            linear_damping: 0.0,
            angular_damping: 0.0,
        }
    }

    /// Shapeless body whose position is driven directly
    pub fn kinematic(position: Vec3) -> Self {
        Self {
            kind: BodyKind::Kinematic,
            mass: 0.0,
            shape: None,
            pose: Pose::from_position(position),
            linear_damping: 0.0,
            angular_damping: 0.0,
        }
    }

    pub fn fixed(shape: Shape, position: Vec3) -> Self {
        Self {
            kind: BodyKind::Static,
            mass: 0.0,
            shape: Some(shape),
            pose: Pose::from_position(position),
            linear_damping: 0.0,
            angular_damping: 0.0,
        }
    }

    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear;
        self.angular_damping = angular;
        self
    }
}

/// Closed angular range in radians
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleRange {
    pub min: f32,
    pub max: f32,
}

impl AngleRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, angle: f32) -> bool {
        angle >= self.min && angle <= self.max
    }

    pub fn clamp(&self, angle: f32) -> f32 {
        angle.clamp(self.min, self.max)
    }
}

/// Constraint creation request. Pivots are in each body's local frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintDesc {
    PointToPoint {
        body_a: BodyHandle,
        pivot_a: Vec3,
        body_b: BodyHandle,
        pivot_b: Vec3,
    },
    Hinge {
        body_a: BodyHandle,
        pivot_a: Vec3,
        axis_a: Vec3,
        body_b: BodyHandle,
        pivot_b: Vec3,
        axis_b: Vec3,
        limits: Option<AngleRange>,
    },
}

impl ConstraintDesc {
    pub fn bodies(&self) -> (BodyHandle, BodyHandle) {
        match self {
            ConstraintDesc::PointToPoint { body_a, body_b, .. }
            | ConstraintDesc::Hinge { body_a, body_b, .. } => (*body_a, *body_b),
        }
    }
}

/// Rigid-body dynamics collaborator
pub trait PhysicsBackend {
    fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle;

    /// Remove a body. Returns `false` for unknown handles.
    fn remove_body(&mut self, body: BodyHandle) -> bool;

    /// Returns `None` when either body is unknown.
    fn create_constraint(&mut self, desc: &ConstraintDesc) -> Option<ConstraintHandle>;

    /// Remove a constraint. Returns `false` for unknown handles.
    fn remove_constraint(&mut self, constraint: ConstraintHandle) -> bool;

    /// Teleport a body. Intended for kinematic anchors.
    fn set_body_position(&mut self, body: BodyHandle, position: Vec3);

    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec3, world_point: Vec3);

    /// Advance by whole `fixed_dt` steps covering `delta`, at most `max_substeps`.
    fn step(&mut self, fixed_dt: f32, delta: f32, max_substeps: u32);

    fn body_pose(&self, body: BodyHandle) -> Option<Pose>;

    fn contains_body(&self, body: BodyHandle) -> bool;

    fn contains_constraint(&self, constraint: ConstraintHandle) -> bool;

    fn constraint_count(&self) -> usize;

    /// Express a world point in a body's local frame
    fn point_to_local(&self, body: BodyHandle, world_point: Vec3) -> Option<Vec3> {
        self.body_pose(body)
            .map(|pose| pose.inverse_transform_point(world_point))
    }
}

/// Primitive visual geometry. Cylinders and cones run along local +Z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VisualShape {
    Cuboid { size: Vec3 },
    Sphere { radius: f32 },
    Cylinder { radius: f32, length: f32 },
    /// Apex points towards local -Z
    Cone { radius: f32, length: f32 },
}

impl From<Shape> for VisualShape {
    fn from(shape: Shape) -> Self {
        match shape {
            Shape::Cuboid { size } => VisualShape::Cuboid { size },
            Shape::Sphere { radius } => VisualShape::Sphere { radius },
        }
    }
}

/// One primitive of a compound visual, placed relative to the visual root
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualPrimitive {
    pub shape: VisualShape,
    pub offset: Pose,
    pub color: [f32; 4],
}

/// Compound visual creation request
#[derive(Debug, Clone, PartialEq)]
pub struct VisualDesc {
    pub name: String,
    pub primitives: Vec<VisualPrimitive>,
}

/// Ray intersection result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Leaf node that was struck
    pub node: NodeId,
    pub point: Vec3,
    pub distance: f32,
}

/// Rendering / scene-graph collaborator
pub trait SceneBackend {
    /// Create a visual root with one child node per primitive
    fn spawn(&mut self, desc: &VisualDesc) -> NodeId;

    /// Remove a node and its children. Returns `false` for unknown nodes.
    fn despawn(&mut self, node: NodeId) -> bool;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn set_world_pose(&mut self, node: NodeId, pose: Pose);

    fn world_pose(&self, node: NodeId) -> Option<Pose>;

    /// Ray from the active camera through a normalized device coordinate
    fn pointer_ray(&self, ndc: Vec2) -> Ray;

    /// Intersect `ray` with `roots` and all their descendants, nearest first
    fn intersect(&self, ray: &Ray, roots: &[NodeId]) -> Vec<RayHit>;

    fn camera_forward(&self) -> Vec3;

    /// Viewport size changed; only projection parameters may change
    fn resize(&mut self, width: f32, height: f32);
}
