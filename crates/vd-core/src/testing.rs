//! In-memory collaborators for unit tests
//!
//! `FakePhysics` never integrates anything: bodies stay where they were put
//! unless `drift` is set. `FakeScene` uses an orthographic camera looking down
//! -Z from z = 10, mapping NDC (-1..1) to world x in (-4..4) and y in (-2..6).

use std::collections::{BTreeMap, HashMap};

use glam::{Vec2, Vec3};

use crate::backend::{
    BodyDesc, BodyHandle, BodyKind, ConstraintDesc, ConstraintHandle, NodeId, PhysicsBackend,
    RayHit, SceneBackend, VisualDesc, VisualShape,
};
use crate::geometry::{Pose, Ray};
use crate::input::Viewport;

const ORTHO_HALF_EXTENT: f32 = 4.0;
const ORTHO_CENTER_Y: f32 = 2.0;
const CAMERA_Z: f32 = 10.0;

/// NDC that puts the fake camera's ray through world `(x, y)`
pub fn ndc_for(x: f32, y: f32) -> Vec2 {
    Vec2::new(x / ORTHO_HALF_EXTENT, (y - ORTHO_CENTER_Y) / ORTHO_HALF_EXTENT)
}

/// Pixel position in `viewport` whose ray passes through world `(x, y)`
pub fn screen_for(viewport: &Viewport, x: f32, y: f32) -> Vec2 {
    let ndc = ndc_for(x, y);
    Vec2::new(
        (ndc.x + 1.0) * 0.5 * viewport.width,
        (1.0 - ndc.y) * 0.5 * viewport.height,
    )
}

#[derive(Debug, Clone)]
pub struct FakeBody {
    pub desc: BodyDesc,
    pub pose: Pose,
}

#[derive(Debug, Default)]
pub struct FakePhysics {
    pub bodies: BTreeMap<BodyHandle, FakeBody>,
    pub constraints: BTreeMap<ConstraintHandle, ConstraintDesc>,
    pub impulses: Vec<(BodyHandle, Vec3, Vec3)>,
    pub steps: Vec<(f32, f32, u32)>,
    /// Translation applied to every dynamic body on each step call
    pub drift: Vec3,
    next_id: u64,
}

impl FakePhysics {
    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn body(&self, body: BodyHandle) -> Option<&FakeBody> {
        self.bodies.get(&body)
    }

    /// Place a body (dynamic or not) without going through the dynamics
    pub fn teleport(&mut self, body: BodyHandle, pose: Pose) {
        if let Some(entry) = self.bodies.get_mut(&body) {
            entry.pose = pose;
        }
    }
}

impl PhysicsBackend for FakePhysics {
    fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        let handle = BodyHandle(self.next());
        self.bodies.insert(
            handle,
            FakeBody {
                desc: desc.clone(),
                pose: desc.pose,
            },
        );
        handle
    }

    fn remove_body(&mut self, body: BodyHandle) -> bool {
        self.constraints.retain(|_, desc| {
            let (a, b) = desc.bodies();
            a != body && b != body
        });
        self.bodies.remove(&body).is_some()
    }

    fn create_constraint(&mut self, desc: &ConstraintDesc) -> Option<ConstraintHandle> {
        let (a, b) = desc.bodies();
        if !self.bodies.contains_key(&a) || !self.bodies.contains_key(&b) {
            return None;
        }
        let handle = ConstraintHandle(self.next());
        self.constraints.insert(handle, desc.clone());
        Some(handle)
    }

    fn remove_constraint(&mut self, constraint: ConstraintHandle) -> bool {
        self.constraints.remove(&constraint).is_some()
    }

    fn set_body_position(&mut self, body: BodyHandle, position: Vec3) {
        if let Some(entry) = self.bodies.get_mut(&body) {
            entry.pose.position = position;
        }
    }

    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec3, world_point: Vec3) {
        self.impulses.push((body, impulse, world_point));
    }

    fn step(&mut self, fixed_dt: f32, delta: f32, max_substeps: u32) {
        self.steps.push((fixed_dt, delta, max_substeps));
        for entry in self.bodies.values_mut() {
            if entry.desc.kind == BodyKind::Dynamic {
                entry.pose.position += self.drift;
            }
        }
    }

    fn body_pose(&self, body: BodyHandle) -> Option<Pose> {
        self.bodies.get(&body).map(|entry| entry.pose)
    }

    fn contains_body(&self, body: BodyHandle) -> bool {
        self.bodies.contains_key(&body)
    }

    fn contains_constraint(&self, constraint: ConstraintHandle) -> bool {
        self.constraints.contains_key(&constraint)
    }

    fn constraint_count(&self) -> usize {
        self.constraints.len()
    }
}

#[derive(Debug, Clone)]
struct FakeNode {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// World pose for roots, offset from the parent for children
    pose: Pose,
    shape: Option<VisualShape>,
}

#[derive(Debug, Default)]
pub struct FakeScene {
    nodes: HashMap<NodeId, FakeNode>,
    pub size: Option<(f32, f32)>,
    next_id: u64,
}

impl FakeScene {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    fn insert(&mut self, parent: Option<NodeId>, pose: Pose, shape: Option<VisualShape>) -> NodeId {
        self.next_id += 1;
        let id = NodeId(self.next_id);
        self.nodes.insert(
            id,
            FakeNode {
                parent,
                children: Vec::new(),
                pose,
                shape,
            },
        );
        id
    }

    fn hit_node(&self, ray: &Ray, node: NodeId, out: &mut Vec<RayHit>) {
        let Some(entry) = self.nodes.get(&node) else {
            return;
        };
        if let (Some(shape), Some(pose)) = (entry.shape, self.world_pose(node)) {
            if let Some(distance) = intersect_shape(ray, &shape, &pose) {
                out.push(RayHit {
                    node,
                    point: ray.at(distance),
                    distance,
                });
            }
        }
        for child in &entry.children {
            self.hit_node(ray, *child, out);
        }
    }
}

impl SceneBackend for FakeScene {
    fn spawn(&mut self, desc: &VisualDesc) -> NodeId {
        let root = self.insert(None, Pose::IDENTITY, None);
        for primitive in &desc.primitives {
            let child = self.insert(Some(root), primitive.offset, Some(primitive.shape));
            if let Some(entry) = self.nodes.get_mut(&root) {
                entry.children.push(child);
            }
        }
        root
    }

    fn despawn(&mut self, node: NodeId) -> bool {
        let Some(entry) = self.nodes.remove(&node) else {
            return false;
        };
        for child in entry.children {
            self.despawn(child);
        }
        if let Some(parent) = entry.parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|c| *c != node);
        }
        true
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|entry| entry.parent)
    }

    fn set_world_pose(&mut self, node: NodeId, pose: Pose) {
        let parent_pose = self.parent(node).and_then(|p| self.world_pose(p));
        if let Some(entry) = self.nodes.get_mut(&node) {
            entry.pose = match parent_pose {
                Some(parent) => Pose::new(
                    parent.inverse_transform_point(pose.position),
                    parent.rotation.inverse() * pose.rotation,
                ),
                None => pose,
            };
        }
    }

    fn world_pose(&self, node: NodeId) -> Option<Pose> {
        let entry = self.nodes.get(&node)?;
        match entry.parent {
            Some(parent) => Some(self.world_pose(parent)?.compose(&entry.pose)),
            None => Some(entry.pose),
        }
    }

    fn pointer_ray(&self, ndc: Vec2) -> Ray {
        Ray::new(
            Vec3::new(
                ndc.x * ORTHO_HALF_EXTENT,
                ndc.y * ORTHO_HALF_EXTENT + ORTHO_CENTER_Y,
                CAMERA_Z,
            ),
            Vec3::NEG_Z,
        )
    }

    fn intersect(&self, ray: &Ray, roots: &[NodeId]) -> Vec<RayHit> {
        let mut hits = Vec::new();
        for root in roots {
            self.hit_node(ray, *root, &mut hits);
        }
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    fn camera_forward(&self) -> Vec3 {
        Vec3::NEG_Z
    }

    fn resize(&mut self, width: f32, height: f32) {
        self.size = Some((width, height));
    }
}

fn intersect_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sqrt = disc.sqrt();
    [-b - sqrt, -b + sqrt].into_iter().find(|t| *t >= 0.0)
}

fn intersect_shape(ray: &Ray, shape: &VisualShape, pose: &Pose) -> Option<f32> {
    match *shape {
        VisualShape::Sphere { radius } => intersect_sphere(ray, pose.position, radius),
        VisualShape::Cuboid { size } => {
            let inv = pose.rotation.inverse();
            let origin = inv * (ray.origin - pose.position);
            let direction = inv * ray.direction;
            let half = size * 0.5;
            let mut t_min = f32::NEG_INFINITY;
            let mut t_max = f32::INFINITY;
            for axis in 0..3 {
                if direction[axis].abs() < 1e-8 {
                    if origin[axis].abs() > half[axis] {
                        return None;
                    }
                    continue;
                }
                let t1 = (-half[axis] - origin[axis]) / direction[axis];
                let t2 = (half[axis] - origin[axis]) / direction[axis];
                t_min = t_min.max(t1.min(t2));
                t_max = t_max.min(t1.max(t2));
            }
            if t_max < t_min || t_max < 0.0 {
                return None;
            }
            Some(if t_min >= 0.0 { t_min } else { t_max })
        }
        VisualShape::Cylinder { radius, length } | VisualShape::Cone { radius, length } => {
            let bound = (radius * radius + length * length * 0.25).sqrt();
            intersect_sphere(ray, pose.position, bound)
        }
    }
}
