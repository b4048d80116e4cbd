//! Scene graph of primitive visuals
//!
//! Visual roots carry a name and a pose. Each primitive is a child node with
//! a local offset. The scene owns the camera, answers ray queries for picking
//! and hands per-kind instance batches to the GPU renderer.

use std::collections::BTreeMap;

use glam::{Mat4, Vec2, Vec3};
use vd_core::{NodeId, Pose, Ray, RayHit, SceneBackend, VisualDesc, VisualShape};

use crate::camera::Camera;
use crate::collision::ray_shape_intersection;
use crate::config::RendererConfig;
use crate::primitive::{InstanceBatches, unit_transform};
use crate::vertex::PrimitiveInstance;

#[derive(Debug, Clone)]
struct SceneNode {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Relative to the parent, or world for roots
    local: Pose,
    shape: Option<VisualShape>,
    color: [f32; 4],
}

/// Scene management for renderable primitives
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: BTreeMap<NodeId, SceneNode>,
    next_id: u64,
    camera: Camera,
    viewport: Vec2,
}

impl Scene {
    /// Create an empty scene
    pub fn new(config: &RendererConfig) -> Self {
        Self {
            nodes: BTreeMap::new(),
            next_id: 1,
            camera: Camera::new(&config.camera, 4.0 / 3.0),
            viewport: Vec2::new(800.0, 600.0),
        }
    }

    /// Active camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Active camera, for orbit and zoom
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Last size passed to [`SceneBackend::resize`]
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Number of nodes including primitive children
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the node exists
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    /// Name given at spawn time. Primitive children share their root's name.
    pub fn name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).map(|n| n.name.as_str())
    }

    /// Visual roots in creation order
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(id, _)| *id)
    }

    fn insert(&mut self, node: SceneNode) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    fn collect_leaves(&self, node: NodeId, out: &mut Vec<NodeId>) {
        let Some(entry) = self.nodes.get(&node) else {
            return;
        };
        if entry.shape.is_some() {
            out.push(node);
        }
        for child in &entry.children {
            self.collect_leaves(*child, out);
        }
    }

    /// Model matrices and colors of every primitive, grouped by mesh kind
    pub fn instances(&self) -> InstanceBatches {
        let mut batches = InstanceBatches::default();
        for (id, node) in &self.nodes {
            let Some(shape) = node.shape else {
                continue;
            };
            let Some(pose) = self.world_pose(*id) else {
                continue;
            };
            let (kind, scale) = unit_transform(&shape);
            let model = Mat4::from_scale_rotation_translation(scale, pose.rotation, pose.position);
            batches[kind.index()].push(PrimitiveInstance::new(model, node.color));
        }
        batches
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(&RendererConfig::default())
    }
}

impl SceneBackend for Scene {
    fn spawn(&mut self, desc: &VisualDesc) -> NodeId {
        let root = self.insert(SceneNode {
            name: desc.name.clone(),
            parent: None,
            children: Vec::with_capacity(desc.primitives.len()),
            local: Pose::IDENTITY,
            shape: None,
            color: [1.0; 4],
        });

        for primitive in &desc.primitives {
            let child = self.insert(SceneNode {
                name: desc.name.clone(),
                parent: Some(root),
                children: Vec::new(),
                local: primitive.offset,
                shape: Some(primitive.shape),
                color: primitive.color,
            });
            if let Some(entry) = self.nodes.get_mut(&root) {
                entry.children.push(child);
            }
        }

        tracing::debug!("Spawned visual '{}' as {:?}", desc.name, root);
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
            entry.local = match parent_pose {
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
            Some(parent) => Some(self.world_pose(parent)?.compose(&entry.local)),
            None => Some(entry.local),
        }
    }

    fn pointer_ray(&self, ndc: Vec2) -> Ray {
        self.camera.ndc_to_ray(ndc)
    }

    fn intersect(&self, ray: &Ray, roots: &[NodeId]) -> Vec<RayHit> {
        let mut leaves = Vec::new();
        for root in roots {
            self.collect_leaves(*root, &mut leaves);
        }

        let mut hits: Vec<RayHit> = leaves
            .into_iter()
            .filter_map(|leaf| {
                let shape = self.nodes.get(&leaf)?.shape?;
                let pose = self.world_pose(leaf)?;
                let origin = pose.inverse_transform_point(ray.origin);
                let direction = pose.rotation.inverse() * ray.direction;
                let distance = ray_shape_intersection(origin, direction, &shape)?;
                Some(RayHit {
                    node: leaf,
                    point: ray.at(distance),
                    distance,
                })
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    fn camera_forward(&self) -> Vec3 {
        self.camera.forward()
    }

    fn resize(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        self.viewport = Vec2::new(width, height);
        self.camera.update_aspect(width / height);
    }
}
