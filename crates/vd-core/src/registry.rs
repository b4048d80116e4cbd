//! Body registry: named rigid parts and their physics/visual handles

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::{BodyHandle, NodeId, PhysicsBackend, SceneBackend, Shape};
use crate::error::{Result, VoodooError};

/// Rigid part identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartId(pub Uuid);

impl PartId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PartId {
    fn default() -> Self {
        Self::new()
    }
}

/// One segment of the figure
#[derive(Debug, Clone, PartialEq)]
pub struct RigidPart {
    pub id: PartId,
    pub name: String,
    pub shape: Shape,
    pub mass: f32,
    pub body: BodyHandle,
    pub node: NodeId,
}

/// 1:1 mapping between parts, physics bodies and visual roots
#[derive(Debug, Default)]
pub struct BodyRegistry {
    parts: HashMap<PartId, RigidPart>,
    /// Registration order, used for deterministic iteration
    order: Vec<PartId>,
    name_index: HashMap<String, PartId>,
    body_index: HashMap<BodyHandle, PartId>,
    node_index: HashMap<NodeId, PartId>,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a part. Names, bodies and nodes must all be unused.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        shape: Shape,
        mass: f32,
        body: BodyHandle,
        node: NodeId,
    ) -> Result<PartId> {
        let name = name.into();
        if self.name_index.contains_key(&name)
            || self.body_index.contains_key(&body)
            || self.node_index.contains_key(&node)
        {
            return Err(VoodooError::DuplicatePart(name));
        }

        let id = PartId::new();
        self.name_index.insert(name.clone(), id);
        self.body_index.insert(body, id);
        self.node_index.insert(node, id);
        self.order.push(id);
        self.parts.insert(
            id,
            RigidPart {
                id,
                name,
                shape,
                mass,
                body,
                node,
            },
        );
        Ok(id)
    }

    pub fn get(&self, id: PartId) -> Option<&RigidPart> {
        self.parts.get(&id)
    }

    pub fn by_name(&self, name: &str) -> Option<&RigidPart> {
        self.name_index.get(name).and_then(|id| self.parts.get(id))
    }

    pub fn by_body(&self, body: BodyHandle) -> Option<&RigidPart> {
        self.body_index.get(&body).and_then(|id| self.parts.get(id))
    }

    pub fn by_node(&self, node: NodeId) -> Option<&RigidPart> {
        self.node_index.get(&node).and_then(|id| self.parts.get(id))
    }

    /// Look up a part id by name, as a configuration error when missing
    pub fn require(&self, name: &str, context: &str) -> Result<PartId> {
        self.name_index
            .get(name)
            .copied()
            .ok_or_else(|| VoodooError::UnknownPart {
                name: name.to_string(),
                context: context.to_string(),
            })
    }

    /// Parts in registration order
    pub fn iter(&self) -> impl Iterator<Item = &RigidPart> {
        self.order.iter().filter_map(|id| self.parts.get(id))
    }

    /// Visual roots of all parts, for picking
    pub fn nodes(&self) -> Vec<NodeId> {
        self.iter().map(|part| part.node).collect()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Copy every part's physics pose onto its visual root.
    ///
    /// This is the only writer of part visual transforms. Returns the number
    /// of parts synced.
    pub fn sync<P, S>(&self, physics: &P, scene: &mut S) -> usize
    where
        P: PhysicsBackend + ?Sized,
        S: SceneBackend + ?Sized,
    {
        let mut synced = 0;
        for part in self.iter() {
            match physics.body_pose(part.body) {
                Some(pose) => {
                    scene.set_world_pose(part.node, pose);
                    synced += 1;
                }
                None => tracing::warn!("Part '{}' has no physics body", part.name),
            }
        }
        synced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BodyDesc;
    use crate::testing::{FakePhysics, FakeScene};
    use glam::Vec3;

    fn spawn_part(
        registry: &mut BodyRegistry,
        physics: &mut FakePhysics,
        scene: &mut FakeScene,
        name: &str,
        position: Vec3,
    ) -> PartId {
        let shape = Shape::sphere(0.2);
        let body = physics.create_body(&BodyDesc::dynamic(shape, 1.0, position));
        let node = scene.spawn(&crate::visuals::part_visual(name, shape, [1.0; 4]));
        registry.register(name, shape, 1.0, body, node).unwrap()
    }

    #[test]
    fn test_lookups_are_bidirectional() {
        let mut registry = BodyRegistry::new();
        let mut physics = FakePhysics::default();
        let mut scene = FakeScene::default();
        let id = spawn_part(&mut registry, &mut physics, &mut scene, "Head", Vec3::Y);

        let part = registry.get(id).unwrap();
        assert_eq!(registry.by_name("Head").unwrap().id, id);
        assert_eq!(registry.by_body(part.body).unwrap().id, id);
        assert_eq!(registry.by_node(part.node).unwrap().id, id);
        assert_eq!(registry.nodes(), vec![part.node]);
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let mut registry = BodyRegistry::new();
        let mut physics = FakePhysics::default();
        let mut scene = FakeScene::default();
        spawn_part(&mut registry, &mut physics, &mut scene, "Head", Vec3::Y);

        let body = physics.create_body(&BodyDesc::kinematic(Vec3::ZERO));
        let node = scene.spawn(&crate::visuals::nail_visual());
        let err = registry
            .register("Head", Shape::sphere(0.1), 1.0, body, node)
            .unwrap_err();
        assert!(matches!(err, VoodooError::DuplicatePart(name) if name == "Head"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_sync_copies_physics_pose() {
        let mut registry = BodyRegistry::new();
        let mut physics = FakePhysics::default();
        let mut scene = FakeScene::default();
        let a = spawn_part(&mut registry, &mut physics, &mut scene, "A", Vec3::X);
        let b = spawn_part(&mut registry, &mut physics, &mut scene, "B", Vec3::Z);

        physics.drift = Vec3::new(0.0, -0.5, 0.0);
        physics.step(1.0 / 60.0, 1.0 / 60.0, 3);
        assert_eq!(registry.sync(&physics, &mut scene), 2);

        for id in [a, b] {
            let part = registry.get(id).unwrap();
            assert_eq!(
                scene.world_pose(part.node).unwrap(),
                physics.body_pose(part.body).unwrap()
            );
        }
    }

    #[test]
    fn test_require_reports_context() {
        let registry = BodyRegistry::new();
        let err = registry.require("Tail", "joint 'Wag'").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown part 'Tail' referenced by joint 'Wag'"
        );
    }
}
