//! Nails: static anchors fastening a part to a point in space

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::{
    BodyDesc, BodyHandle, ConstraintDesc, ConstraintHandle, NodeId, PhysicsBackend, SceneBackend,
    Shape,
};
use crate::geometry::Pose;
use crate::picking::{self, pick};
use crate::registry::{BodyRegistry, PartId};
use crate::visuals;

/// Radius of the static anchor sphere
pub const NAIL_ANCHOR_RADIUS: f32 = 0.04;

/// Nail identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NailId(pub Uuid);

impl NailId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NailId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Nail {
    pub id: NailId,
    /// Visual marker, also the pick target for removal
    pub marker: NodeId,
    pub anchor: BodyHandle,
    pub constraint: ConstraintHandle,
    pub part: PartId,
}

/// Outcome of a nail toggle gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NailToggle {
    Created(NailId),
    Removed(NailId),
    /// Nothing under the pointer and nothing being dragged
    Ignored,
}

#[derive(Debug, Default)]
pub struct NailSubsystem {
    nails: Vec<Nail>,
}

impl NailSubsystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nails(&self) -> &[Nail] {
        &self.nails
    }

    pub fn len(&self) -> usize {
        self.nails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nails.is_empty()
    }

    pub fn by_marker(&self, marker: NodeId) -> Option<&Nail> {
        self.nails.iter().find(|nail| nail.marker == marker)
    }

    /// Remove a nail under the pointer, or nail down a part.
    ///
    /// `dragged` is the part being dragged with the live anchor position; it
    /// takes precedence over whatever part lies under the pointer.
    pub fn toggle<P, S>(
        &mut self,
        physics: &mut P,
        scene: &mut S,
        registry: &BodyRegistry,
        ndc: Vec2,
        dragged: Option<(PartId, Vec3)>,
    ) -> NailToggle
    where
        P: PhysicsBackend + ?Sized,
        S: SceneBackend + ?Sized,
    {
        let markers: Vec<NodeId> = self.nails.iter().map(|nail| nail.marker).collect();
        let hit = pick(&*scene, ndc, &markers, |node| {
            self.by_marker(node).map(|nail| nail.marker)
        });
        if let Some(hit) = hit {
            return match self.remove(physics, scene, hit.owner) {
                Some(id) => NailToggle::Removed(id),
                None => NailToggle::Ignored,
            };
        }

        let target = dragged.or_else(|| {
            picking::pick_part(&*scene, registry, ndc).map(|hit| (hit.owner, hit.point))
        });
        match target.and_then(|(part, point)| self.create(physics, scene, registry, part, point)) {
            Some(id) => NailToggle::Created(id),
            None => NailToggle::Ignored,
        }
    }

    /// Fasten `part` at world `point` to a new static anchor
    pub fn create<P, S>(
        &mut self,
        physics: &mut P,
        scene: &mut S,
        registry: &BodyRegistry,
        part: PartId,
        point: Vec3,
    ) -> Option<NailId>
    where
        P: PhysicsBackend + ?Sized,
        S: SceneBackend + ?Sized,
    {
        let rigid = registry.get(part)?;
        let local = physics.point_to_local(rigid.body, point)?;

        let anchor_desc = BodyDesc::fixed(Shape::sphere(NAIL_ANCHOR_RADIUS), point);
        let anchor = physics.create_body(&anchor_desc);
        let desc = ConstraintDesc::PointToPoint {
            body_a: rigid.body,
            pivot_a: local,
            body_b: anchor,
            pivot_b: Vec3::ZERO,
        };
        let Some(constraint) = physics.create_constraint(&desc) else {
            physics.remove_body(anchor);
            tracing::warn!("Physics refused nail constraint on '{}'", rigid.name);
            return None;
        };

        let marker = scene.spawn(&visuals::nail_visual());
        scene.set_world_pose(marker, Pose::from_position(point));

        let id = NailId::new();
        self.nails.push(Nail {
            id,
            marker,
            anchor,
            constraint,
            part,
        });
        tracing::debug!("Nailed '{}' at {:?}", rigid.name, point);
        Some(id)
    }

    /// Destroy the nail owning `marker`. Unknown markers are ignored.
    pub fn remove<P, S>(&mut self, physics: &mut P, scene: &mut S, marker: NodeId) -> Option<NailId>
    where
        P: PhysicsBackend + ?Sized,
        S: SceneBackend + ?Sized,
    {
        let index = self.nails.iter().position(|nail| nail.marker == marker)?;
        let nail = self.nails.remove(index);
        physics.remove_constraint(nail.constraint);
        physics.remove_body(nail.anchor);
        scene.despawn(nail.marker);
        tracing::debug!("Removed nail {:?}", nail.id.0);
        Some(nail.id)
    }

    /// Place each marker at its anchor body. Returns the number placed.
    pub fn update_transforms<P, S>(&self, physics: &P, scene: &mut S) -> usize
    where
        P: PhysicsBackend + ?Sized,
        S: SceneBackend + ?Sized,
    {
        let mut placed = 0;
        for nail in &self.nails {
            if let Some(pose) = physics.body_pose(nail.anchor) {
                scene.set_world_pose(nail.marker, pose);
                placed += 1;
            }
        }
        placed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::{self, Skeleton, SkeletonSpec};
    use crate::testing::{FakePhysics, FakeScene, ndc_for};
    use approx::assert_relative_eq;

    fn setup() -> (FakePhysics, FakeScene, BodyRegistry, Skeleton) {
        let mut physics = FakePhysics::default();
        let mut scene = FakeScene::default();
        let mut registry = BodyRegistry::new();
        let skeleton =
            skeleton::build(&SkeletonSpec::humanoid(), &mut physics, &mut scene, &mut registry)
                .unwrap();
        (physics, scene, registry, skeleton)
    }

    #[test]
    fn test_toggle_on_part_creates_nail() {
        let (mut physics, mut scene, registry, skeleton) = setup();
        let mut nails = NailSubsystem::new();
        let bodies = physics.body_count();
        let constraints = physics.constraint_count();

        let result = nails.toggle(&mut physics, &mut scene, &registry, ndc_for(0.1, 2.5), None);
        let NailToggle::Created(id) = result else {
            panic!("expected a nail, got {result:?}");
        };

        let nail = &nails.nails()[0];
        assert_eq!(nail.id, id);
        assert_eq!(nail.part, skeleton.torso);
        assert_eq!(physics.body_count(), bodies + 1);
        assert_eq!(physics.constraint_count(), constraints + 1);

        let anchor = physics.body(nail.anchor).unwrap();
        assert_eq!(anchor.desc.kind, crate::backend::BodyKind::Static);
        assert_relative_eq!(anchor.pose.position.z, 0.175, epsilon = 1e-4);
        let marker = scene.world_pose(nail.marker).unwrap();
        assert_eq!(marker.position, anchor.pose.position);
    }

    #[test]
    fn test_toggle_on_empty_space_is_noop() {
        let (mut physics, mut scene, registry, _skeleton) = setup();
        let mut nails = NailSubsystem::new();
        let bodies = physics.body_count();

        let result = nails.toggle(&mut physics, &mut scene, &registry, ndc_for(3.0, 5.5), None);
        assert_eq!(result, NailToggle::Ignored);
        assert!(nails.is_empty());
        assert_eq!(physics.body_count(), bodies);
    }

    #[test]
    fn test_toggle_on_marker_removes_nail() {
        let (mut physics, mut scene, registry, _skeleton) = setup();
        let mut nails = NailSubsystem::new();
        let bodies = physics.body_count();
        let constraints = physics.constraint_count();

        nails.toggle(&mut physics, &mut scene, &registry, ndc_for(0.1, 2.5), None);
        let nail = nails.nails()[0].clone();

        let result = nails.toggle(&mut physics, &mut scene, &registry, ndc_for(0.1, 2.5), None);
        assert_eq!(result, NailToggle::Removed(nail.id));
        assert!(nails.is_empty());
        assert!(!physics.contains_body(nail.anchor));
        assert!(!physics.contains_constraint(nail.constraint));
        assert!(!scene.contains(nail.marker));
        assert_eq!(physics.body_count(), bodies);
        assert_eq!(physics.constraint_count(), constraints);
    }

    #[test]
    fn test_removing_stale_marker_is_noop() {
        let (mut physics, mut scene, registry, _skeleton) = setup();
        let mut nails = NailSubsystem::new();
        nails.toggle(&mut physics, &mut scene, &registry, ndc_for(0.1, 2.5), None);
        let marker = nails.nails()[0].marker;

        assert!(nails.remove(&mut physics, &mut scene, marker).is_some());
        assert!(nails.remove(&mut physics, &mut scene, marker).is_none());
    }

    #[test]
    fn test_dragged_part_takes_precedence() {
        let (mut physics, mut scene, registry, skeleton) = setup();
        let mut nails = NailSubsystem::new();
        let anchor = Vec3::new(0.0, 3.5, 0.5);

        // Pointer is over the torso, but the head is being dragged
        let result = nails.toggle(
            &mut physics,
            &mut scene,
            &registry,
            ndc_for(0.1, 2.5),
            Some((skeleton.head, anchor)),
        );
        assert!(matches!(result, NailToggle::Created(_)));

        let nail = &nails.nails()[0];
        assert_eq!(nail.part, skeleton.head);
        assert_eq!(physics.body_pose(nail.anchor).unwrap().position, anchor);
        let ConstraintDesc::PointToPoint { pivot_a, .. } = physics.constraints[&nail.constraint]
        else {
            panic!("nail should use a point constraint");
        };
        assert_relative_eq!(pivot_a.y, 0.2, epsilon = 1e-5);
        assert_relative_eq!(pivot_a.z, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_markers_follow_anchor() {
        let (mut physics, mut scene, registry, _skeleton) = setup();
        let mut nails = NailSubsystem::new();
        nails.toggle(&mut physics, &mut scene, &registry, ndc_for(0.1, 2.5), None);
        let nail = nails.nails()[0].clone();

        physics.teleport(nail.anchor, Pose::from_position(Vec3::new(1.0, 1.0, 1.0)));
        assert_eq!(nails.update_transforms(&physics, &mut scene), 1);
        assert_eq!(
            scene.world_pose(nail.marker).unwrap().position,
            Vec3::new(1.0, 1.0, 1.0)
        );
    }
}
