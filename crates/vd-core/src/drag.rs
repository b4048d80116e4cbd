//! Grab-and-move of rigid parts through a transient point constraint

use glam::Vec3;

use crate::backend::{BodyDesc, BodyHandle, ConstraintDesc, ConstraintHandle, PhysicsBackend};
use crate::geometry::{Ray, TrackingPlane};
use crate::registry::{BodyRegistry, PartId};

/// State of an active drag
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub part: PartId,
    pub body: BodyHandle,
    /// Grab point in the part's local frame
    pub local_pivot: Vec3,
    pub constraint: ConstraintHandle,
    pub plane: TrackingPlane,
    /// Current anchor position
    pub target: Vec3,
}

/// Owns the kinematic drag anchor and at most one drag constraint
#[derive(Debug)]
pub struct DragController {
    anchor: BodyHandle,
    active: Option<DragSession>,
}

impl DragController {
    /// Create the persistent kinematic anchor body
    pub fn new<P: PhysicsBackend + ?Sized>(physics: &mut P) -> Self {
        let anchor = physics.create_body(&BodyDesc::kinematic(Vec3::ZERO));
        Self {
            anchor,
            active: None,
        }
    }

    pub fn anchor(&self) -> BodyHandle {
        self.anchor
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.active.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    pub fn dragged_part(&self) -> Option<PartId> {
        self.active.as_ref().map(|session| session.part)
    }

    /// Start dragging `part` from the world-space grab `point`.
    ///
    /// Any previous drag is ended first. Returns `false` when the part is
    /// unknown or the backend refuses the constraint.
    pub fn begin<P: PhysicsBackend + ?Sized>(
        &mut self,
        physics: &mut P,
        registry: &BodyRegistry,
        part: PartId,
        point: Vec3,
        camera_forward: Vec3,
    ) -> bool {
        self.end(physics);

        let Some(rigid) = registry.get(part) else {
            return false;
        };
        let Some(local_pivot) = physics.point_to_local(rigid.body, point) else {
            return false;
        };

        physics.set_body_position(self.anchor, point);
        let desc = ConstraintDesc::PointToPoint {
            body_a: rigid.body,
            pivot_a: local_pivot,
            body_b: self.anchor,
            pivot_b: Vec3::ZERO,
        };
        let Some(constraint) = physics.create_constraint(&desc) else {
            tracing::warn!("Physics refused drag constraint on '{}'", rigid.name);
            return false;
        };

        tracing::debug!("Drag started on '{}' at {:?}", rigid.name, point);
        self.active = Some(DragSession {
            part,
            body: rigid.body,
            local_pivot,
            constraint,
            plane: TrackingPlane::new(camera_forward, point),
            target: point,
        });
        true
    }

    /// Move the anchor to where `ray` meets the drag plane.
    ///
    /// On a miss the previous target is kept. Returns the current target.
    pub fn track<P>(&mut self, physics: &mut P, ray: &Ray) -> Option<Vec3>
    where
        P: PhysicsBackend + ?Sized,
    {
        let session = self.active.as_mut()?;
        if let Some(point) = session.plane.intersect(ray) {
            session.target = point;
            physics.set_body_position(self.anchor, point);
        }
        Some(session.target)
    }

    /// Push the drag plane along the camera direction. Returns the applied offset.
    pub fn adjust_depth(&mut self, amount: f32, camera_forward: Vec3, limit: f32) -> f32 {
        match self.active.as_mut() {
            Some(session) => session.plane.adjust(amount, camera_forward, limit),
            None => 0.0,
        }
    }

    /// Destroy the drag constraint. Returns the finished session, if any.
    pub fn end<P: PhysicsBackend + ?Sized>(&mut self, physics: &mut P) -> Option<DragSession> {
        let session = self.active.take()?;
        physics.remove_constraint(session.constraint);
        tracing::debug!("Drag ended");
        Some(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::{self, Skeleton, SkeletonSpec};
    use crate::testing::{FakePhysics, FakeScene, ndc_for};
    use crate::backend::SceneBackend;
    use approx::assert_relative_eq;

    fn setup() -> (FakePhysics, FakeScene, BodyRegistry, Skeleton, DragController) {
        let mut physics = FakePhysics::default();
        let mut scene = FakeScene::default();
        let mut registry = BodyRegistry::new();
        let skeleton =
            skeleton::build(&SkeletonSpec::humanoid(), &mut physics, &mut scene, &mut registry)
                .unwrap();
        let drag = DragController::new(&mut physics);
        (physics, scene, registry, skeleton, drag)
    }

    #[test]
    fn test_begin_creates_constraint_at_local_pivot() {
        let (mut physics, _scene, registry, skeleton, mut drag) = setup();
        let joints = physics.constraint_count();
        let point = Vec3::new(0.1, 2.7, 0.175);

        assert!(drag.begin(&mut physics, &registry, skeleton.torso, point, Vec3::NEG_Z));
        assert_eq!(physics.constraint_count(), joints + 1);

        let session = drag.session().unwrap();
        assert_relative_eq!(session.local_pivot.x, 0.1, epsilon = 1e-5);
        assert_relative_eq!(session.local_pivot.y, 0.1, epsilon = 1e-5);
        assert_eq!(physics.body_pose(drag.anchor()).unwrap().position, point);
    }

    #[test]
    fn test_new_drag_replaces_previous_constraint() {
        let (mut physics, _scene, registry, skeleton, mut drag) = setup();
        let joints = physics.constraint_count();

        let grab = Vec3::new(0.0, 2.6, 0.175);
        drag.begin(&mut physics, &registry, skeleton.torso, grab, Vec3::NEG_Z);
        let first = drag.session().unwrap().constraint;
        drag.begin(&mut physics, &registry, skeleton.head, Vec3::new(0.0, 3.3, 0.26), Vec3::NEG_Z);

        assert!(!physics.contains_constraint(first));
        assert_eq!(physics.constraint_count(), joints + 1);
        assert_eq!(drag.dragged_part(), Some(skeleton.head));
    }

    #[test]
    fn test_track_follows_ray_on_plane() {
        let (mut physics, scene, registry, skeleton, mut drag) = setup();
        let start = Vec3::new(0.0, 2.6, 0.175);
        drag.begin(&mut physics, &registry, skeleton.torso, start, Vec3::NEG_Z);

        let ray = scene.pointer_ray(ndc_for(0.1, 2.6));
        let target = drag.track(&mut physics, &ray).unwrap();
        assert_relative_eq!(target.x, 0.1, epsilon = 1e-5);
        assert_relative_eq!(target.z, 0.175, epsilon = 1e-5);
        assert_eq!(physics.body_pose(drag.anchor()).unwrap().position, target);
    }

    #[test]
    fn test_track_keeps_target_when_ray_misses_plane() {
        let (mut physics, _scene, registry, skeleton, mut drag) = setup();
        let start = Vec3::new(0.0, 2.6, 0.175);
        drag.begin(&mut physics, &registry, skeleton.torso, start, Vec3::NEG_Z);

        let parallel = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::X);
        assert_eq!(drag.track(&mut physics, &parallel), Some(start));
        assert_eq!(physics.body_pose(drag.anchor()).unwrap().position, start);
    }

    #[test]
    fn test_depth_adjust_moves_target_away() {
        let (mut physics, scene, registry, skeleton, mut drag) = setup();
        let grab = Vec3::new(0.0, 2.6, 0.175);
        drag.begin(&mut physics, &registry, skeleton.torso, grab, Vec3::NEG_Z);
        drag.adjust_depth(0.5, Vec3::NEG_Z, 4.0);

        let target = drag
            .track(&mut physics, &scene.pointer_ray(ndc_for(0.0, 2.6)))
            .unwrap();
        assert_relative_eq!(target.z, -0.325, epsilon = 1e-5);
    }

    #[test]
    fn test_end_removes_constraint() {
        let (mut physics, _scene, registry, skeleton, mut drag) = setup();
        let joints = physics.constraint_count();
        let grab = Vec3::new(0.0, 2.6, 0.175);
        drag.begin(&mut physics, &registry, skeleton.torso, grab, Vec3::NEG_Z);

        let session = drag.end(&mut physics).unwrap();
        assert!(!physics.contains_constraint(session.constraint));
        assert_eq!(physics.constraint_count(), joints);
        assert!(drag.end(&mut physics).is_none());
        assert!(physics.contains_body(drag.anchor()));
    }
}
