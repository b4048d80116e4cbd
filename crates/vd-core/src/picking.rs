//! Pointer ray queries against scene geometry

use glam::{Vec2, Vec3};

use crate::backend::{NodeId, SceneBackend};
use crate::geometry::Ray;
use crate::registry::{BodyRegistry, PartId};

/// Resolved pick: the logical owner of the struck geometry and the hit point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pick<T> {
    pub owner: T,
    pub point: Vec3,
}

/// Cast a pointer ray through `ndc` and resolve its nearest hit.
///
/// See [`pick_with_ray`].
pub fn pick<S, T>(
    scene: &S,
    ndc: Vec2,
    candidates: &[NodeId],
    resolve: impl Fn(NodeId) -> Option<T>,
) -> Option<Pick<T>>
where
    S: SceneBackend + ?Sized,
{
    let ray = scene.pointer_ray(ndc);
    pick_with_ray(scene, &ray, candidates, resolve)
}

/// Resolve the nearest hit of `ray` among `candidates`.
///
/// Starting at the struck leaf, parent links are followed until `resolve`
/// recognizes a node as an owner. Farther hits are never considered: if the
/// nearest hit has no owner the query is a miss.
pub fn pick_with_ray<S, T>(
    scene: &S,
    ray: &Ray,
    candidates: &[NodeId],
    resolve: impl Fn(NodeId) -> Option<T>,
) -> Option<Pick<T>>
where
    S: SceneBackend + ?Sized,
{
    if candidates.is_empty() {
        return None;
    }

    let hit = scene.intersect(ray, candidates).into_iter().next()?;
    let mut node = Some(hit.node);
    while let Some(current) = node {
        if let Some(owner) = resolve(current) {
            return Some(Pick {
                owner,
                point: hit.point,
            });
        }
        node = scene.parent(current);
    }
    None
}

/// Pick a rigid part of the figure
pub fn pick_part<S>(scene: &S, registry: &BodyRegistry, ndc: Vec2) -> Option<Pick<PartId>>
where
    S: SceneBackend + ?Sized,
{
    let nodes = registry.nodes();
    pick(scene, ndc, &nodes, |node| registry.by_node(node).map(|part| part.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Shape;
    use crate::skeleton::{self, SkeletonSpec};
    use crate::testing::{FakePhysics, FakeScene, ndc_for};
    use crate::visuals;
    use approx::assert_relative_eq;

    fn stock() -> (FakeScene, BodyRegistry, skeleton::Skeleton) {
        let mut physics = FakePhysics::default();
        let mut scene = FakeScene::default();
        let mut registry = BodyRegistry::new();
        let skeleton =
            skeleton::build(&SkeletonSpec::humanoid(), &mut physics, &mut scene, &mut registry)
                .unwrap();
        (scene, registry, skeleton)
    }

    #[test]
    fn test_pick_torso_front_face() {
        let (scene, registry, skeleton) = stock();
        let hit = pick_part(&scene, &registry, ndc_for(0.1, 2.5)).unwrap();
        assert_eq!(hit.owner, skeleton.torso);
        // Front face of the 0.35 deep torso
        assert_relative_eq!(hit.point.z, 0.175, epsilon = 1e-4);
        assert_relative_eq!(hit.point.x, 0.1, epsilon = 1e-4);
    }

    #[test]
    fn test_pick_head_sphere() {
        let (scene, registry, skeleton) = stock();
        let hit = pick_part(&scene, &registry, ndc_for(0.0, 3.3)).unwrap();
        assert_eq!(hit.owner, skeleton.head);
        assert_relative_eq!(hit.point.z, 0.26, epsilon = 1e-4);
    }

    #[test]
    fn test_pick_empty_space_misses() {
        let (scene, registry, _skeleton) = stock();
        assert!(pick_part(&scene, &registry, ndc_for(1.5, 0.5)).is_none());
    }

    #[test]
    fn test_compound_visual_resolves_to_root() {
        let mut scene = FakeScene::default();
        let pin = scene.spawn(&visuals::pin_visual());
        scene.set_world_pose(pin, crate::geometry::Pose::from_position(Vec3::new(0.5, 1.0, 0.0)));

        // Ray straight down the shaft axis strikes the head sphere child first
        let hit = pick(&scene, ndc_for(0.5, 1.0), &[pin], |node| (node == pin).then_some(7u32))
            .unwrap();
        assert_eq!(hit.owner, 7);
        assert_relative_eq!(hit.point.z, 0.21, epsilon = 1e-4);
    }

    #[test]
    fn test_nearest_hit_without_owner_is_a_miss() {
        let mut scene = FakeScene::default();
        let near = scene.spawn(&visuals::part_visual("near", Shape::sphere(0.3), [1.0; 4]));
        let far = scene.spawn(&visuals::part_visual("far", Shape::sphere(0.3), [1.0; 4]));
        scene.set_world_pose(near, crate::geometry::Pose::from_position(Vec3::new(0.0, 1.0, 1.0)));
        scene.set_world_pose(far, crate::geometry::Pose::from_position(Vec3::new(0.0, 1.0, -1.0)));

        let result = pick(&scene, ndc_for(0.0, 1.0), &[near, far], |node| {
            (node == far).then_some(())
        });
        assert!(result.is_none());
    }

    #[test]
    fn test_empty_candidate_set_misses() {
        let scene = FakeScene::default();
        assert!(pick(&scene, Vec2::ZERO, &[], |_| Some(())).is_none());
    }
}
