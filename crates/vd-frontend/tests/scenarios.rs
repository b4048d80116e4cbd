//! End-to-end gestures against the real physics world and scene

use approx::assert_relative_eq;
use glam::{Vec2, Vec3};
use vd_core::{
    AttachmentTarget, DepthKey, GestureMode, InputEvent, PhysicsBackend, SceneBackend, Session,
    VoodooConfig,
};
use vd_physics::{PhysicsWorld, WorldConfig};
use vd_renderer::{RendererConfig, Scene};

const WIDTH: f32 = 800.0;
const HEIGHT: f32 = 600.0;
const JOINTS: usize = 9;

type ViewerSession = Session<PhysicsWorld, Scene>;

fn session() -> ViewerSession {
    let physics = PhysicsWorld::with_config(WorldConfig::default()).unwrap();
    let scene = Scene::new(&RendererConfig::default());
    let mut session = Session::with_seed(physics, scene, VoodooConfig::default(), 7).unwrap();
    session.handle_input(InputEvent::Resize {
        width: WIDTH,
        height: HEIGHT,
    });
    session.frame(0.0);
    session
}

/// Pixel position of a world point
fn pixel(session: &ViewerSession, world: Vec3) -> Vec2 {
    let ndc = session.scene().camera().project(world).unwrap();
    Vec2::new((ndc.x + 1.0) * 0.5 * WIDTH, (1.0 - ndc.y) * 0.5 * HEIGHT)
}

fn part_position(session: &ViewerSession, name: &str) -> Vec3 {
    let part = session.registry().by_name(name).unwrap();
    session.physics().body_pose(part.body).unwrap().position
}

fn torso_pixel(session: &ViewerSession) -> Vec2 {
    pixel(session, part_position(session, "Torso"))
}

#[test]
fn test_drag_torso_then_release_removes_constraint() {
    let mut session = session();
    assert_eq!(session.physics().constraint_count(), JOINTS);

    let start = torso_pixel(&session);
    session.handle_input(InputEvent::PointerDown {
        position: start,
        time: 0.0,
    });
    assert_eq!(session.mode(), GestureMode::DraggingBody);
    assert_eq!(session.physics().constraint_count(), JOINTS + 1);

    session.handle_input(InputEvent::PointerMove {
        position: start + Vec2::new(40.0, 0.0),
    });
    for _ in 0..30 {
        session.frame(1.0 / 60.0);
    }
    assert!(part_position(&session, "Torso").x > 0.0);

    session.handle_input(InputEvent::PointerUp {
        position: start + Vec2::new(40.0, 0.0),
        time: 0.6,
    });
    assert_eq!(session.mode(), GestureMode::Idle);
    assert_eq!(session.physics().constraint_count(), JOINTS);
    assert!(!session.drag().is_dragging());
}

#[test]
fn test_depth_adjustments_accumulate_while_dragging() {
    let mut session = session();
    let start = torso_pixel(&session);
    session.handle_input(InputEvent::PointerDown {
        position: start,
        time: 0.0,
    });

    session.handle_input(InputEvent::Wheel { delta_y: 100.0 });
    session.handle_input(InputEvent::Key(DepthKey::Push));
    let expected = 100.0 * session.config().interaction.wheel_depth_scale
        + session.config().interaction.key_depth_step;
    assert_relative_eq!(session.state().depth_offset(), expected, epsilon = 1e-5);
}

#[test]
fn test_basket_pin_released_over_head_attaches_to_head() {
    let mut session = session();
    let basket_pin = session
        .pins()
        .pins()
        .iter()
        .find(|pin| matches!(pin.target, AttachmentTarget::Basket { .. }))
        .unwrap()
        .node;
    let pin_head = session.scene().world_pose(basket_pin).unwrap().position + Vec3::Z * 0.15;

    session.handle_input(InputEvent::PointerDown {
        position: pixel(&session, pin_head),
        time: 0.0,
    });
    assert_eq!(session.mode(), GestureMode::HoldingPin);
    let held = session.pins().held().unwrap();

    let head = session.registry().by_name("Head").unwrap().clone();
    let target = pixel(&session, part_position(&session, "Head"));
    session.handle_input(InputEvent::PointerMove { position: target });
    session.handle_input(InputEvent::PointerUp {
        position: target,
        time: 0.5,
    });

    assert!(!session.pins().is_holding());
    assert_eq!(session.pins().attached_to(head.id), 1);

    let ndc = session.viewport().to_ndc(target);
    let ray = session.scene().pointer_ray(ndc);
    let hit = session.scene().intersect(&ray, &[head.node])[0].point;

    session.frame(0.0);
    let pin = session.pins().get(held).unwrap();
    let position = session.scene().world_pose(pin.node).unwrap().position;
    let bias = session.config().interaction.pin_surface_bias;
    let forward = session.scene().camera_forward();
    assert!((position - forward * bias).distance(hit) < 1e-3);
}

#[test]
fn test_double_click_on_empty_space_adds_no_nail() {
    let mut session = session();
    session.handle_input(InputEvent::DoubleClick {
        position: Vec2::new(20.0, 20.0),
    });
    assert!(session.nails().is_empty());
    assert_eq!(session.physics().constraint_count(), JOINTS);
}

#[test]
fn test_nail_toggle_on_and_off() {
    let mut session = session();
    let bodies = session.physics().body_count();
    let position = torso_pixel(&session);

    session.handle_input(InputEvent::DoubleClick { position });
    assert_eq!(session.nails().len(), 1);
    assert_eq!(session.physics().constraint_count(), JOINTS + 1);
    assert_eq!(session.physics().body_count(), bodies + 1);

    session.frame(0.0);
    session.handle_input(InputEvent::DoubleClick { position });
    assert!(session.nails().is_empty());
    assert_eq!(session.physics().constraint_count(), JOINTS);
    assert_eq!(session.physics().body_count(), bodies);
}

#[test]
fn test_nail_holds_part_in_place() {
    let mut session = session();
    let position = torso_pixel(&session);
    session.handle_input(InputEvent::DoubleClick { position });
    let anchor = session.nails().nails()[0].anchor;
    let anchor_position = session.physics().body_pose(anchor).unwrap().position;

    for _ in 0..120 {
        session.frame(1.0 / 60.0);
    }

    let torso = session.registry().by_name("Torso").unwrap();
    let nail = &session.nails().nails()[0];
    assert_eq!(nail.part, torso.id);
    let torso_pose = session.physics().body_pose(torso.body).unwrap();
    let anchor_now = session.physics().body_pose(anchor).unwrap().position;
    assert_eq!(anchor_now, anchor_position);
    assert!(torso_pose.position.y > 1.5);
}

#[test]
fn test_tap_pokes_head_upwards() {
    let mut session = session();
    let head = session.registry().by_name("Head").unwrap().body;
    let position = pixel(&session, part_position(&session, "Head"));

    session.handle_input(InputEvent::PointerDown {
        position,
        time: 1.0,
    });
    session.handle_input(InputEvent::PointerUp {
        position,
        time: 1.1,
    });

    assert!(session.physics().linear_velocity(head).unwrap().y > 0.0);
    assert_eq!(session.physics().constraint_count(), JOINTS);
}

#[test]
fn test_doll_settles_inside_room_with_joints_intact() {
    let mut session = session();
    for _ in 0..300 {
        session.frame(1.0 / 60.0);
    }

    for part in session.registry().iter() {
        let pose = session.physics().body_pose(part.body).unwrap();
        assert!(pose.position.is_finite(), "{} diverged", part.name);
        assert!(pose.position.y > -0.05, "{} fell through the floor", part.name);
        assert!(pose.position.y < 4.5);
        assert!(pose.position.x.abs() < 3.0);
        assert_eq!(session.scene().world_pose(part.node).unwrap(), pose);
    }

    for joint in &session.skeleton().joints {
        let data = session.physics().joint(joint.constraint).unwrap();
        let pa = session.physics().body_pose(data.body_a).unwrap();
        let pb = session.physics().body_pose(data.body_b).unwrap();
        let gap = pa
            .transform_point(data.pivot_a)
            .distance(pb.transform_point(data.pivot_b));
        assert!(gap < 0.05, "joint {} separated by {gap}", joint.name);
    }
}
