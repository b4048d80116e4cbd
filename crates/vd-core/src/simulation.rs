//! Fixed-step advance followed by pose synchronization

use crate::backend::{PhysicsBackend, SceneBackend};
use crate::config::SimulationConfig;
use crate::registry::BodyRegistry;

/// Per-frame summary
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameStats {
    /// Delta actually handed to the physics step
    pub delta: f32,
    pub parts_synced: usize,
    pub pins: usize,
    pub nails: usize,
}

/// Clamp a frame delta to `[0, max_delta]`. Non-finite deltas become zero.
pub fn clamp_delta(delta: f32, max_delta: f32) -> f32 {
    if !delta.is_finite() || delta <= 0.0 {
        return 0.0;
    }
    delta.min(max_delta.max(0.0))
}

/// Step physics once for this frame and copy part poses onto their visuals.
///
/// Returns the clamped delta and the number of parts synced.
pub fn advance<P, S>(
    config: &SimulationConfig,
    physics: &mut P,
    scene: &mut S,
    registry: &BodyRegistry,
    delta: f32,
) -> (f32, usize)
where
    P: PhysicsBackend + ?Sized,
    S: SceneBackend + ?Sized,
{
    let delta = clamp_delta(delta, config.max_delta);
    physics.step(config.fixed_step, delta, config.max_substeps);
    let synced = registry.sync(physics, scene);
    (delta, synced)
}
