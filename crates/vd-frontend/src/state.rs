//! Application state

use std::sync::Arc;

use parking_lot::Mutex;

use vd_core::{
    FrameStats, InputEvent, Pose, SceneBackend, Session, VoodooConfig, VoodooError, visuals,
};
use vd_physics::{PhysicsError, PhysicsWorld, WorldConfig};
use vd_renderer::{RendererConfig, Scene};

/// The session type the viewer drives
pub type ViewerSession = Session<PhysicsWorld, Scene>;

/// Errors raised while building the viewer state
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Physics setup failed: {0}")]
    Physics(#[from] PhysicsError),
    #[error("Session setup failed: {0}")]
    Session(#[from] VoodooError),
}

/// Actions that can be performed on the app state
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    /// Forward a gesture event to the session
    Input(InputEvent),
    /// Rotate the camera around its target
    OrbitCamera { delta_yaw: f32, delta_pitch: f32 },
}

/// Application state
pub struct AppState {
    pub session: ViewerSession,
    /// Stats of the most recent frame
    pub last_stats: FrameStats,
    pending_actions: Vec<AppAction>,
}

/// Shared application state
pub type SharedAppState = Arc<Mutex<AppState>>;

impl AppState {
    pub fn new(
        config: VoodooConfig,
        world: WorldConfig,
        renderer: &RendererConfig,
    ) -> Result<Self, AppError> {
        let physics = PhysicsWorld::with_config(world)?;
        let scene = Scene::new(renderer);
        let basket = Pose::from_position(config.basket.position);
        let mut session = Session::new(physics, scene, config)?;

        // Decoration only, the basket takes no part in picking or physics
        let scene = session.scene_mut();
        let container = scene.spawn(&visuals::basket_visual());
        scene.set_world_pose(container, basket);

        tracing::info!(
            "Session ready: {} parts, {} pins",
            session.registry().len(),
            session.pins().len()
        );

        Ok(Self {
            session,
            last_stats: FrameStats::default(),
            pending_actions: Vec::new(),
        })
    }

    /// Queue an action
    pub fn queue_action(&mut self, action: AppAction) {
        self.pending_actions.push(action);
    }

    /// Take pending actions
    pub fn take_pending_actions(&mut self) -> Vec<AppAction> {
        std::mem::take(&mut self.pending_actions)
    }
}

/// Create shared state
pub fn create_shared_state(state: AppState) -> SharedAppState {
    Arc::new(Mutex::new(state))
}

/// Apply one action
pub fn dispatch_action(action: AppAction, state: &mut AppState) {
    match action {
        AppAction::Input(event) => state.session.handle_input(event),
        AppAction::OrbitCamera {
            delta_yaw,
            delta_pitch,
        } => state
            .session
            .scene_mut()
            .camera_mut()
            .orbit(delta_yaw, delta_pitch),
    }
}
