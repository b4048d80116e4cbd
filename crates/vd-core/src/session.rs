//! Session: owns the collaborators and routes gestures to the subsystems

use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::backend::{PhysicsBackend, SceneBackend};
use crate::config::VoodooConfig;
use crate::drag::DragController;
use crate::error::Result;
use crate::input::{InputEvent, Viewport, touch_centroid};
use crate::interaction::{DepthTarget, GestureMode, InteractionState, PointerKind};
use crate::nails::{NailSubsystem, NailToggle};
use crate::picking;
use crate::pins::PinSubsystem;
use crate::registry::BodyRegistry;
use crate::simulation::{self, FrameStats};
use crate::skeleton::{self, Skeleton};

const HINT_IDLE: &str = "Drag to grab, tap to poke. Double-click to nail or unnail.";
const HINT_PIN_MOUSE: &str = "Move pin onto doll and release to place. Scroll to push/pull.";
const HINT_PIN_TOUCH: &str = "Move pin onto doll and release to place. Two-finger drag for depth.";

/// One interactive doll with its physics world and scene
pub struct Session<P, S> {
    physics: P,
    scene: S,
    config: VoodooConfig,
    registry: BodyRegistry,
    skeleton: Skeleton,
    drag: DragController,
    pins: PinSubsystem,
    nails: NailSubsystem,
    state: InteractionState,
    viewport: Viewport,
    pointer_ndc: Vec2,
}

impl<P: PhysicsBackend, S: SceneBackend> Session<P, S> {
    /// Build the figure and its pins. Basket placement uses an entropy-seeded RNG.
    pub fn new(physics: P, scene: S, config: VoodooConfig) -> Result<Self> {
        Self::with_rng(physics, scene, config, StdRng::from_entropy())
    }

    /// Like [`Session::new`] with reproducible basket placement
    pub fn with_seed(physics: P, scene: S, config: VoodooConfig, seed: u64) -> Result<Self> {
        Self::with_rng(physics, scene, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(mut physics: P, mut scene: S, config: VoodooConfig, rng: StdRng) -> Result<Self> {
        config.validate()?;
        let mut registry = BodyRegistry::new();
        let skeleton = skeleton::build(&config.skeleton, &mut physics, &mut scene, &mut registry)?;
        let drag = DragController::new(&mut physics);

        let mut pins = PinSubsystem::new(
            config.basket.clone(),
            config.interaction.pin_surface_bias,
            rng,
        );
        pins.populate(&mut scene, &registry, &config.pins)?;

        Ok(Self {
            physics,
            scene,
            config,
            registry,
            skeleton,
            drag,
            pins,
            nails: NailSubsystem::new(),
            state: InteractionState::new(),
            viewport: Viewport::default(),
            pointer_ndc: Vec2::ZERO,
        })
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// Camera control lives in the scene; the viewer orbits through this
    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn config(&self) -> &VoodooConfig {
        &self.config
    }

    pub fn registry(&self) -> &BodyRegistry {
        &self.registry
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn pins(&self) -> &PinSubsystem {
        &self.pins
    }

    pub fn nails(&self) -> &NailSubsystem {
        &self.nails
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn mode(&self) -> GestureMode {
        self.state.mode()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Status line for the viewer
    pub fn hint(&self) -> &'static str {
        if !self.pins.is_holding() {
            return HINT_IDLE;
        }
        match self.state.pointer() {
            PointerKind::Mouse => HINT_PIN_MOUSE,
            PointerKind::Touch => HINT_PIN_TOUCH,
        }
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown { position, time } => {
                self.pointer_down(position, time, PointerKind::Mouse)
            }
            InputEvent::PointerMove { position } => self.pointer_move(position),
            InputEvent::PointerUp { position, time } => self.pointer_up(position, time),
            InputEvent::PointerCancel => self.cancel(),
            InputEvent::DoubleClick { position } => self.toggle_nail(position),
            InputEvent::Wheel { delta_y } => {
                self.adjust_depth(delta_y * self.config.interaction.wheel_depth_scale)
            }
            InputEvent::Key(key) => {
                self.adjust_depth(key.sign() * self.config.interaction.key_depth_step)
            }
            InputEvent::TouchStart { touches, time } => self.touch_start(&touches, time),
            InputEvent::TouchMove { touches } => self.touch_move(&touches),
            InputEvent::TouchEnd {
                released,
                remaining,
                time,
            } => self.touch_end(released, &remaining, time),
            InputEvent::Resize { width, height } => {
                self.viewport = Viewport::new(width, height);
                self.scene.resize(width, height);
            }
        }
    }

    /// Advance one frame: re-track the active gesture, step, then place visuals
    pub fn frame(&mut self, delta: f32) -> FrameStats {
        self.retrack();

        let (delta, parts_synced) = simulation::advance(
            &self.config.simulation,
            &mut self.physics,
            &mut self.scene,
            &self.registry,
            delta,
        );
        self.pins.update_transforms(&mut self.scene, &self.registry);
        self.nails.update_transforms(&self.physics, &mut self.scene);

        FrameStats {
            delta,
            parts_synced,
            pins: self.pins.len(),
            nails: self.nails.len(),
        }
    }

    fn set_pointer(&mut self, position: Vec2) {
        self.pointer_ndc = self.viewport.to_ndc(position);
    }

    fn pointer_down(&mut self, position: Vec2, time: f64, pointer: PointerKind) {
        if !self.state.is_idle() {
            self.finish_gesture(None);
        }
        self.set_pointer(position);
        self.state.press(pointer, position, time);

        if self.pins.grab(&mut self.scene, self.pointer_ndc).is_some() {
            self.state.set_mode(GestureMode::HoldingPin);
            return;
        }

        if let Some(hit) = picking::pick_part(&self.scene, &self.registry, self.pointer_ndc) {
            let forward = self.scene.camera_forward();
            if self
                .drag
                .begin(&mut self.physics, &self.registry, hit.owner, hit.point, forward)
            {
                self.state.set_mode(GestureMode::DraggingBody);
            }
        }
    }

    fn pointer_move(&mut self, position: Vec2) {
        self.set_pointer(position);
        let dy = self.state.move_to(position);

        if self.state.mode() == GestureMode::DraggingBody
            && self.state.pointer() == PointerKind::Mouse
            && dy != 0.0
        {
            let amount = -dy * self.config.interaction.drag_vertical_depth_scale;
            self.push_plane(DepthTarget::Body, amount);
        }
        self.retrack();
    }

    fn pointer_up(&mut self, position: Vec2, time: f64) {
        self.set_pointer(position);
        self.finish_gesture(Some((position, time)));
    }

    /// Abandon the gesture without a poke; a held pin still lands somewhere
    fn cancel(&mut self) {
        self.finish_gesture(None);
    }

    /// Release whatever the gesture holds.
    ///
    /// `release` carries the pointer position and time for tap detection.
    fn finish_gesture(&mut self, release: Option<(Vec2, f64)>) {
        let released_pin = self
            .pins
            .release(&mut self.scene, &self.registry, self.pointer_ndc)
            .is_some();
        if let Some((position, time)) = release.filter(|_| !released_pin) {
            if self.state.is_tap(&self.config.interaction, position, time) {
                self.poke();
            }
        }

        self.drag.end(&mut self.physics);
        self.state.reset();
    }

    fn poke(&mut self) {
        let Some(hit) = picking::pick_part(&self.scene, &self.registry, self.pointer_ndc) else {
            return;
        };
        let Some(part) = self.registry.get(hit.owner) else {
            return;
        };
        self.physics
            .apply_impulse(part.body, self.config.interaction.poke_impulse, hit.point);
        tracing::debug!("Poked '{}'", part.name);
    }

    fn toggle_nail(&mut self, position: Vec2) {
        self.set_pointer(position);
        let dragged = self
            .drag
            .session()
            .map(|session| (session.part, session.target));
        let result = self.nails.toggle(
            &mut self.physics,
            &mut self.scene,
            &self.registry,
            self.pointer_ndc,
            dragged,
        );
        match result {
            NailToggle::Created(_) => tracing::debug!("Nail created ({} total)", self.nails.len()),
            NailToggle::Removed(_) => tracing::debug!("Nail removed ({} total)", self.nails.len()),
            NailToggle::Ignored => {}
        }
    }

    /// Wheel, key and two-finger depth control. No-op while idle.
    fn adjust_depth(&mut self, amount: f32) {
        let Some(target) = self.state.mode().depth_target() else {
            return;
        };
        self.push_plane(target, amount);
        self.retrack();
    }

    fn push_plane(&mut self, target: DepthTarget, amount: f32) {
        let forward = self.scene.camera_forward();
        let limit = self.config.interaction.depth_limit;
        let applied = match target {
            DepthTarget::Body => self.drag.adjust_depth(amount, forward, limit),
            DepthTarget::Pin => self.pins.adjust_depth(amount, forward, limit),
        };
        self.state.add_depth(applied);
    }

    fn retrack(&mut self) {
        if !self.drag.is_dragging() && !self.pins.is_holding() {
            return;
        }
        let ray = self.scene.pointer_ray(self.pointer_ndc);
        self.drag.track(&mut self.physics, &ray);
        if self.pins.track(&ray).is_some() {
            self.pins.update_transforms(&mut self.scene, &self.registry);
        }
    }

    fn touch_start(&mut self, touches: &[Vec2], time: f64) {
        let Some(first) = touches.first().copied() else {
            return;
        };

        if touches.len() >= 2 {
            if let Some(centroid) = touch_centroid(touches) {
                self.state.begin_depth(centroid.y);
            }
            return;
        }

        self.pointer_down(first, time, PointerKind::Touch);
    }

    fn touch_move(&mut self, touches: &[Vec2]) {
        let Some(first) = touches.first().copied() else {
            return;
        };

        if let GestureMode::DepthAdjust { .. } = self.state.mode() {
            if let Some(centroid) = touch_centroid(touches).filter(|_| touches.len() >= 2) {
                let dy = self.state.depth_motion(centroid.y);
                self.adjust_depth(dy * self.config.interaction.touch_depth_scale);
            }
            return;
        }

        self.pointer_move(first);
    }

    /// Any lifted finger ends the gesture, even with others still down
    fn touch_end(&mut self, released: Vec2, remaining: &[Vec2], time: f64) {
        if remaining.len() < 2 {
            self.state.end_depth();
        }
        self.pointer_up(released, time);
    }
}
