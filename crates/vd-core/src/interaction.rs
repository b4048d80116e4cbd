//! Gesture state machine

use glam::Vec2;

use crate::config::InteractionConfig;

/// What a depth gesture is moving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthTarget {
    Body,
    Pin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureMode {
    #[default]
    Idle,
    DraggingBody,
    HoldingPin,
    /// Two-finger depth control on top of a drag or a held pin
    DepthAdjust { underlying: DepthTarget },
}

impl GestureMode {
    /// Mode to return to once depth control ends
    pub fn without_depth(self) -> Self {
        match self {
            GestureMode::DepthAdjust {
                underlying: DepthTarget::Body,
            } => GestureMode::DraggingBody,
            GestureMode::DepthAdjust {
                underlying: DepthTarget::Pin,
            } => GestureMode::HoldingPin,
            other => other,
        }
    }

    pub fn depth_target(self) -> Option<DepthTarget> {
        match self {
            GestureMode::DraggingBody => Some(DepthTarget::Body),
            GestureMode::HoldingPin => Some(DepthTarget::Pin),
            GestureMode::DepthAdjust { underlying } => Some(underlying),
            GestureMode::Idle => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
}

/// Current gesture plus the scalars it needs
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InteractionState {
    mode: GestureMode,
    pointer: PointerKind,
    start_time: f64,
    start_position: Vec2,
    last_position: Vec2,
    /// Sum of depth adjustments applied during this gesture
    depth_offset: f32,
    /// Previous two-finger centroid height
    depth_last_y: Option<f32>,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> GestureMode {
        self.mode
    }

    pub fn pointer(&self) -> PointerKind {
        self.pointer
    }

    pub fn is_idle(&self) -> bool {
        self.mode == GestureMode::Idle
    }

    pub fn last_position(&self) -> Vec2 {
        self.last_position
    }

    pub fn depth_offset(&self) -> f32 {
        self.depth_offset
    }

    /// Record the start of a press, whatever it turns out to be
    pub fn press(&mut self, pointer: PointerKind, position: Vec2, time: f64) {
        self.pointer = pointer;
        self.start_time = time;
        self.start_position = position;
        self.last_position = position;
        self.depth_offset = 0.0;
        self.depth_last_y = None;
    }

    pub fn set_mode(&mut self, mode: GestureMode) {
        if mode != self.mode {
            tracing::debug!("Gesture {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    /// Store a new pointer position; returns the vertical motion since the last one
    pub fn move_to(&mut self, position: Vec2) -> f32 {
        let dy = position.y - self.last_position.y;
        self.last_position = position;
        dy
    }

    pub fn add_depth(&mut self, applied: f32) {
        self.depth_offset += applied;
    }

    /// Enter two-finger depth control at the given centroid height
    pub fn begin_depth(&mut self, centroid_y: f32) -> bool {
        let Some(underlying) = self.mode.depth_target() else {
            return false;
        };
        self.depth_last_y = Some(centroid_y);
        self.set_mode(GestureMode::DepthAdjust { underlying });
        true
    }

    /// Vertical centroid motion since the last two-finger sample
    pub fn depth_motion(&mut self, centroid_y: f32) -> f32 {
        let previous = self.depth_last_y.replace(centroid_y);
        previous.map_or(0.0, |last| centroid_y - last)
    }

    /// Leave depth control, back to the drag or held pin underneath
    pub fn end_depth(&mut self) {
        self.depth_last_y = None;
        self.set_mode(self.mode.without_depth());
    }

    /// Whether a release at `position` / `time` completes a tap
    pub fn is_tap(&self, config: &InteractionConfig, position: Vec2, time: f64) -> bool {
        let threshold = match self.pointer {
            PointerKind::Mouse => config.tap_max_distance_mouse,
            PointerKind::Touch => config.tap_max_distance_touch,
        };
        let elapsed = time - self.start_time;
        elapsed >= 0.0
            && elapsed < config.tap_max_duration
            && position.distance(self.start_position) < threshold
    }

    /// End of every gesture
    pub fn reset(&mut self) {
        self.set_mode(GestureMode::Idle);
        self.depth_offset = 0.0;
        self.depth_last_y = None;
    }
}
