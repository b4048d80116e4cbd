//! Platform-neutral input events in viewport pixels

use glam::Vec2;

/// Keyboard depth control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthKey {
    /// Away from the camera (Q / W)
    Push,
    /// Towards the camera (E / S)
    Pull,
}

impl DepthKey {
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'q' | 'w' => Some(DepthKey::Push),
            'e' | 's' => Some(DepthKey::Pull),
            _ => None,
        }
    }

    /// +1 for push, -1 for pull
    pub fn sign(self) -> f32 {
        match self {
            DepthKey::Push => 1.0,
            DepthKey::Pull => -1.0,
        }
    }
}

/// Events fed to the session. Positions are in pixels from the viewport's
/// top-left corner; times are in seconds from any fixed origin.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { position: Vec2, time: f64 },
    PointerMove { position: Vec2 },
    PointerUp { position: Vec2, time: f64 },
    /// The pointer left the surface mid-gesture
    PointerCancel,
    DoubleClick { position: Vec2 },
    Wheel { delta_y: f32 },
    Key(DepthKey),
    /// All current touches after a finger went down
    TouchStart { touches: Vec<Vec2>, time: f64 },
    TouchMove { touches: Vec<Vec2> },
    /// A finger lifted at `released`; `remaining` are the touches still down
    TouchEnd {
        released: Vec2,
        remaining: Vec<Vec2>,
        time: f64,
    },
    Resize { width: f32, height: f32 },
}

/// Drawing surface size in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Pixel position to normalized device coordinates (y up)
    pub fn to_ndc(&self, position: Vec2) -> Vec2 {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Vec2::ZERO;
        }
        Vec2::new(
            position.x / self.width * 2.0 - 1.0,
            -(position.y / self.height * 2.0 - 1.0),
        )
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// Mean of the first two touches
pub fn touch_centroid(touches: &[Vec2]) -> Option<Vec2> {
    match touches {
        [a, b, ..] => Some((*a + *b) * 0.5),
        [a] => Some(*a),
        [] => None,
    }
}
