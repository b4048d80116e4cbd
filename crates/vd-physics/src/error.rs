//! Error types for vd-physics

#[derive(Debug, thiserror::Error)]
pub enum PhysicsError {
    #[error("Solver needs at least one iteration")]
    InvalidIterations,
    #[error("Friction must be finite and non-negative, got {0}")]
    InvalidFriction(f32),
    #[error("Restitution must lie in [0, 1], got {0}")]
    InvalidRestitution(f32),
    #[error("Gravity must be finite")]
    InvalidGravity,
    #[error("Boundary {0} has a zero normal")]
    DegenerateBoundary(usize),
}

pub type Result<T> = std::result::Result<T, PhysicsError>;
