//! Error types for vd-core

/// Configuration and assembly errors.
///
/// Gesture handling never produces these: a gesture that cannot resolve its
/// target is a no-op, not a failure.
#[derive(Debug, thiserror::Error)]
pub enum VoodooError {
    #[error("Unknown part '{name}' referenced by {context}")]
    UnknownPart { name: String, context: String },
    #[error("Duplicate part name: {0}")]
    DuplicatePart(String),
    #[error("Joint '{0}' connects a part to itself")]
    SelfJoint(String),
    #[error("Joint '{joint}' has an empty angular range [{min}, {max}]")]
    InvalidRange { joint: String, min: f32, max: f32 },
    #[error("Part '{0}' must have a positive mass")]
    InvalidMass(String),
    #[error("Skeleton is missing required part '{0}'")]
    MissingPart(String),
    #[error("Physics backend rejected joint '{0}'")]
    ConstraintRejected(String),
    #[error("Invalid config value: {0}")]
    InvalidConfig(String),
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

pub type Result<T> = std::result::Result<T, VoodooError>;
