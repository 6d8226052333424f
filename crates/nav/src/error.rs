use thiserror::Error;
use world::{Vec3, WorldError};

#[derive(Error, Debug)]
pub enum EnvError {
    #[error(transparent)]
    World(#[from] WorldError),
    #[error("unsupported target method {0:?}")]
    UnsupportedMethod(String),
    #[error("unsupported reward kind {0:?}")]
    UnsupportedReward(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("{method} target requires a task position and rotation")]
    MissingPose { method: &'static str },
    #[error("no state at position {position} with heading {heading}")]
    PoseNotFound { position: Vec3, heading: f32 },
    #[error("action {action} not available ({available} actions)")]
    InvalidAction { action: usize, available: usize },
    #[error("scene has no upright start state")]
    NoUprightStates,
    #[error("mask point ({x}, {y}) falls outside the {size}x{size} grid")]
    MaskOutOfBounds { x: f32, y: f32, size: usize },
    #[error("cannot compare vectors of length {left} and {right}")]
    DimensionMismatch { left: usize, right: usize },
}
