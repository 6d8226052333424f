//! # Target Resolver
//!
//! Turns a task into the fixed goal representation shown to the agent for a
//! whole episode. Which representation is built depends on the configured
//! [`TargetMethod`]:
//!
//! -   `Embedding`: the goal class's embedding vector from the object table.
//! -   `Feature`: the goal class's visual feature vector from the scene's
//!     per-object feature table.
//! -   `Pose`: the stacked observation of the goal pose itself, replicated
//!     over the history depth like a freshly reset observation.

use crate::config::{TargetMethod, TaskSpec};
use crate::history::History;
use crate::tensor::Tensor;
use crate::EnvError;
use world::{FeatureSource, StateId, World, WorldError};

#[derive(Clone, Debug, PartialEq)]
pub enum TargetRepresentation {
    Embedding(Vec<f32>),
    Feature(Vec<f32>),
    Pose { state: StateId, stacked: Tensor },
}

impl TargetRepresentation {
    #[must_use]
    pub fn method(&self) -> TargetMethod {
        match self {
            TargetRepresentation::Embedding(_) => TargetMethod::Embedding,
            TargetRepresentation::Feature(_) => TargetMethod::Feature,
            TargetRepresentation::Pose { .. } => TargetMethod::Pose,
        }
    }

    /// Flat view of the representation.
    #[must_use]
    pub fn vector(&self) -> &[f32] {
        match self {
            TargetRepresentation::Embedding(v) | TargetRepresentation::Feature(v) => v,
            TargetRepresentation::Pose { stacked, .. } => &stacked.data,
        }
    }

    #[must_use]
    pub fn to_tensor(&self) -> Tensor {
        match self {
            TargetRepresentation::Embedding(v) | TargetRepresentation::Feature(v) => {
                Tensor::from_vec(vec![v.len()], v.clone())
            }
            TargetRepresentation::Pose { stacked, .. } => stacked.clone(),
        }
    }
}

/// Builds the target for `task`.
///
/// # Errors
///
/// Returns [`EnvError::World`] wrapping [`WorldError::UnknownObject`] when
/// the goal class is not in the object table, [`EnvError::MissingPose`] for
/// a pose target without position or rotation, and
/// [`EnvError::PoseNotFound`] when no state matches the goal pose.
pub fn resolve(
    method: TargetMethod,
    task: &TaskSpec,
    world: &World,
    features: &dyn FeatureSource,
    history_length: usize,
    rng: &fastrand::Rng,
) -> Result<TargetRepresentation, EnvError> {
    match method {
        TargetMethod::Embedding => {
            let id = world.object_id(&task.object)?;
            let embedding = world
                .embedding(id)
                .ok_or_else(|| WorldError::UnknownObject(task.object.clone()))?;
            Ok(TargetRepresentation::Embedding(embedding.to_vec()))
        }
        TargetMethod::Feature => {
            let id = world.object_id(&task.object)?;
            let feature = world
                .object_feature(id)
                .ok_or_else(|| WorldError::UnknownObject(task.object.clone()))?;
            Ok(TargetRepresentation::Feature(feature.to_vec()))
        }
        TargetMethod::Pose => {
            let (Some(position), Some(rotation)) = (task.position, task.rotation) else {
                return Err(EnvError::MissingPose { method: method.as_str() });
            };
            let state = world
                .find_state(position, rotation)
                .ok_or(EnvError::PoseNotFound { position, heading: rotation.y })?;
            let frame = features.request(state, rng)?;
            let stacked = History::tiled(&frame, history_length).to_tensor();
            Ok(TargetRepresentation::Pose { state, stacked })
        }
    }
}
