//! Environment configuration.
//!
//! String tags from experiment files are parsed into closed enums here, so
//! an unknown target method or reward kind is rejected before any episode is
//! built.

use crate::EnvError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use world::{Action, Vec3, World};

/// How the goal is presented to the agent.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetMethod {
    /// Embedding vector of the goal object class.
    #[serde(alias = "word2vec")]
    Embedding,
    /// Visual feature vector of the goal object class.
    #[serde(alias = "aop")]
    Feature,
    /// Stacked visual feature of the goal pose.
    #[serde(alias = "target_driven")]
    Pose,
}

impl TargetMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TargetMethod::Embedding => "embedding",
            TargetMethod::Feature => "feature",
            TargetMethod::Pose => "pose",
        }
    }
}

impl FromStr for TargetMethod {
    type Err = EnvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "embedding" | "word2vec" => Ok(TargetMethod::Embedding),
            "feature" | "aop" => Ok(TargetMethod::Feature),
            "pose" | "target_driven" => Ok(TargetMethod::Pose),
            other => Err(EnvError::UnsupportedMethod(other.to_string())),
        }
    }
}

impl fmt::Display for TargetMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reward policy, fixed for the lifetime of an environment.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    /// Growth of the largest goal bounding box seen so far.
    #[serde(alias = "bbox")]
    Area,
    /// Goal bonus, small penalty otherwise.
    Step,
}

impl FromStr for RewardKind {
    type Err = EnvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "area" | "bbox" => Ok(RewardKind::Area),
            "step" => Ok(RewardKind::Step),
            other => Err(EnvError::UnsupportedReward(other.to_string())),
        }
    }
}

/// Goal of an episode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub object: String,
    #[serde(default)]
    pub position: Option<Vec3>,
    #[serde(default)]
    pub rotation: Option<Vec3>,
}

impl TaskSpec {
    #[must_use]
    pub fn object(object: impl Into<String>) -> Self {
        Self { object: object.into(), position: None, rotation: None }
    }

    #[must_use]
    pub fn at(object: impl Into<String>, position: Vec3, rotation: Vec3) -> Self {
        Self { object: object.into(), position: Some(position), rotation: Some(rotation) }
    }

    /// Whether an agent at `location` facing `rotation` has reached the goal.
    ///
    /// Only the heading (`y`) of the rotation is compared. A task without a
    /// goal pose is never reached.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_goal(&self, location: Vec3, rotation: Vec3) -> bool {
        match (self.position, self.rotation) {
            (Some(p), Some(r)) => location == p && rotation.y == r.y,
            _ => false,
        }
    }

    #[must_use]
    pub fn has_pose(&self) -> bool {
        self.position.is_some() && self.rotation.is_some()
    }
}

fn default_history_length() -> usize {
    4
}

fn default_action_count() -> usize {
    4
}

fn default_mask_size() -> usize {
    5
}

fn default_feature_variants() -> usize {
    1
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnvConfig {
    pub method: TargetMethod,
    pub reward: RewardKind,
    /// Number of stacked feature frames in an observation.
    #[serde(default = "default_history_length")]
    pub history_length: usize,
    /// Number of legal action slots, a prefix of [`Action::ALL`].
    #[serde(default = "default_action_count", alias = "action_size")]
    pub action_count: usize,
    /// Side length of the object masks.
    #[serde(default = "default_mask_size")]
    pub mask_size: usize,
    /// Cached feature variants sampled per observation.
    #[serde(default = "default_feature_variants")]
    pub n_feat_per_location: usize,
    /// Seed for the episode random source; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl EnvConfig {
    #[must_use]
    pub fn new(method: TargetMethod, reward: RewardKind) -> Self {
        Self {
            method,
            reward,
            history_length: default_history_length(),
            action_count: default_action_count(),
            mask_size: default_mask_size(),
            n_feat_per_location: default_feature_variants(),
            seed: None,
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_history_length(mut self, history_length: usize) -> Self {
        self.history_length = history_length;
        self
    }

    #[must_use]
    pub fn with_action_count(mut self, action_count: usize) -> Self {
        self.action_count = action_count;
        self
    }

    #[must_use]
    pub fn with_mask_size(mut self, mask_size: usize) -> Self {
        self.mask_size = mask_size;
        self
    }

    /// Checks the configuration against the scene it will run in.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self, world: &World) -> Result<(), EnvError> {
        if self.history_length == 0 {
            return Err(EnvError::InvalidConfig("history_length must be at least 1".into()));
        }
        if self.mask_size == 0 {
            return Err(EnvError::InvalidConfig("mask_size must be at least 1".into()));
        }
        let max_actions = Action::ALL.len().min(world.action_count());
        if self.action_count == 0 || self.action_count > max_actions {
            return Err(EnvError::InvalidConfig(format!(
                "action_count {} outside 1..={max_actions}",
                self.action_count
            )));
        }
        if self.n_feat_per_location == 0 || self.n_feat_per_location > world.feature_variants() {
            return Err(EnvError::InvalidConfig(format!(
                "n_feat_per_location {} outside 1..={}",
                self.n_feat_per_location,
                world.feature_variants()
            )));
        }
        Ok(())
    }
}
