//! Experiment files: which scenes to load, which tasks to run in each, and
//! how every episode is configured.
//!
//! ```json
//! {
//!     "dataset_path": "data/{scene}.json",
//!     "env": { "method": "embedding", "reward": "step", "seed": 7 },
//!     "task_list": {
//!         "FloorPlan1": [{ "object": "Mug", "position": [0.0, 0.9, 0.25], "rotation": [0, 90, 0] }]
//!     },
//!     "num_episode": 100
//! }
//! ```
//!
//! A relative `dataset_path` is resolved against the directory holding the
//! experiment file.

use anyhow::{Context, Result};
use nav::{EnvConfig, TaskSpec};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const SCENE_PLACEHOLDER: &str = "{scene}";

fn default_num_episode() -> usize {
    10
}

fn default_max_t() -> usize {
    300
}

#[derive(Clone, Debug, Deserialize)]
pub struct ExperimentConfig {
    /// Dataset location with a `{scene}` placeholder.
    pub dataset_path: String,
    pub env: EnvConfig,
    /// Tasks to evaluate, keyed by scene name.
    pub task_list: BTreeMap<String, Vec<TaskSpec>>,
    #[serde(default = "default_num_episode")]
    pub num_episode: usize,
    /// Step cap for a single evaluation episode.
    #[serde(default = "default_max_t")]
    pub max_t: usize,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl ExperimentConfig {
    /// Reads and validates an experiment file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed, if `dataset_path` lacks
    /// the scene placeholder, or if no tasks are listed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read experiment config {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse experiment config {}", path.display()))?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        config.validate()?;
        tracing::info!(
            path = %path.display(),
            scenes = config.task_list.len(),
            tasks = config.task_count(),
            "experiment loaded"
        );
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.dataset_path.contains(SCENE_PLACEHOLDER),
            "dataset_path {:?} has no {SCENE_PLACEHOLDER} placeholder",
            self.dataset_path
        );
        anyhow::ensure!(self.task_count() > 0, "task_list is empty");
        anyhow::ensure!(self.max_t > 0, "max_t must be at least 1");
        Ok(())
    }

    /// Dataset file for `scene`.
    #[must_use]
    pub fn scene_path(&self, scene: &str) -> PathBuf {
        self.base_dir.join(self.dataset_path.replace(SCENE_PLACEHOLDER, scene))
    }

    #[must_use]
    pub fn task_count(&self) -> usize {
        self.task_list.values().map(Vec::len).sum()
    }

    /// Replaces the episode count, keeping the rest of the file.
    #[must_use]
    pub fn with_episodes(mut self, num_episode: usize) -> Self {
        self.num_episode = num_episode;
        self
    }

    /// Seeds every environment built from this experiment.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.env.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nav::{RewardKind, TargetMethod};

    fn parse(json: &str) -> ExperimentConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let config = parse(
            r#"{
                "dataset_path": "scenes/{scene}.json",
                "env": { "method": "word2vec", "reward": "step" },
                "task_list": { "FloorPlan1": [{ "object": "Mug" }] }
            }"#,
        );
        assert_eq!(config.env.method, TargetMethod::Embedding);
        assert_eq!(config.env.reward, RewardKind::Step);
        assert_eq!(config.num_episode, 10);
        assert_eq!(config.max_t, 300);
        assert_eq!(config.task_count(), 1);
        assert!(config.validate().is_ok());
        assert_eq!(config.scene_path("FloorPlan1"), PathBuf::from("scenes/FloorPlan1.json"));
    }

    #[test]
    fn placeholder_is_required() {
        let config = parse(
            r#"{
                "dataset_path": "scenes/kitchen.json",
                "env": { "method": "embedding", "reward": "area" },
                "task_list": { "kitchen": [{ "object": "Mug" }] }
            }"#,
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn overrides_replace_episode_count_and_seed() {
        let config = parse(
            r#"{
                "dataset_path": "{scene}.json",
                "env": { "method": "embedding", "reward": "area", "seed": 1 },
                "task_list": { "kitchen": [] },
                "num_episode": 3
            }"#,
        )
        .with_episodes(40)
        .with_seed(9);
        assert_eq!(config.num_episode, 40);
        assert_eq!(config.env.seed, Some(9));
        assert!(config.validate().is_err(), "no tasks listed");
    }
}
