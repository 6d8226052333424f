//! # Evaluation Loop
//!
//! Runs every task of an [`ExperimentConfig`] with a uniformly random
//! policy and summarizes the episodes. The tasks of a scene share one
//! loaded [`World`].
//!
//! An episode ends when the goal pose is reached, when the environment hits
//! its own step limit, or after `max_t` steps, whichever comes first. Only
//! reaching the goal counts as success.
//!
//! Task summaries are rolled up per scene into a [`SceneStats`], averaging
//! each task's figures with equal weight.

use crate::experiment::ExperimentConfig;
use anyhow::{Context, Result};
use nav::{EnvError, NavEnv, TaskSpec};
use serde::Serialize;
use std::sync::Arc;
use world::{StateId, World};

/// Episodes whose shortest path exceeds this many steps also count towards
/// the long-path statistics.
pub const LONG_PATH: usize = 5;

/// What happened in one evaluation episode.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EpisodeRecord {
    pub start: StateId,
    pub length: usize,
    pub reward: f32,
    pub collisions: usize,
    pub success: bool,
    /// Fewest legal moves from `start` to the goal pose, if any.
    pub shortest: Option<usize>,
}

impl EpisodeRecord {
    /// Success weighted by path length; zero for a failed episode.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn spl(&self) -> f32 {
        match self.shortest {
            Some(shortest) if self.success => {
                let taken = self.length.max(shortest);
                if taken == 0 {
                    1.0
                } else {
                    shortest as f32 / taken as f32
                }
            }
            _ => 0.0,
        }
    }

    fn is_long(&self) -> bool {
        self.shortest.is_some_and(|s| s > LONG_PATH)
    }
}

/// Summary of all episodes of one task.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TaskStats {
    pub scene: String,
    pub object: String,
    pub episodes: usize,
    pub mean_reward: f32,
    pub mean_length: f32,
    pub mean_collisions: f32,
    /// Fraction of episodes that reached the goal.
    pub success_rate: f32,
    pub spl: f32,
    /// Episodes with a shortest path longer than [`LONG_PATH`].
    pub long_episodes: usize,
    pub success_rate_long: f32,
    pub spl_long: f32,
}

impl TaskStats {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_episodes(scene: &str, object: &str, records: &[EpisodeRecord]) -> Self {
        let n = records.len().max(1) as f32;
        let mean = |f: &dyn Fn(&EpisodeRecord) -> f32| records.iter().map(f).sum::<f32>() / n;

        let long: Vec<&EpisodeRecord> = records.iter().filter(|r| r.is_long()).collect();
        let n_long = long.len().max(1) as f32;

        Self {
            scene: scene.to_string(),
            object: object.to_string(),
            episodes: records.len(),
            mean_reward: mean(&|r| r.reward),
            mean_length: mean(&|r| r.length as f32),
            mean_collisions: mean(&|r| r.collisions as f32),
            success_rate: mean(&|r| f32::from(u8::from(r.success))),
            spl: mean(&EpisodeRecord::spl),
            long_episodes: long.len(),
            success_rate_long: long.iter().filter(|r| r.success).count() as f32 / n_long,
            spl_long: long.iter().map(|r| r.spl()).sum::<f32>() / n_long,
        }
    }
}

/// Plays one episode with uniformly random actions.
///
/// # Errors
///
/// Propagates any failure of the environment.
pub fn run_episode(env: &mut NavEnv, policy: &fastrand::Rng, max_t: usize) -> Result<EpisodeRecord, EnvError> {
    env.reset()?;
    let start = env.start_state();
    let actions = env.actions().len();

    let mut record = EpisodeRecord {
        start,
        length: 0,
        reward: 0.0,
        collisions: 0,
        success: false,
        shortest: env.shortest_path_to_goal(start)?,
    };
    while record.length < max_t && !env.is_terminal() {
        let outcome = env.step(policy.usize(..actions))?;
        record.reward += outcome.reward;
        record.length += 1;
        if outcome.collided {
            record.collisions += 1;
        }
    }
    record.success = env.terminal();
    tracing::debug!(
        start,
        length = record.length,
        success = record.success,
        shortest = ?record.shortest,
        "episode finished"
    );
    Ok(record)
}

/// Evaluates `task` in `world` for the configured number of episodes.
///
/// # Errors
///
/// Fails if the environment cannot be built or an episode fails.
pub fn evaluate_task(
    config: &ExperimentConfig,
    scene: &str,
    world: Arc<World>,
    task: &TaskSpec,
    policy: &fastrand::Rng,
) -> Result<TaskStats> {
    let mut env = NavEnv::new(world, config.env.clone(), task.clone())
        .with_context(|| format!("failed to build environment for {scene}/{}", task.object))?;

    let mut records = Vec::with_capacity(config.num_episode);
    for episode in 0..config.num_episode {
        let record = run_episode(&mut env, policy, config.max_t)
            .with_context(|| format!("episode {episode} of {scene}/{} failed", task.object))?;
        records.push(record);
    }

    let stats = TaskStats::from_episodes(scene, &task.object, &records);
    tracing::info!(
        scene,
        object = %task.object,
        episodes = stats.episodes,
        mean_reward = format_args!("{:.2}", stats.mean_reward),
        mean_length = format_args!("{:.2}", stats.mean_length),
        mean_collisions = format_args!("{:.2}", stats.mean_collisions),
        success = format_args!("{:.2}%", stats.success_rate * 100.0),
        spl = format_args!("{:.3}", stats.spl),
        long_episodes = stats.long_episodes,
        success_long = format_args!("{:.2}%", stats.success_rate_long * 100.0),
        spl_long = format_args!("{:.3}", stats.spl_long),
        "evaluation"
    );
    Ok(stats)
}

/// Per-scene average of its tasks' summaries.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SceneStats {
    pub scene: String,
    pub tasks: usize,
    pub mean_length: f32,
    pub spl: f32,
    pub success_rate: f32,
    pub spl_long: f32,
    pub success_rate_long: f32,
}

impl SceneStats {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_tasks(scene: &str, tasks: &[TaskStats]) -> Self {
        let n = tasks.len().max(1) as f32;
        let mean = |f: fn(&TaskStats) -> f32| tasks.iter().map(f).sum::<f32>() / n;
        Self {
            scene: scene.to_string(),
            tasks: tasks.len(),
            mean_length: mean(|t| t.mean_length),
            spl: mean(|t| t.spl),
            success_rate: mean(|t| t.success_rate),
            spl_long: mean(|t| t.spl_long),
            success_rate_long: mean(|t| t.success_rate_long),
        }
    }
}

/// Everything one evaluation run produced.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    pub tasks: Vec<TaskStats>,
    pub scenes: Vec<SceneStats>,
}

/// Evaluates every task in the experiment, loading each scene once.
///
/// # Errors
///
/// Fails on the first scene that cannot be loaded or task that cannot be
/// evaluated.
pub fn run(config: &ExperimentConfig) -> Result<Report> {
    // Offset from the environment seed so start draws and actions use different streams.
    let policy = config
        .env
        .seed
        .map_or_else(fastrand::Rng::new, |seed| fastrand::Rng::with_seed(seed.wrapping_add(1)));
    let mut report = Report { tasks: Vec::with_capacity(config.task_count()), scenes: Vec::new() };

    for (scene, tasks) in &config.task_list {
        if tasks.is_empty() {
            tracing::warn!(scene = %scene, "no tasks listed, skipping scene");
            continue;
        }
        let path = config.scene_path(scene);
        let world = Arc::new(World::load(&path).with_context(|| format!("failed to load scene {scene}"))?);
        let first = report.tasks.len();
        for task in tasks {
            report.tasks.push(evaluate_task(config, scene, world.clone(), task, &policy)?);
        }

        let summary = SceneStats::from_tasks(scene, &report.tasks[first..]);
        tracing::info!(
            scene = %scene,
            tasks = summary.tasks,
            mean_length = format_args!("{:.2}", summary.mean_length),
            spl = format_args!("{:.3}", summary.spl),
            success = format_args!("{:.2}%", summary.success_rate * 100.0),
            spl_long = format_args!("{:.3}", summary.spl_long),
            success_long = format_args!("{:.2}%", summary.success_rate_long * 100.0),
            "scene summary"
        );
        report.scenes.push(summary);
    }
    Ok(report)
}
