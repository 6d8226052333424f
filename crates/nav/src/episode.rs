//! # Episode State Machine
//!
//! [`NavEnv`] runs episodes of a single task over a shared [`World`]. It owns
//! all mutable per-episode state: the current and start states, the stacked
//! feature history, the goal and collision flags, reward bookkeeping, and
//! the step counter.
//!
//! An environment is ready to step as soon as it is constructed. Each
//! [`NavEnv::step`] either moves the agent along the transition graph or
//! records a collision, re-observes the resulting state, and scores the
//! step. Once the goal pose is reached the episode is over and must be
//! [`NavEnv::reset`] before stepping again; stepping a finished episode is
//! a bug in the driving loop and panics.

use crate::config::{EnvConfig, TaskSpec};
use crate::env::Env;
use crate::history::History;
use crate::mask;
use crate::reward::{max_bbox_area, RewardTracker};
use crate::target::{self, TargetRepresentation};
use crate::tensor::Tensor;
use crate::EnvError;
use std::sync::Arc;
use world::{Action, CachedFeatures, FeatureSource, Frame, StateId, World};

/// Steps after which an episode ends regardless of the goal.
pub const MAX_EPISODE_STEPS: u32 = 5000;

/// Result of a single [`NavEnv::step`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StepOutcome {
    pub state: StateId,
    pub reward: f32,
    pub collided: bool,
    /// Goal reached or step limit hit.
    pub done: bool,
}

pub struct NavEnv {
    world: Arc<World>,
    features: Arc<dyn FeatureSource>,
    config: EnvConfig,
    task: TaskSpec,
    target: TargetRepresentation,
    rng: fastrand::Rng,

    current_state: StateId,
    start_state: StateId,
    history: History,
    terminal: bool,
    collided: bool,
    rewards: RewardTracker,
    last_reward: f32,
    elapsed_steps: u32,
}

impl NavEnv {
    /// Builds an environment that reads features from the scene's cache and
    /// seeds its random source from `config.seed`.
    ///
    /// # Errors
    ///
    /// See [`NavEnv::with_features`].
    pub fn new(world: Arc<World>, config: EnvConfig, task: TaskSpec) -> Result<Self, EnvError> {
        // Checked here so a bad `n_feat_per_location` surfaces as a config
        // error rather than from `CachedFeatures::new`.
        config.validate(&world)?;
        let features = Arc::new(CachedFeatures::new(world.clone(), config.n_feat_per_location)?);
        let rng = config.seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
        Self::build(world, features, config, task, rng)
    }

    /// Builds an environment around an explicit feature source and random
    /// source, then resets it.
    ///
    /// # Errors
    ///
    /// Fails on an invalid configuration, an unresolvable target, or a scene
    /// without upright start states.
    pub fn with_features(
        world: Arc<World>,
        features: Arc<dyn FeatureSource>,
        config: EnvConfig,
        task: TaskSpec,
        rng: fastrand::Rng,
    ) -> Result<Self, EnvError> {
        config.validate(&world)?;
        Self::build(world, features, config, task, rng)
    }

    fn build(
        world: Arc<World>,
        features: Arc<dyn FeatureSource>,
        config: EnvConfig,
        task: TaskSpec,
        rng: fastrand::Rng,
    ) -> Result<Self, EnvError> {
        world.object_id(&task.object)?;
        if world.upright_states().next().is_none() {
            return Err(EnvError::NoUprightStates);
        }
        let target = target::resolve(
            config.method,
            &task,
            &world,
            features.as_ref(),
            config.history_length,
            &rng,
        )?;
        tracing::debug!(
            object = %task.object,
            method = %config.method,
            reward = ?config.reward,
            "resolved episode target"
        );

        let rewards = RewardTracker::new(config.reward);
        let mut env = Self {
            history: History::tiled(&[], config.history_length),
            world,
            features,
            config,
            task,
            target,
            rng,
            current_state: 0,
            start_state: 0,
            terminal: false,
            collided: false,
            rewards,
            last_reward: 0.0,
            elapsed_steps: 0,
        };
        env.reset()?;
        Ok(env)
    }

    /// Starts a new episode from a random upright state.
    ///
    /// # Errors
    ///
    /// Returns the feature source's failure for the drawn state.
    pub fn reset(&mut self) -> Result<(), EnvError> {
        let len = self.world.len();
        let start = loop {
            let k = self.rng.usize(..len);
            if self.world.is_upright(k) {
                break k;
            }
        };
        self.begin(start)
    }

    /// Starts a new episode from `state`.
    ///
    /// # Errors
    ///
    /// Returns [`world::WorldError::StateOutOfRange`] for an unknown state.
    pub fn reset_at(&mut self, state: StateId) -> Result<(), EnvError> {
        self.world.location(state)?;
        self.begin(state)
    }

    fn begin(&mut self, start: StateId) -> Result<(), EnvError> {
        let frame = self.features.request(start, &self.rng)?;
        self.history = History::tiled(&frame, self.config.history_length);
        self.current_state = start;
        self.start_state = start;
        self.terminal = false;
        self.collided = false;
        self.rewards.reset();
        self.last_reward = 0.0;
        self.elapsed_steps = 0;
        tracing::debug!(start, object = %self.task.object, "episode reset");
        Ok(())
    }

    /// Takes `action`, an index into [`NavEnv::actions`].
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::InvalidAction`] for an action outside the
    /// configured prefix, or the feature source's failure.
    ///
    /// # Panics
    ///
    /// Panics if the goal was already reached this episode.
    pub fn step(&mut self, action: usize) -> Result<StepOutcome, EnvError> {
        assert!(!self.terminal, "step() called in terminal state");
        if action >= self.config.action_count {
            return Err(EnvError::InvalidAction { action, available: self.config.action_count });
        }

        let from = self.current_state;
        let next = self.world.next_state(from, action)?;
        let state = next.unwrap_or(from);

        // A blocked move still re-observes the current state. Nothing is
        // committed until every lookup for this step has succeeded.
        let frame = self.features.request(state, &self.rng)?;
        let area = max_bbox_area(self.world.bounding_boxes(state)?, &self.task.object);
        let terminal = match next {
            Some(_) => self.task.is_goal(self.world.location(state)?, self.world.rotation(state)?),
            None => false,
        };

        self.current_state = state;
        self.terminal = terminal;
        self.collided = next.is_none();
        self.history.push(frame);
        self.last_reward = self.rewards.score(area, self.terminal);
        self.elapsed_steps += 1;

        tracing::trace!(
            from,
            action,
            to = self.current_state,
            collided = self.collided,
            terminal = self.terminal,
            reward = self.last_reward,
            "step"
        );

        Ok(StepOutcome {
            state: self.current_state,
            reward: self.last_reward,
            collided: self.collided,
            done: self.is_terminal(),
        })
    }

    /// Goal reached or step limit hit.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.terminal || self.elapsed_steps >= MAX_EPISODE_STEPS
    }

    /// Goal reached on the latest step.
    #[must_use]
    pub fn terminal(&self) -> bool {
        self.terminal
    }

    #[must_use]
    pub fn collided(&self) -> bool {
        self.collided
    }

    /// Reward of the latest step, zero right after a reset.
    #[must_use]
    pub fn reward(&self) -> f32 {
        self.last_reward
    }

    #[must_use]
    pub fn current_state(&self) -> StateId {
        self.current_state
    }

    #[must_use]
    pub fn start_state(&self) -> StateId {
        self.start_state
    }

    #[must_use]
    pub fn elapsed_steps(&self) -> u32 {
        self.elapsed_steps
    }

    #[must_use]
    pub fn bbox_area(&self) -> f32 {
        self.rewards.bbox_area()
    }

    #[must_use]
    pub fn max_bbox_area(&self) -> f32 {
        self.rewards.max_bbox_area()
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Stacked feature history, `[feature_dim, history_length]`.
    #[must_use]
    pub fn observation(&self) -> Tensor {
        self.history.to_tensor()
    }

    #[must_use]
    pub fn target(&self) -> &TargetRepresentation {
        &self.target
    }

    #[must_use]
    pub fn task(&self) -> &TaskSpec {
        &self.task
    }

    #[must_use]
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    #[must_use]
    pub fn world(&self) -> &Arc<World> {
        &self.world
    }

    /// Legal actions, a prefix of [`Action::ALL`].
    #[must_use]
    pub fn actions(&self) -> &'static [Action] {
        let all: &'static [Action] = &Action::ALL;
        &all[..self.config.action_count]
    }

    #[must_use]
    pub fn available_actions(&self) -> Vec<&'static str> {
        self.actions().iter().map(|a| a.name()).collect()
    }

    /// Binary mask of goal-class boxes in the current frame.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::MaskOutOfBounds`] for a box outside the frame.
    pub fn render_mask(&self) -> Result<Tensor, EnvError> {
        let boxes = self.world.bounding_boxes(self.current_state)?;
        mask::goal_mask(&self.world, boxes, &self.task.object, self.config.mask_size)
    }

    /// Target similarity of every box in the current frame.
    ///
    /// # Errors
    ///
    /// Fails for unknown box classes, a target whose length differs from
    /// the object embeddings, or a box outside the frame.
    pub fn render_similarity_mask(&self) -> Result<Tensor, EnvError> {
        let boxes = self.world.bounding_boxes(self.current_state)?;
        mask::similarity_mask(&self.world, boxes, self.target.vector(), self.config.mask_size)
    }

    /// Raw frame at the current state, for debugging.
    ///
    /// # Errors
    ///
    /// Returns [`world::WorldError::NoObservations`] if the scene has no
    /// frames.
    pub fn frame(&self) -> Result<Frame<'_>, EnvError> {
        Ok(self.world.observation(self.current_state)?)
    }

    /// Shortest number of legal moves from `from` to the goal pose, or
    /// `None` if the task has no pose or it is unreachable.
    ///
    /// # Errors
    ///
    /// Returns [`world::WorldError::StateOutOfRange`] for an unknown state.
    pub fn shortest_path_to_goal(&self, from: StateId) -> Result<Option<usize>, EnvError> {
        if !self.task.has_pose() {
            return Ok(None);
        }
        let world = &self.world;
        let path = world.shortest_path(from, self.config.action_count, |s| {
            match (world.location(s), world.rotation(s)) {
                (Ok(loc), Ok(rot)) => self.task.is_goal(loc, rot),
                _ => false,
            }
        })?;
        Ok(path)
    }
}

impl Env for NavEnv {
    fn step(&mut self, action: usize) -> Result<(Tensor, f32, bool), EnvError> {
        let outcome = NavEnv::step(self, action)?;
        Ok((self.observation(), outcome.reward, outcome.done))
    }

    fn reset(&mut self) -> Result<Tensor, EnvError> {
        NavEnv::reset(self)?;
        Ok(self.observation())
    }

    fn obs_size(&self) -> usize {
        self.features.feature_dim() * self.config.history_length
    }

    fn action_size(&self) -> usize {
        self.config.action_count
    }
}
