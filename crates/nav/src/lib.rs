#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # THORNAV Navigation Environment
//!
//! Step-based navigation episodes over a precomputed [`world::World`].
//!
//! The agent moves between discrete poses along the scene's transition
//! graph. Every step yields a stack of recent visual features, a scalar
//! reward, and a termination signal; the goal is described by a
//! [`TaskSpec`] and shown to the agent as a [`TargetRepresentation`].
//!
//! ## Key Components
//!
//! -   **Configuration:** [`EnvConfig`] selects the [`TargetMethod`] and
//!     [`RewardKind`] once, at construction. See [`config`].
//! -   **Target Resolver:** [`target::resolve`] builds the fixed goal
//!     representation for the episode.
//! -   **Reward & masks:** [`reward`] scores steps by goal bounding-box
//!     growth or by a fixed per-step schedule; [`mask`] projects bounding
//!     boxes onto small grids used as auxiliary supervision.
//! -   **Episodes:** [`NavEnv`] in [`episode`] owns the mutable episode
//!     state and implements the generic [`Env`] trait.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nav::{EnvConfig, NavEnv, RewardKind, TargetMethod, TaskSpec};
//! use std::sync::Arc;
//!
//! let world = Arc::new(world::World::load("data/FloorPlan1.json")?);
//! let config = EnvConfig::new(TargetMethod::Embedding, RewardKind::Step).with_seed(7);
//! let mut env = NavEnv::new(world, config, TaskSpec::object("Mug"))?;
//! while !env.is_terminal() {
//!     env.step(0)?;
//! }
//! ```

pub mod config;
pub mod env;
pub mod episode;
mod error;
pub mod history;
pub mod mask;
pub mod reward;
pub mod target;
pub mod tensor;

pub use config::{EnvConfig, RewardKind, TargetMethod, TaskSpec};
pub use env::Env;
pub use episode::{NavEnv, StepOutcome, MAX_EPISODE_STEPS};
pub use error::EnvError;
pub use history::History;
pub use reward::{GOAL_REWARD, STEP_PENALTY};
pub use target::TargetRepresentation;
pub use tensor::Tensor;
