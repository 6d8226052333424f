//! # THORNAV: Discrete Navigation over Precomputed Scenes
//!
//! Welcome to the documentation for THORNAV.
//!
//! ## Overview
//!
//! THORNAV is a step-based navigation simulator for training and evaluating
//! reinforcement-learning agents. Scenes are exported ahead of time as a
//! graph of reachable poses, each with cached visual features and the
//! bounding boxes of the objects in view. An agent walks that graph one
//! discrete action at a time looking for a goal object or pose; no physics
//! or rendering runs at simulation time.
//!
//! ## Project Architecture
//!
//! -   **`thornav`:** The crate you are currently viewing. It is the entry
//!     point for the documentation and the evaluation binary, and it ties
//!     the libraries together through an [`experiment::ExperimentConfig`]
//!     and the evaluation loop in [`app`].
//! -   **[`world`]:** The immutable World Store: dataset decoding,
//!     transition graph, feature cache, bounding boxes, and object table.
//! -   **[`nav`]:** Episode configuration, target resolution, reward
//!     shaping, object masks, and the [`nav::NavEnv`] state machine.
//!
//! ## Getting Started
//!
//! Point the binary at an experiment file:
//!
//! ```text
//! thornav --config experiments/kitchen.json --episodes 50 --seed 7
//! ```
//!
//! From code, start with [`nav::NavEnv::new`] over a loaded
//! [`world::World`].

pub mod app;
pub mod experiment;

pub use nav;
pub use world;
