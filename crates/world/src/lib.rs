#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # THORNAV World Store
//!
//! Immutable, loaded-once representation of a precomputed scene.
//!
//! A scene is a finite set of agent poses ("states"). For every state the
//! store holds its location and rotation, one row of the transition graph,
//! a handful of cached visual feature vectors, and the bounding boxes of the
//! objects visible from it. It also owns the object table mapping class
//! names to ids and embedding vectors.
//!
//! ## Key Components
//!
//! -   **[`SceneData`]:** the serde form of a scene file, see [`scene`].
//! -   **[`World`]:** the validated, read-only store built from it. A
//!     `World` is never mutated after construction and is meant to be shared
//!     through an `Arc` by any number of concurrently running episodes.
//! -   **[`FeatureSource`]:** the request/response port episodes use to
//!     obtain a feature vector for a state. [`CachedFeatures`] serves them
//!     from the store itself; an external inference service can implement
//!     the same trait.
//!
//! ```rust,ignore
//! use world::World;
//!
//! let world = World::load("data/FloorPlan1.json")?;
//! let next = world.next_state(0, 0)?;
//! ```

use std::path::PathBuf;
use thiserror::Error;

pub mod features;
pub mod scene;
pub mod store;
pub mod types;

pub use features::{CachedFeatures, FeatureSource};
pub use scene::{BoxMap, BoxRecord, SceneData, BLOCKED};
pub use store::World;
pub use types::{object_class, Action, BoundingBox, Frame, StateId, Vec3};

#[derive(Error, Debug)]
pub enum WorldError {
    #[error("failed to read scene file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scene document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid bounding-box record for state {state}: {source}")]
    BoundingBoxes {
        state: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed scene: {0}")]
    Malformed(String),
    #[error("unknown object class {0:?}")]
    UnknownObject(String),
    #[error("state {state} out of range (scene has {len} states)")]
    StateOutOfRange { state: StateId, len: usize },
    #[error("action {action} out of range (graph has {len} actions)")]
    ActionOutOfRange { action: usize, len: usize },
    #[error("feature slot {slot} out of range ({len} cached variants)")]
    SlotOutOfRange { slot: usize, len: usize },
    #[error("scene was exported without observation frames")]
    NoObservations,
}
