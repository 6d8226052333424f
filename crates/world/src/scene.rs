//! # Scene Files
//!
//! Raw, serde-decoded form of a precomputed scene. A scene is exported once
//! from the 3D simulator and contains every reachable agent pose, the
//! transition graph between poses, cached visual features, and per-pose
//! object detections.
//!
//! [`SceneData`] is a plain data carrier; consistency checks happen when it
//! is turned into a [`crate::World`].

use crate::types::{BoundingBox, Vec3};
use crate::WorldError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Transition graph entry meaning "this action is blocked here".
pub const BLOCKED: i64 = -1;

/// Bounding boxes of one state, keyed by `"<objectClass>|<instanceId>"`.
pub type BoxMap = BTreeMap<String, BoundingBox>;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SceneData {
    pub location: Vec<Vec3>,
    pub rotation: Vec<Vec3>,
    /// `graph[state][action]`, a state id or [`BLOCKED`].
    pub graph: Vec<Vec<i64>>,
    /// `resnet_feature[state][variant]`, each a `D`-dimensional vector.
    pub resnet_feature: Vec<Vec<Vec<f32>>>,
    /// `[height, width, channels]` of the rendered frames.
    pub observation_shape: [usize; 3],
    /// Flattened `height * width * channels` bytes per state.
    #[serde(default)]
    pub observation: Option<Vec<Vec<u8>>>,
    pub bbox: Vec<BoxRecord>,
    pub object_ids: BTreeMap<String, usize>,
    /// Embedding vector per object id.
    pub object_vector: Vec<Vec<f32>>,
    /// Visual feature vector per object id, `D`-dimensional like
    /// `resnet_feature`.
    pub object_feature: Vec<Vec<f32>>,
}

/// Bounding boxes of one state.
///
/// Exporters either inline the mapping or store it as an encoded JSON
/// string per state.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoxRecord {
    Map(BoxMap),
    Encoded(String),
}

impl BoxRecord {
    pub(crate) fn decode(self, state: usize) -> Result<BoxMap, WorldError> {
        match self {
            BoxRecord::Map(map) => Ok(map),
            BoxRecord::Encoded(raw) => serde_json::from_str(&raw).map_err(|source| {
                tracing::error!(state, record = %raw, "undecodable bounding-box record");
                WorldError::BoundingBoxes { state, source }
            }),
        }
    }
}

impl From<BoxMap> for BoxRecord {
    fn from(map: BoxMap) -> Self {
        BoxRecord::Map(map)
    }
}

impl SceneData {
    /// Parses a scene document.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Parse`] if the document is not a valid scene.
    pub fn from_json(json: &str) -> Result<Self, WorldError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a scene file.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Io`] if the file cannot be read and
    /// [`WorldError::Parse`] if it is not a valid scene.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, WorldError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| WorldError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Number of states described by the location table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.location.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.location.is_empty()
    }
}
