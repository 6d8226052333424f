//! # World Store
//!
//! Validated, read-only view of a scene. All tables are checked for
//! consistency once in [`World::from_data`]; accessors afterwards only check
//! the ids they are handed.

use crate::scene::{BoxMap, SceneData, BLOCKED};
use crate::types::{Frame, StateId, Vec3};
use crate::WorldError;
use std::collections::{BTreeMap, VecDeque};
use std::path::Path;

pub struct World {
    locations: Vec<Vec3>,
    rotations: Vec<Vec3>,

    // Flattened `len * action_count`, `None` for blocked moves.
    graph: Vec<Option<StateId>>,
    action_count: usize,

    // Flattened `len * feature_variants * feature_dim`.
    features: Vec<f32>,
    feature_variants: usize,
    feature_dim: usize,

    observation_shape: [usize; 3],
    observations: Option<Vec<Vec<u8>>>,

    boxes: Vec<BoxMap>,

    object_ids: BTreeMap<String, usize>,
    object_names: Vec<Option<String>>,
    // Flattened `object_names.len() * embedding_dim`.
    embeddings: Vec<f32>,
    embedding_dim: usize,
    // Flattened `object_names.len() * feature_dim`.
    object_features: Vec<f32>,
}

impl World {
    /// Reads a scene file and builds the store.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, is not a scene document, or is
    /// internally inconsistent. Nothing is partially loaded.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WorldError> {
        let path = path.as_ref();
        let world = Self::from_data(SceneData::from_path(path)?)?;
        tracing::info!(
            path = %path.display(),
            states = world.len(),
            actions = world.action_count,
            feature_variants = world.feature_variants,
            feature_dim = world.feature_dim,
            objects = world.object_ids.len(),
            "scene loaded"
        );
        Ok(world)
    }

    /// Validates decoded scene tables and builds the store.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Malformed`] when tables disagree on the number
    /// of states, when the graph or feature cache is ragged, when a graph
    /// entry points outside the scene, or when the object table references
    /// missing embeddings or object features. Returns [`WorldError::BoundingBoxes`] for an
    /// undecodable bounding-box record.
    pub fn from_data(data: SceneData) -> Result<Self, WorldError> {
        let len = data.len();
        if len == 0 {
            return Err(malformed("scene has no states"));
        }
        expect_len("rotation", data.rotation.len(), len)?;
        expect_len("graph", data.graph.len(), len)?;
        expect_len("resnet_feature", data.resnet_feature.len(), len)?;
        expect_len("bbox", data.bbox.len(), len)?;

        let (graph, action_count) = flatten_graph(&data.graph, len)?;
        let (features, feature_variants, feature_dim) = flatten_features(&data.resnet_feature)?;

        let [height, width, channels] = data.observation_shape;
        if height == 0 || width == 0 || channels == 0 {
            return Err(malformed("observation_shape must be non-zero"));
        }
        if let Some(frames) = &data.observation {
            expect_len("observation", frames.len(), len)?;
            let frame_len = height * width * channels;
            if let Some((state, _)) = frames.iter().enumerate().find(|(_, f)| f.len() != frame_len) {
                return Err(malformed(format!(
                    "observation for state {state} is not {height}x{width}x{channels} bytes"
                )));
            }
        }

        let boxes = data
            .bbox
            .into_iter()
            .enumerate()
            .map(|(state, record)| record.decode(state))
            .collect::<Result<Vec<_>, _>>()?;

        let (object_names, embeddings, embedding_dim) =
            build_object_table(&data.object_ids, &data.object_vector)?;
        let object_features = flatten_object_features(&data.object_feature, object_names.len(), feature_dim)?;

        Ok(Self {
            locations: data.location,
            rotations: data.rotation,
            graph,
            action_count,
            features,
            feature_variants,
            feature_dim,
            observation_shape: data.observation_shape,
            observations: data.observation,
            boxes,
            object_ids: data.object_ids,
            object_names,
            embeddings,
            embedding_dim,
            object_features,
        })
    }

    /// Number of states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Width of the transition graph.
    #[must_use]
    pub fn action_count(&self) -> usize {
        self.action_count
    }

    /// Number of cached feature vectors per state.
    #[must_use]
    pub fn feature_variants(&self) -> usize {
        self.feature_variants
    }

    #[must_use]
    pub fn feature_dim(&self) -> usize {
        self.feature_dim
    }

    #[must_use]
    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    /// Height and width of the rendered frames, in pixels.
    #[must_use]
    pub fn frame_size(&self) -> (usize, usize) {
        (self.observation_shape[0], self.observation_shape[1])
    }

    /// # Errors
    ///
    /// Returns [`WorldError::StateOutOfRange`] for an unknown state.
    pub fn location(&self, state: StateId) -> Result<Vec3, WorldError> {
        self.check_state(state)?;
        Ok(self.locations[state])
    }

    /// # Errors
    ///
    /// Returns [`WorldError::StateOutOfRange`] for an unknown state.
    pub fn rotation(&self, state: StateId) -> Result<Vec3, WorldError> {
        self.check_state(state)?;
        Ok(self.rotations[state])
    }

    /// Cached feature vector `slot` of `state`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::StateOutOfRange`] or
    /// [`WorldError::SlotOutOfRange`].
    pub fn feature(&self, state: StateId, slot: usize) -> Result<&[f32], WorldError> {
        self.check_state(state)?;
        if slot >= self.feature_variants {
            return Err(WorldError::SlotOutOfRange { slot, len: self.feature_variants });
        }
        let start = (state * self.feature_variants + slot) * self.feature_dim;
        Ok(&self.features[start..start + self.feature_dim])
    }

    /// Bounding boxes visible from `state`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::StateOutOfRange`] for an unknown state.
    pub fn bounding_boxes(&self, state: StateId) -> Result<&BoxMap, WorldError> {
        self.check_state(state)?;
        Ok(&self.boxes[state])
    }

    /// Destination of `action` taken from `state`, or `None` if the move is
    /// blocked. Returned ids are always in `0..len()`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::StateOutOfRange`] or
    /// [`WorldError::ActionOutOfRange`].
    pub fn next_state(&self, state: StateId, action: usize) -> Result<Option<StateId>, WorldError> {
        self.check_state(state)?;
        if action >= self.action_count {
            return Err(WorldError::ActionOutOfRange { action, len: self.action_count });
        }
        Ok(self.graph[state * self.action_count + action])
    }

    /// First state whose location equals `location` and whose rotation about
    /// the vertical axis equals `rotation.y`. Comparison is exact.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn find_state(&self, location: Vec3, rotation: Vec3) -> Option<StateId> {
        self.locations
            .iter()
            .zip(&self.rotations)
            .position(|(loc, rot)| *loc == location && rot.y == rotation.y)
    }

    /// Whether the agent stands level in `state` (no roll).
    #[must_use]
    pub fn is_upright(&self, state: StateId) -> bool {
        self.rotations.get(state).is_some_and(|r| r.z == 0.0)
    }

    pub fn upright_states(&self) -> impl Iterator<Item = StateId> + '_ {
        (0..self.len()).filter(|&s| self.is_upright(s))
    }

    /// # Errors
    ///
    /// Returns [`WorldError::UnknownObject`] for a class missing from the
    /// object table.
    pub fn object_id(&self, class: &str) -> Result<usize, WorldError> {
        self.object_ids
            .get(class)
            .copied()
            .ok_or_else(|| WorldError::UnknownObject(class.to_string()))
    }

    #[must_use]
    pub fn object_name(&self, id: usize) -> Option<&str> {
        self.object_names.get(id).and_then(Option::as_deref)
    }

    /// Embedding vector of object `id`.
    #[must_use]
    pub fn embedding(&self, id: usize) -> Option<&[f32]> {
        if id >= self.object_names.len() {
            return None;
        }
        let start = id * self.embedding_dim;
        Some(&self.embeddings[start..start + self.embedding_dim])
    }

    /// Visual feature vector of object `id`.
    #[must_use]
    pub fn object_feature(&self, id: usize) -> Option<&[f32]> {
        if id >= self.object_names.len() {
            return None;
        }
        let start = id * self.feature_dim;
        Some(&self.object_features[start..start + self.feature_dim])
    }

    /// Raw frame rendered at `state`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NoObservations`] if the scene was exported
    /// without frames.
    pub fn observation(&self, state: StateId) -> Result<Frame<'_>, WorldError> {
        self.check_state(state)?;
        let frames = self.observations.as_ref().ok_or(WorldError::NoObservations)?;
        let [height, width, channels] = self.observation_shape;
        Ok(Frame { height, width, channels, data: &frames[state] })
    }

    /// Length of the shortest action sequence from `from` to any state
    /// accepted by `is_goal`, using only the first `action_count` actions.
    ///
    /// Returns `None` when no goal state is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::StateOutOfRange`] for an unknown start state.
    pub fn shortest_path(
        &self,
        from: StateId,
        action_count: usize,
        is_goal: impl Fn(StateId) -> bool,
    ) -> Result<Option<usize>, WorldError> {
        self.check_state(from)?;
        let actions = action_count.min(self.action_count);
        let mut dist = vec![usize::MAX; self.len()];
        let mut queue = VecDeque::new();
        dist[from] = 0;
        queue.push_back(from);
        while let Some(state) = queue.pop_front() {
            if is_goal(state) {
                return Ok(Some(dist[state]));
            }
            let row = &self.graph[state * self.action_count..][..actions];
            for next in row.iter().flatten() {
                if dist[*next] == usize::MAX {
                    dist[*next] = dist[state] + 1;
                    queue.push_back(*next);
                }
            }
        }
        Ok(None)
    }

    fn check_state(&self, state: StateId) -> Result<(), WorldError> {
        if state < self.len() {
            Ok(())
        } else {
            Err(WorldError::StateOutOfRange { state, len: self.len() })
        }
    }
}

fn malformed(msg: impl Into<String>) -> WorldError {
    WorldError::Malformed(msg.into())
}

fn expect_len(table: &str, got: usize, len: usize) -> Result<(), WorldError> {
    if got == len {
        Ok(())
    } else {
        Err(malformed(format!("{table} has {got} entries, expected {len}")))
    }
}

fn flatten_graph(rows: &[Vec<i64>], len: usize) -> Result<(Vec<Option<StateId>>, usize), WorldError> {
    let width = rows.first().map_or(0, Vec::len);
    if width == 0 {
        return Err(malformed("graph has no action columns"));
    }
    let mut graph = Vec::with_capacity(len * width);
    for (state, row) in rows.iter().enumerate() {
        if row.len() != width {
            return Err(malformed(format!(
                "graph row {state} has {} actions, expected {width}",
                row.len()
            )));
        }
        for (action, &entry) in row.iter().enumerate() {
            let next = match usize::try_from(entry) {
                Ok(next) if next < len => Some(next),
                _ if entry == BLOCKED => None,
                _ => {
                    return Err(malformed(format!(
                        "graph[{state}][{action}] = {entry} is neither a state nor blocked"
                    )))
                }
            };
            graph.push(next);
        }
    }
    Ok((graph, width))
}

fn flatten_features(rows: &[Vec<Vec<f32>>]) -> Result<(Vec<f32>, usize, usize), WorldError> {
    let variants = rows.first().map_or(0, Vec::len);
    let dim = rows.first().and_then(|r| r.first()).map_or(0, Vec::len);
    if variants == 0 || dim == 0 {
        return Err(malformed("resnet_feature is empty"));
    }
    let mut flat = Vec::with_capacity(rows.len() * variants * dim);
    for (state, row) in rows.iter().enumerate() {
        if row.len() != variants || row.iter().any(|f| f.len() != dim) {
            return Err(malformed(format!(
                "resnet_feature[{state}] is not {variants}x{dim}"
            )));
        }
        flat.extend(row.iter().flatten());
    }
    Ok((flat, variants, dim))
}

fn flatten_object_features(rows: &[Vec<f32>], objects: usize, dim: usize) -> Result<Vec<f32>, WorldError> {
    expect_len("object_feature", rows.len(), objects)?;
    if let Some((id, _)) = rows.iter().enumerate().find(|(_, f)| f.len() != dim) {
        return Err(malformed(format!("object_feature[{id}] is not {dim}-dimensional")));
    }
    Ok(rows.iter().flatten().copied().collect())
}

type ObjectTable = (Vec<Option<String>>, Vec<f32>, usize);

fn build_object_table(
    ids: &BTreeMap<String, usize>,
    vectors: &[Vec<f32>],
) -> Result<ObjectTable, WorldError> {
    let dim = vectors.first().map_or(0, Vec::len);
    if let Some((id, _)) = vectors.iter().enumerate().find(|(_, v)| v.len() != dim) {
        return Err(malformed(format!("object_vector[{id}] is not {dim}-dimensional")));
    }
    let mut names = vec![None; vectors.len()];
    for (name, &id) in ids {
        let slot = names.get_mut(id).ok_or_else(|| {
            malformed(format!("object {name:?} has id {id} without an embedding"))
        })?;
        if let Some(other) = slot.replace(name.clone()) {
            return Err(malformed(format!("objects {other:?} and {name:?} share id {id}")));
        }
    }
    Ok((names, vectors.iter().flatten().copied().collect(), dim))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::BoxRecord;
    use crate::types::BoundingBox;

    fn line_scene(len: usize) -> SceneData {
        // States on a line; action 0 moves forward, action 1 moves back.
        let graph = (0..len)
            .map(|s| {
                let fwd = if s + 1 < len { s as i64 + 1 } else { BLOCKED };
                let back = if s > 0 { s as i64 - 1 } else { BLOCKED };
                vec![fwd, back]
            })
            .collect();
        SceneData {
            location: (0..len).map(|s| Vec3::new(s as f32, 0.0, 0.0)).collect(),
            rotation: vec![Vec3::ZERO; len],
            graph,
            resnet_feature: (0..len).map(|s| vec![vec![s as f32; 3], vec![-(s as f32); 3]]).collect(),
            observation_shape: [4, 4, 3],
            observation: None,
            bbox: (0..len).map(|_| BoxRecord::Map(BoxMap::new())).collect(),
            object_ids: BTreeMap::from([("Mug".to_string(), 0)]),
            object_vector: vec![vec![1.0, 0.0]],
            object_feature: vec![vec![0.5, 0.25, 0.0]],
        }
    }

    #[test]
    fn feature_slots_are_independent() {
        let world = World::from_data(line_scene(3)).unwrap();
        assert_eq!(world.feature(2, 0).unwrap(), &[2.0, 2.0, 2.0]);
        assert_eq!(world.feature(2, 1).unwrap(), &[-2.0, -2.0, -2.0]);
        assert!(matches!(world.feature(2, 2), Err(WorldError::SlotOutOfRange { slot: 2, len: 2 })));
    }

    #[test]
    fn out_of_range_graph_entry_is_rejected() {
        let mut data = line_scene(3);
        data.graph[1][0] = 7;
        assert!(matches!(World::from_data(data), Err(WorldError::Malformed(_))));
    }

    #[test]
    fn ragged_feature_cache_is_rejected() {
        let mut data = line_scene(3);
        data.resnet_feature[1].pop();
        assert!(matches!(World::from_data(data), Err(WorldError::Malformed(_))));
    }

    #[test]
    fn object_features_must_match_cache_width() {
        let mut data = line_scene(2);
        data.object_feature = vec![vec![0.5, 0.25]];
        assert!(matches!(World::from_data(data), Err(WorldError::Malformed(_))));

        let mut data = line_scene(2);
        data.object_feature.push(vec![0.0; 3]);
        assert!(matches!(World::from_data(data), Err(WorldError::Malformed(_))));
    }

    #[test]
    fn shortest_path_counts_moves() {
        let world = World::from_data(line_scene(5)).unwrap();
        assert_eq!(world.shortest_path(0, 2, |s| s == 4).unwrap(), Some(4));
        assert_eq!(world.shortest_path(3, 2, |s| s == 3).unwrap(), Some(0));
        // Restricted to the forward action, states behind are unreachable.
        assert_eq!(world.shortest_path(4, 1, |s| s == 0).unwrap(), None);
        assert_eq!(world.shortest_path(4, 2, |s| s == 0).unwrap(), Some(4));
    }

    #[test]
    fn object_table_is_bidirectional() {
        let world = World::from_data(line_scene(2)).unwrap();
        let id = world.object_id("Mug").unwrap();
        assert_eq!(world.object_name(id), Some("Mug"));
        assert_eq!(world.embedding(id), Some(&[1.0, 0.0][..]));
        assert_eq!(world.object_feature(id), Some(&[0.5, 0.25, 0.0][..]));
        assert_eq!(world.object_feature(1), None);
        assert!(matches!(world.object_id("Sofa"), Err(WorldError::UnknownObject(_))));
    }

    #[test]
    fn bounding_boxes_are_kept_per_state() {
        let mut data = line_scene(2);
        data.bbox[1] = BoxRecord::Map(BoxMap::from([(
            "Mug|a".to_string(),
            BoundingBox::new(0.0, 0.0, 2.0, 2.0),
        )]));
        let world = World::from_data(data).unwrap();
        assert!(world.bounding_boxes(0).unwrap().is_empty());
        assert_eq!(world.bounding_boxes(1).unwrap().len(), 1);
    }
}
