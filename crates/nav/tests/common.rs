#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;
use world::{BoundingBox, BoxMap, BoxRecord, SceneData, Vec3, World, BLOCKED};

pub fn kitchen() -> Arc<World> {
    Arc::new(World::load("tests/data/kitchen.json").unwrap())
}

/// States on a line along x. Action 0 moves to the next state and is
/// blocked at the end; only state 0 is upright, so resets always start
/// there. `goal_areas[s]` is the shaping area of a single "Mug" box at `s`.
pub fn corridor(goal_areas: &[f32]) -> Arc<World> {
    let len = goal_areas.len();
    let graph = (0..len)
        .map(|s| vec![if s + 1 < len { s as i64 + 1 } else { BLOCKED }])
        .collect();
    let rotation = (0..len)
        .map(|s| if s == 0 { Vec3::ZERO } else { Vec3::new(0.0, 0.0, 30.0) })
        .collect();
    let bbox = goal_areas
        .iter()
        .map(|&area| {
            let mut boxes = BoxMap::new();
            if area > 0.0 {
                // Width `area`, height term 0 + 1.
                boxes.insert("Mug|1".to_string(), BoundingBox::new(0.0, 0.0, area, 1.0));
            }
            BoxRecord::Map(boxes)
        })
        .collect();
    let data = SceneData {
        location: (0..len).map(|s| Vec3::new(s as f32, 0.0, 0.0)).collect(),
        rotation,
        graph,
        resnet_feature: (0..len).map(|s| vec![vec![s as f32, 1.0]]).collect(),
        observation_shape: [300, 400, 3],
        observation: None,
        bbox,
        object_ids: BTreeMap::from([("Mug".to_string(), 0)]),
        object_vector: vec![vec![1.0, 0.0]],
        object_feature: vec![vec![0.0, 1.0]],
    };
    Arc::new(World::from_data(data).unwrap())
}

/// A single upright state whose only action loops back to itself.
pub fn self_loop() -> Arc<World> {
    let data = SceneData {
        location: vec![Vec3::ZERO],
        rotation: vec![Vec3::ZERO],
        graph: vec![vec![0]],
        resnet_feature: vec![vec![vec![0.5, 0.5]]],
        observation_shape: [300, 400, 3],
        observation: None,
        bbox: vec![BoxRecord::Map(BoxMap::new())],
        object_ids: BTreeMap::from([("Mug".to_string(), 0)]),
        object_vector: vec![vec![1.0, 0.0]],
        object_feature: vec![vec![0.0, 1.0]],
    };
    Arc::new(World::from_data(data).unwrap())
}
