use std::sync::Arc;
use world::{CachedFeatures, FeatureSource, World, WorldError};

fn kitchen() -> Arc<World> {
    Arc::new(World::load("tests/data/kitchen.json").unwrap())
}

#[test]
fn single_variant_always_returns_first_slot() {
    let world = kitchen();
    let source = CachedFeatures::new(world.clone(), 1).unwrap();
    let rng = fastrand::Rng::with_seed(7);
    for _ in 0..20 {
        assert_eq!(source.request(1, &rng).unwrap(), world.feature(1, 0).unwrap());
    }
}

#[test]
fn all_variants_are_drawn() {
    let world = kitchen();
    let source = CachedFeatures::new(world.clone(), 2).unwrap();
    let rng = fastrand::Rng::with_seed(11);
    let draws: Vec<Vec<f32>> = (0..64).map(|_| source.request(2, &rng).unwrap()).collect();
    assert!(draws.iter().any(|f| f == world.feature(2, 0).unwrap()));
    assert!(draws.iter().any(|f| f == world.feature(2, 1).unwrap()));
    assert_eq!(source.feature_dim(), 3);
}

#[test]
fn too_many_variants_is_rejected() {
    let err = CachedFeatures::new(kitchen(), 3).err().unwrap();
    assert!(matches!(err, WorldError::SlotOutOfRange { slot: 3, len: 2 }));
    assert!(CachedFeatures::new(kitchen(), 0).is_err());
}
