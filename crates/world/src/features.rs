//! Feature request port.
//!
//! Episodes never read the feature cache directly; they ask a
//! [`FeatureSource`] for the feature vector observed at a state. The store
//! answers from its cache through [`CachedFeatures`]. A GPU extractor living
//! behind a queue implements the same trait and blocks until its reply
//! arrives; timeouts and device selection are its own business.

use crate::store::World;
use crate::types::StateId;
use crate::WorldError;
use std::sync::Arc;

pub trait FeatureSource: Send + Sync {
    /// Returns the feature vector observed at `state`.
    ///
    /// `rng` is the requesting episode's random source, for sources that
    /// model observation noise.
    ///
    /// # Errors
    ///
    /// Returns the source's lookup or transport failure.
    fn request(&self, state: StateId, rng: &fastrand::Rng) -> Result<Vec<f32>, WorldError>;

    /// Dimension of the returned vectors.
    fn feature_dim(&self) -> usize;
}

/// Serves features from the store's cache, drawing one of the first
/// `variants` cached camera samples uniformly at random per request.
#[derive(Clone)]
pub struct CachedFeatures {
    world: Arc<World>,
    variants: usize,
}

impl CachedFeatures {
    /// # Errors
    ///
    /// Returns [`WorldError::SlotOutOfRange`] if `variants` is zero or
    /// larger than the number of cached variants.
    pub fn new(world: Arc<World>, variants: usize) -> Result<Self, WorldError> {
        if variants == 0 || variants > world.feature_variants() {
            return Err(WorldError::SlotOutOfRange {
                slot: variants,
                len: world.feature_variants(),
            });
        }
        Ok(Self { world, variants })
    }

    #[must_use]
    pub fn world(&self) -> &Arc<World> {
        &self.world
    }
}

impl FeatureSource for CachedFeatures {
    fn request(&self, state: StateId, rng: &fastrand::Rng) -> Result<Vec<f32>, WorldError> {
        let slot = rng.usize(..self.variants);
        Ok(self.world.feature(state, slot)?.to_vec())
    }

    fn feature_dim(&self) -> usize {
        self.world.feature_dim()
    }
}
