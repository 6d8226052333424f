use crate::tensor::Tensor;
use crate::EnvError;

/// Reinforcement learning environment trait.
///
/// Each call to [`step`] advances the episode by one discrete action and
/// returns the new observation, a reward signal, and whether the episode
/// has terminated.
///
/// [`step`]: Env::step
pub trait Env {
    /// Advance the environment by one action.
    ///
    /// Returns `(obs, reward, done)`.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid action or a failed lookup.
    fn step(&mut self, action: usize) -> Result<(Tensor, f32, bool), EnvError>;

    /// Start a new episode and return its initial observation.
    ///
    /// # Errors
    ///
    /// Returns an error if no start state can be drawn.
    fn reset(&mut self) -> Result<Tensor, EnvError>;

    /// Number of elements in an observation.
    fn obs_size(&self) -> usize;

    /// Number of discrete actions.
    fn action_size(&self) -> usize;
}
