use crate::config::RewardKind;
use world::{object_class, BoxMap};

/// Reward on the step that reaches the goal pose.
pub const GOAL_REWARD: f32 = 10.0;
/// Reward on every other step under [`RewardKind::Step`].
pub const STEP_PENALTY: f32 = -0.01;

/// Largest shaping area among the boxes of class `class`, zero if none.
#[must_use]
pub fn max_bbox_area(boxes: &BoxMap, class: &str) -> f32 {
    boxes
        .iter()
        .filter(|(key, _)| object_class(key) == class)
        .map(|(_, b)| b.shaping_area())
        .fold(0.0, f32::max)
}

/// Per-episode reward bookkeeping.
#[derive(Copy, Clone, Debug)]
pub struct RewardTracker {
    kind: RewardKind,
    bbox_area: f32,
    max_bbox_area: f32,
}

impl RewardTracker {
    #[must_use]
    pub fn new(kind: RewardKind) -> Self {
        Self { kind, bbox_area: 0.0, max_bbox_area: 0.0 }
    }

    pub fn reset(&mut self) {
        self.bbox_area = 0.0;
        self.max_bbox_area = 0.0;
    }

    #[must_use]
    pub fn kind(&self) -> RewardKind {
        self.kind
    }

    /// Goal-class area seen on the latest step.
    #[must_use]
    pub fn bbox_area(&self) -> f32 {
        self.bbox_area
    }

    /// Largest goal-class area seen this episode. Never decreases.
    #[must_use]
    pub fn max_bbox_area(&self) -> f32 {
        self.max_bbox_area
    }

    /// Records the goal area seen on a step and returns that step's reward.
    pub fn score(&mut self, bbox_area: f32, goal_reached: bool) -> f32 {
        self.bbox_area = bbox_area;
        let growth = if bbox_area > self.max_bbox_area {
            let growth = bbox_area - self.max_bbox_area;
            self.max_bbox_area = bbox_area;
            growth
        } else {
            0.0
        };
        match self.kind {
            RewardKind::Area => growth,
            RewardKind::Step if goal_reached => GOAL_REWARD,
            RewardKind::Step => STEP_PENALTY,
        }
    }
}
