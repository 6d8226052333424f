use crate::tensor::Tensor;
use std::collections::VecDeque;

/// Fixed-depth stack of the most recent feature vectors, oldest first.
#[derive(Clone, Debug)]
pub struct History {
    frames: VecDeque<Vec<f32>>,
    depth: usize,
}

impl History {
    /// A history filled with `depth` copies of `frame`.
    ///
    /// # Panics
    ///
    /// Panics if `depth` is zero.
    #[must_use]
    pub fn tiled(frame: &[f32], depth: usize) -> Self {
        assert!(depth > 0, "history depth must be at least 1");
        Self {
            frames: std::iter::repeat_with(|| frame.to_vec()).take(depth).collect(),
            depth,
        }
    }

    /// Appends `frame`, discarding the oldest one.
    pub fn push(&mut self, frame: Vec<f32>) {
        self.frames.pop_front();
        self.frames.push_back(frame);
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f32]> {
        self.frames.iter().map(Vec::as_slice)
    }

    #[must_use]
    pub fn newest(&self) -> &[f32] {
        self.frames.back().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Stacked frames as a `[feature_dim, depth]` tensor; column `j` is the
    /// `j`-th oldest frame.
    #[must_use]
    pub fn to_tensor(&self) -> Tensor {
        let dim = self.newest().len();
        let mut data = vec![0.0; dim * self.depth];
        for (col, frame) in self.frames.iter().enumerate() {
            for (row, value) in frame.iter().enumerate() {
                data[row * self.depth + col] = *value;
            }
        }
        Tensor::from_vec(vec![dim, self.depth], data)
    }
}
