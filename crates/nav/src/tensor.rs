/// Dense row-major `f32` tensor handed to the consuming network.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    pub data: Vec<f32>,
    pub shape: Vec<usize>,
}

impl Tensor {
    /// # Panics
    ///
    /// Panics if `data` does not hold `shape.iter().product()` elements.
    #[must_use]
    pub fn from_vec(shape: Vec<usize>, data: Vec<f32>) -> Self {
        assert_eq!(shape.iter().product::<usize>(), data.len());
        Self { data, shape }
    }

    #[must_use]
    pub fn zeros(shape: Vec<usize>) -> Self {
        let len = shape.iter().product();
        Self { data: vec![0.0; len], shape }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Element at a full multi-dimensional index.
    #[must_use]
    pub fn get(&self, index: &[usize]) -> Option<f32> {
        if index.len() != self.shape.len() || index.iter().zip(&self.shape).any(|(i, d)| i >= d) {
            return None;
        }
        let offset = index
            .iter()
            .zip(&self.shape)
            .fold(0, |acc, (i, d)| acc * d + i);
        self.data.get(offset).copied()
    }
}
