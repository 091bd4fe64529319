use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One training example: `window_length` context indices and the
/// index of the token that follows them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSample {
    pub context: Vec<u32>,
    pub target:  u32,
}

impl WindowSample {
    pub fn new(context: Vec<u32>, target: u32) -> Self {
        Self { context, target }
    }
}

pub struct WindowDataset {
    samples: Vec<WindowSample>,
}

impl WindowDataset {
    pub fn new(samples: Vec<WindowSample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

impl Dataset<WindowSample> for WindowDataset {
    fn get(&self, index: usize) -> Option<WindowSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
