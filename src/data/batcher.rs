// ============================================================
// Layer 4 — Window Batcher
// ============================================================
// Implements Burn's Batcher trait to stack WindowSamples into
// tensors for one mini-batch.
//
//   Input:  N samples, each with W context indices + 1 target
//   Output: contexts        [N, W]      Int
//           targets         [N, V]      Float  (one-hot, V = class count)
//           target_indices  [N]         Int    (for accuracy)
//
// The one-hot expansion happens here, per mini-batch, so the
// full training set never has to hold N × V floats at once.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::WindowSample;
use crate::data::sequencer::one_hot;

#[derive(Debug, Clone)]
pub struct WindowBatch<B: Backend> {
    /// Context windows, shape [batch_size, window_length]
    pub contexts: Tensor<B, 2, Int>,

    /// One-hot next-token targets, shape [batch_size, class_count]
    pub targets: Tensor<B, 2>,

    /// Target indices, shape [batch_size]
    pub target_indices: Tensor<B, 1, Int>,
}

#[derive(Clone, Debug)]
pub struct WindowBatcher<B: Backend> {
    /// The device to create tensors on
    pub device: B::Device,
    /// Width of the one-hot rows
    pub class_count: usize,
}

impl<B: Backend> WindowBatcher<B> {
    pub fn new(device: B::Device, class_count: usize) -> Self {
        Self { device, class_count }
    }
}

impl<B: Backend> Batcher<WindowSample, WindowBatch<B>> for WindowBatcher<B> {
    fn batch(&self, items: Vec<WindowSample>) -> WindowBatch<B> {
        let batch_size    = items.len();
        // Every window of one run has the same length
        let window_length = items.first().map_or(0, WindowSample::window_length);

        let context_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.context.iter().map(|&x| x as i32))
            .collect();

        let target_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| one_hot(s.target, self.class_count))
            .collect();

        let indices: Vec<i32> = items.iter().map(|s| s.target as i32).collect();

        let contexts = Tensor::<B, 2, Int>::from_ints(
            TensorData::new(context_flat, [batch_size, window_length]),
            &self.device,
        );

        let targets = Tensor::<B, 2>::from_floats(
            TensorData::new(target_flat, [batch_size, self.class_count]),
            &self.device,
        );

        let target_indices = Tensor::<B, 1, Int>::from_ints(
            TensorData::new(indices, [batch_size]),
            &self.device,
        );

        WindowBatch { contexts, targets, target_indices }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_shapes_and_one_hot_rows() {
        let device  = Default::default();
        let batcher = WindowBatcher::<NdArray>::new(device, 5);
        let batch   = batcher.batch(vec![
            WindowSample::new(vec![2, 3, 4], 1),
            WindowSample::new(vec![0, 0, 2], 4),
        ]);

        assert_eq!(batch.contexts.dims(), [2, 3]);
        assert_eq!(batch.targets.dims(), [2, 5]);
        assert_eq!(batch.target_indices.dims(), [2]);

        let targets: Vec<f32> = batch.targets.into_data().to_vec().unwrap();
        assert_eq!(
            targets,
            vec![0.0, 1.0, 0.0, 0.0, 0.0,
                 0.0, 0.0, 0.0, 0.0, 1.0]
        );
    }
}
