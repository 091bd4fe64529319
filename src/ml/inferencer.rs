// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Wraps a fitted NextWordModel as a NextTokenPredictor: one
// window of indices in, one probability per vocabulary index
// out. The query loop never touches tensors directly.
use anyhow::{ensure, Result};
use burn::prelude::*;

use crate::domain::traits::NextTokenPredictor;
use crate::ml::model::NextWordModel;

pub type InferBackend = burn::backend::Wgpu;

pub struct Inferencer<B: Backend> {
    model:  NextWordModel<B>,
    device: B::Device,
}

impl<B: Backend> Inferencer<B> {
    pub fn new(model: NextWordModel<B>, device: B::Device) -> Self {
        Self { model, device }
    }
}

impl<B: Backend> NextTokenPredictor for Inferencer<B> {
    fn next_token_distribution(&self, context: &[u32]) -> Result<Vec<f32>> {
        ensure!(
            context.len() == self.model.window_length,
            "context has {} indices, the model expects {}",
            context.len(),
            self.model.window_length,
        );

        let flat: Vec<i32> = context.iter().map(|&x| x as i32).collect();
        let input = Tensor::<B, 2, Int>::from_ints(
            TensorData::new(flat, [1, context.len()]),
            &self.device,
        );

        self.model
            .forward_probs(input)
            .into_data()
            .convert::<f32>()
            .to_vec()
            .map_err(|e| anyhow::anyhow!("Cannot read probabilities: {e:?}"))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    use crate::ml::model::NextWordModelConfig;

    fn inferencer() -> Inferencer<NdArray> {
        let device = Default::default();
        let model  = NextWordModelConfig::new(6, 3)
            .with_embedding_dim(4)
            .with_hidden_dim(8)
            .init::<NdArray>(&device);
        Inferencer::new(model, device)
    }

    #[test]
    fn test_distribution_covers_vocabulary_and_sums_to_one() {
        let probs = inferencer().next_token_distribution(&[0, 2, 5]).unwrap();
        assert_eq!(probs.len(), 6);
        let total: f32 = probs.iter().sum();
        assert!((total - 1.0).abs() < 1e-4, "sum was {total}");
    }

    #[test]
    fn test_wrong_context_length_is_rejected() {
        assert!(inferencer().next_token_distribution(&[1, 2]).is_err());
    }
}
