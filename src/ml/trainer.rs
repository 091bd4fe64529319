// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Plain epoch loop over Burn's DataLoader with Adam:
//   - MyBackend (Autodiff<Wgpu>) carries the gradients
//   - targets arrive one-hot, the loss is categorical
//     cross-entropy
//   - no validation split, no early stopping, no mid-training
//     checkpoint: the fitted model is returned once every epoch
//     has run, on the inner (non-autodiff) backend
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::WindowBatcher, dataset::WindowDataset};
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::{NextWordModel, NextWordModelConfig};

pub type MyBackend      = burn::backend::Autodiff<burn::backend::Wgpu>;
pub type MyInnerBackend = burn::backend::Wgpu;

/// Fit a fresh model on `dataset` for `cfg.epochs` passes and return
/// it on the inner backend.
pub fn train_loop<B: AutodiffBackend>(
    cfg:       &TrainConfig,
    model_cfg: &NextWordModelConfig,
    seed:      u64,
    dataset:   WindowDataset,
    metrics:   &MetricsLogger,
    device:    B::Device,
) -> Result<NextWordModel<B::InnerBackend>> {
    B::seed(seed);

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: NextWordModel<B> = model_cfg.init(&device);
    tracing::info!(
        "Model ready: vocab={} embedding={} hidden={} window={}",
        model_cfg.class_count, model_cfg.embedding_dim,
        model_cfg.hidden_dim, model_cfg.window_length,
    );

    // ── Adam optimiser, library defaults ──────────────────────────────────────
    let mut optim = AdamConfig::new().init();

    let sample_count = dataset.sample_count();
    let batcher      = WindowBatcher::<B>::new(device.clone(), model_cfg.class_count);
    let loader       = DataLoaderBuilder::new(batcher)
        .batch_size(cfg.batch_size)
        .shuffle(seed)
        .build(dataset);

    tracing::info!(
        "Training on {} windows, batch size {}, {} epochs",
        sample_count, cfg.batch_size, cfg.epochs
    );

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {
        let mut loss_sum = 0.0f64;
        let mut batches  = 0usize;
        let mut correct  = 0usize;
        let mut seen     = 0usize;

        for batch in loader.iter() {
            let (loss, logits) = model.forward_loss(batch.contexts, batch.targets);

            loss_sum += loss.clone().into_scalar().elem::<f64>();
            batches  += 1;
            seen     += batch.target_indices.dims()[0];

            // argmax(1) returns shape [batch, 1], flatten to [batch]
            let hits: i64 = logits
                .argmax(1)
                .flatten::<1>(0, 1)
                .equal(batch.target_indices)
                .int()
                .sum()
                .into_scalar()
                .elem::<i64>();
            correct += hits as usize;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let avg_loss = if batches > 0 { loss_sum / batches as f64 } else { f64::NAN };
        let accuracy = if seen > 0 { correct as f64 / seen as f64 } else { 0.0 };

        println!(
            "Epoch {:>3}/{} | loss={:.4} | accuracy={:.1}%",
            epoch, cfg.epochs, avg_loss, accuracy * 100.0,
        );
        metrics.log(&EpochMetrics::new(epoch, avg_loss, accuracy))?;
    }

    tracing::info!("Training complete!");
    Ok(model.valid())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use tempfile::tempdir;

    use crate::data::dataset::WindowSample;

    #[test]
    fn test_short_run_learns_a_repeated_pattern() {
        let dir     = tempdir().unwrap();
        let metrics = MetricsLogger::new(dir.path()).unwrap();

        let cfg = TrainConfig {
            epochs:     30,
            batch_size: 4,
            lr:         1e-2,
            ..TrainConfig::default()
        };
        let model_cfg = NextWordModelConfig::new(5, 2)
            .with_embedding_dim(8)
            .with_hidden_dim(16);

        // "2 3 → 4" and "3 4 → 2" over and over
        let samples: Vec<WindowSample> = (0..16)
            .flat_map(|_| {
                [
                    WindowSample::new(vec![2, 3], 4),
                    WindowSample::new(vec![3, 4], 2),
                ]
            })
            .collect();

        let model = train_loop::<Autodiff<NdArray>>(
            &cfg, &model_cfg, 7, WindowDataset::new(samples), &metrics, Default::default(),
        )
        .unwrap();

        let device   = Default::default();
        let contexts = Tensor::<NdArray, 2, Int>::from_ints(
            TensorData::new(vec![2i32, 3], [1, 2]),
            &device,
        );
        let probs: Vec<f32> = model
            .forward_probs(contexts)
            .into_data()
            .convert::<f32>()
            .to_vec()
            .unwrap();
        assert!(probs[4] > 0.5, "expected index 4 to dominate, got {probs:?}");

        let csv = std::fs::read_to_string(metrics.csv_path()).unwrap();
        assert_eq!(csv.lines().count(), 1 + 30);
    }
}
