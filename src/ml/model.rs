use burn::{
    nn::{
        lstm::{Lstm, LstmConfig},
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::{log_softmax, softmax},
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally. Adding them again gives conflicting impls.
#[derive(Config, Debug)]
pub struct NextWordModelConfig {
    /// Output width = vocabulary class count (padding + OOV + tokens)
    pub class_count:   usize,
    pub window_length: usize,
    #[config(default = 128)]
    pub embedding_dim: usize,
    #[config(default = 256)]
    pub hidden_dim:    usize,
}

impl NextWordModelConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> NextWordModel<B> {
        let embedding     = EmbeddingConfig::new(self.class_count, self.embedding_dim).init(device);
        let sequence_lstm = LstmConfig::new(self.embedding_dim, self.hidden_dim, true).init(device);
        let summary_lstm  = LstmConfig::new(self.hidden_dim, self.hidden_dim, true).init(device);
        let output        = LinearConfig::new(self.hidden_dim, self.class_count).init(device);
        NextWordModel {
            embedding, sequence_lstm, summary_lstm, output,
            window_length: self.window_length,
        }
    }
}

#[derive(Module, Debug)]
pub struct NextWordModel<B: Backend> {
    pub embedding:     Embedding<B>,
    /// Returns the hidden state of every time step
    pub sequence_lstm: Lstm<B>,
    /// Only its final hidden state is used
    pub summary_lstm:  Lstm<B>,
    pub output:        Linear<B>,
    pub window_length: usize,
}

impl<B: Backend> NextWordModel<B> {
    /// contexts: [batch, window_length] → logits: [batch, class_count]
    pub fn forward(&self, contexts: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let x = self.embedding.forward(contexts);            // [batch, window, embedding]
        let (sequence, _) = self.sequence_lstm.forward(x, None); // [batch, window, hidden]
        let (_, last)     = self.summary_lstm.forward(sequence, None);
        self.output.forward(last.hidden)                     // [batch, class_count]
    }

    /// Softmax over the vocabulary for every row.
    pub fn forward_probs(&self, contexts: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        softmax(self.forward(contexts), 1)
    }

    /// Mean categorical cross-entropy against one-hot targets,
    /// plus the logits for accuracy bookkeeping.
    pub fn forward_loss(
        &self,
        contexts: Tensor<B, 2, Int>,
        targets:  Tensor<B, 2>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward(contexts);
        let loss   = categorical_cross_entropy(logits.clone(), targets);
        (loss, logits)
    }
}

/// −Σ target · log softmax(logits), averaged over the batch.
pub fn categorical_cross_entropy<B: Backend>(
    logits:  Tensor<B, 2>,
    targets: Tensor<B, 2>,
) -> Tensor<B, 1> {
    (targets * log_softmax(logits, 1))
        .sum_dim(1)
        .mean()
        .neg()
}
