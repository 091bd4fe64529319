// ============================================================
// Layer 6 — Vocabulary & Config Sidecars
// ============================================================
// Persists everything a consumer needs besides the weights:
//
//   vocab.json      — the fitted Vocabulary (both directions)
//   tokenizer.json  — the same mapping as a HuggingFace WordLevel
//                     tokenizer, so any `tokenizers` runtime can
//                     turn text into model input
//   config.json     — { "windowLength": W }
//
// tokenizer.json is written by hand as JSON and reloaded with
// Tokenizer::from_file; the reload is then checked to encode a
// sample exactly like the Vocabulary does.
//
// Reference: HuggingFace tokenizers JSON format (WordLevel model)

use anyhow::{Context, Result};
use std::{fs, path::{Path, PathBuf}};
use serde::{Deserialize, Serialize};
use tokenizers::Tokenizer;

use crate::domain::vocabulary::{Vocabulary, OOV_INDEX, OOV_TOKEN, PAD_INDEX};

const VOCAB_FILE:     &str = "vocab.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const CONFIG_FILE:    &str = "config.json";

/// Name given to the padding index inside tokenizer.json only.
const PAD_TOKEN: &str = "<PAD>";

/// The configuration sidecar: the context window length the model
/// was trained with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(rename = "windowLength")]
    pub window_length: usize,
}

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    // ── vocab.json ────────────────────────────────────────────────────────────
    pub fn save_vocabulary(&self, vocab: &Vocabulary) -> Result<PathBuf> {
        self.write_json(VOCAB_FILE, vocab)
    }

    pub fn load_vocabulary(&self) -> Result<Vocabulary> {
        self.read_json(VOCAB_FILE)
    }

    // ── config.json ───────────────────────────────────────────────────────────
    pub fn save_window_config(&self, window_length: usize) -> Result<PathBuf> {
        self.write_json(CONFIG_FILE, &WindowConfig { window_length })
    }

    pub fn load_window_config(&self) -> Result<WindowConfig> {
        self.read_json(CONFIG_FILE)
    }

    // ── tokenizer.json ────────────────────────────────────────────────────────
    /// Write the vocabulary as a WordLevel tokenizer and load it back.
    pub fn save_tokenizer(&self, vocab: &Vocabulary) -> Result<Tokenizer> {
        let mut word_index = serde_json::Map::new();
        word_index.insert(PAD_TOKEN.to_string(), serde_json::json!(PAD_INDEX));
        for (token, index) in vocab.entries() {
            word_index.insert(token.to_string(), serde_json::json!(index));
        }

        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [
                {"id": PAD_INDEX, "content": PAD_TOKEN, "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": OOV_INDEX, "content": OOV_TOKEN, "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
            ],
            "normalizer": null,
            "pre_tokenizer": {
                "type": "WhitespaceSplit"
            },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": word_index,
                "unk_token": OOV_TOKEN
            }
        });

        let path = self.write_json(TOKENIZER_FILE, &tokenizer_json)?;
        tracing::info!("Tokenizer with {} entries saved to '{}'", vocab.len() + 1, path.display());
        self.load_tokenizer()
    }

    pub fn load_tokenizer(&self) -> Result<Tokenizer> {
        let path = self.dir.join(TOKENIZER_FILE);
        Tokenizer::from_file(&path)
            .map_err(|e| anyhow::anyhow!("Cannot load tokenizer from '{}': {}", path.display(), e))
    }

    /// True if the tokenizer maps `sample` to the same ids as the
    /// vocabulary. A mismatch is logged, not returned as an error.
    pub fn verify(tokenizer: &Tokenizer, vocab: &Vocabulary, sample: &str) -> Result<bool> {
        let encoding = tokenizer
            .encode(sample, false)
            .map_err(|e| anyhow::anyhow!("Tokenize: {e}"))?;
        let expected = vocab.encode(sample);
        let matches  = encoding.get_ids() == expected.as_slice();
        if !matches {
            tracing::warn!(
                "tokenizer.json disagrees with vocab.json on {:?}: {:?} vs {:?}",
                sample, encoding.get_ids(), expected,
            );
        }
        Ok(matches)
    }

    // ── helpers ───────────────────────────────────────────────────────────────
    fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;
        let path = self.dir.join(name);
        fs::write(&path, serde_json::to_string_pretty(value)?)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        tracing::debug!("Wrote '{}'", path.display());
        Ok(path)
    }

    fn read_json<T: for<'de> Deserialize<'de>>(&self, name: &str) -> Result<T> {
        let path = self.dir.join(name);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read '{}'. Have you run 'train' first?", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Malformed '{}'", path.display()))
    }
}
