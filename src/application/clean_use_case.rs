// ============================================================
// Layer 2 — CleanUseCase
// ============================================================
// Strips leading line numbers from one text file:
//
//   Step 1: Read the input file          (std::fs)
//   Step 2: Clean every line             (Layer 4 - data)
//   Step 3: Overwrite the output file    (std::fs)

use anyhow::{Context, Result};
use std::fs;

use crate::data::line_cleaner::LineCleaner;

#[derive(Debug, Clone)]
pub struct CleanConfig {
    pub input:  String,
    pub output: String,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            input:  "input.txt".to_string(),
            output: "cleaned.txt".to_string(),
        }
    }
}

pub struct CleanUseCase {
    config: CleanConfig,
}

impl CleanUseCase {
    pub fn new(config: CleanConfig) -> Self {
        Self { config }
    }

    /// Returns the number of lines written.
    pub fn execute(&self) -> Result<usize> {
        let cfg = &self.config;

        // ── Step 1: Read ──────────────────────────────────────────────────────
        let raw = fs::read_to_string(&cfg.input)
            .with_context(|| format!("Cannot read '{}'", cfg.input))?;

        // ── Step 2: Clean ─────────────────────────────────────────────────────
        let cleaned = LineCleaner::new().clean(&raw);
        let lines   = if cleaned.is_empty() { 0 } else { cleaned.lines().count() };

        // ── Step 3: Write ─────────────────────────────────────────────────────
        fs::write(&cfg.output, &cleaned)
            .with_context(|| format!("Cannot write '{}'", cfg.output))?;

        tracing::info!("Cleaned '{}' → '{}' ({} lines)", cfg.input, cfg.output, lines);
        Ok(lines)
    }
}
