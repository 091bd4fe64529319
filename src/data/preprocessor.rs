// ============================================================
// Layer 4 — Text Normalizer
// ============================================================
// Turns raw document text into the restricted form the
// vocabulary is fitted on.
//
// Cleaning steps (applied in order):
//   1. Lowercase
//   2. Every character that is not an ASCII letter, one of the
//      configured extra letters (ä ö ü ß by default) or
//      whitespace becomes a single space
//   3. Runs of whitespace collapse into one space
//   4. Leading/trailing space is trimmed
//
// The result only contains alphabet characters and single
// spaces, and cleaning it again returns it unchanged.
//
// Reference: Rust Book §8 (Strings in Rust)
//            Rust Book §13 (Iterators)

use crate::domain::document::Document;

/// Letters kept besides a-z when no other set is configured.
pub const DEFAULT_EXTRA_LETTERS: &str = "äöüß";

pub struct Normalizer {
    /// Lowercase letters outside a-z that survive cleaning
    extra_letters: Vec<char>,
}

/// All cleaned documents of one merge, joined by newlines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedCorpus {
    pub text:       String,
    pub file_count: usize,
}

impl Normalizer {
    /// Create a Normalizer with the default German letters
    pub fn new() -> Self {
        Self::with_extra_letters(DEFAULT_EXTRA_LETTERS)
    }

    pub fn with_extra_letters(letters: &str) -> Self {
        Self {
            extra_letters: letters.chars().flat_map(char::to_lowercase).collect(),
        }
    }

    fn is_kept(&self, c: char) -> bool {
        c.is_ascii_lowercase() || self.extra_letters.contains(&c)
    }

    /// Clean a raw text string. Takes a &str and returns an owned String.
    pub fn clean(&self, text: &str) -> String {
        let mut out         = String::with_capacity(text.len());
        let mut pending_gap = false;

        for c in text.chars().flat_map(char::to_lowercase) {
            if self.is_kept(c) {
                // A gap before the first kept char is the trimmed edge
                if pending_gap && !out.is_empty() {
                    out.push(' ');
                }
                pending_gap = false;
                out.push(c);
            } else {
                // whitespace and filtered characters both end up as a gap
                pending_gap = true;
            }
        }

        out
    }

    /// Clean every document and join the results with '\n'.
    pub fn merge(&self, docs: &[Document]) -> MergedCorpus {
        let cleaned: Vec<String> = docs.iter().map(|d| self.clean(&d.text)).collect();
        MergedCorpus {
            text:       cleaned.join("\n"),
            file_count: docs.len(),
        }
    }
}

/// Implement Default so Normalizer can be created with Normalizer::default()
impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}
