// ============================================================
// Layer 3 — Document Domain Type
// ============================================================
// One plain-text file read from the corpus tree. The text is
// the lossily decoded file content, before normalisation.

use serde::{Deserialize, Serialize};

/// A raw document loaded from disk.
/// Read-only input: the pipeline never writes it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Path relative to the corpus root, used in log messages
    pub source: String,

    /// The decoded file content before any cleaning
    pub text: String,
}

impl Document {
    /// Create a new Document with a source path and text content.
    ///
    /// Example:
    ///   let doc = Document::new("mails/0001.txt", "Hallo Welt");
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text:   text.into(),
        }
    }

    /// An unreadable file still takes part in the merge as an empty text.
    pub fn empty(source: impl Into<String>) -> Self {
        Self::new(source, String::new())
    }
}
