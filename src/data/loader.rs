// ============================================================
// Layer 4 — Corpus Loader
// ============================================================
// Walks a directory tree with walkdir and reads every file
// whose name ends in the configured extension (".txt" by
// default) as one Document.
//
// Decoding policy:
//   - invalid UTF-8 byte sequences are dropped, the rest of the
//     file is kept
//   - a file that cannot be read at all is logged and becomes an
//     empty Document, so it still counts as a merged file
//   - a directory entry the walker cannot open is logged and
//     skipped
//   - a missing root directory is an error
//
// Entries are visited in file-name order so two runs over the
// same tree produce the same merged corpus.
//
// Reference: walkdir crate documentation
//            Rust Book §9 (Error Handling)

use anyhow::Result;
use std::{fs, path::{Path, PathBuf}};
use walkdir::WalkDir;

use crate::domain::document::Document;
use crate::domain::error::PipelineError;
use crate::domain::traits::DocumentSource;

/// Loads every matching text file below a root directory.
pub struct TextTreeLoader {
    root:      PathBuf,
    extension: String,
}

impl TextTreeLoader {
    /// `extension` is given without the leading dot, e.g. "txt".
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root:      root.into(),
            extension: extension.into(),
        }
    }

    fn matches(&self, path: &Path) -> bool {
        let suffix = format!(".{}", self.extension);
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(&suffix))
    }

    fn source_name(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

impl DocumentSource for TextTreeLoader {
    fn load_all(&self) -> Result<Vec<Document>> {
        if !self.root.is_dir() {
            return Err(PipelineError::MissingCorpus(self.root.clone()).into());
        }

        let mut docs = Vec::new();

        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable directory entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().is_file() || !self.matches(path) {
                continue;
            }

            let source = self.source_name(path);
            match fs::read(path) {
                Ok(bytes) => {
                    let text = decode_lossy(&bytes);
                    tracing::debug!("Loaded: {} ({} chars)", source, text.len());
                    docs.push(Document::new(source, text));
                }
                Err(e) => {
                    tracing::warn!("Cannot read '{}', treating it as empty: {}", path.display(), e);
                    docs.push(Document::empty(source));
                }
            }
        }

        tracing::info!("Loaded {} documents from '{}'", docs.len(), self.root.display());
        Ok(docs)
    }
}

/// Decode bytes as UTF-8, dropping any invalid sequence.
pub fn decode_lossy(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => String::from_utf8_lossy(bytes).replace(char::REPLACEMENT_CHARACTER, ""),
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_walks_nested_directories_in_name_order() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("b/inner")).unwrap();
        fs::write(dir.path().join("b/inner/2.txt"), "zwei").unwrap();
        fs::write(dir.path().join("a.txt"), "eins").unwrap();
        fs::write(dir.path().join("notes.md"), "ignored").unwrap();

        let docs = TextTreeLoader::new(dir.path(), "txt").load_all().unwrap();
        let texts: Vec<&str> = docs.iter().map(|d| d.text.as_str()).collect();
        assert_eq!(texts, vec!["eins", "zwei"]);
        assert_eq!(docs[1].source, Path::new("b/inner/2.txt").display().to_string());
    }

    #[test]
    fn test_invalid_utf8_bytes_are_dropped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("x.txt"), b"gr\xff\xfe\xc3\xbc\xc3\x9fe").unwrap();

        let docs = TextTreeLoader::new(dir.path(), "txt").load_all().unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, "grüße");
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempdir().unwrap();
        let err = TextTreeLoader::new(dir.path().join("absent"), "txt")
            .load_all()
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::MissingCorpus(_))
        ));
    }

    #[test]
    fn test_extension_is_a_name_suffix() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "ja").unwrap();
        fs::write(dir.path().join("a.txt.bak"), "nein").unwrap();
        fs::write(dir.path().join("atxt"), "nein").unwrap();

        let docs = TextTreeLoader::new(dir.path(), "txt").load_all().unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, "ja");
    }

    #[test]
    fn test_decode_lossy_keeps_valid_text() {
        assert_eq!(decode_lossy("Straße".as_bytes()), "Straße");
    }
}
