// ============================================================
// Layer 2 — FetchUseCase
// ============================================================
// Downloads the corpus archive once and merges it into a
// single normalized training file:
//
//   Step 1: Skip if <extract_to>/<target_dir> exists    (std::fs)
//   Step 2: Download the archive                        (Layer 6 - infra)
//   Step 3: Extract it into <extract_to>                (Layer 6 - infra)
//   Step 4: Walk + normalize every *.<extension> file   (Layer 4 - data)
//   Step 5: Write the merged text to <output>           (std::fs)
//
// Steps 2 and 3 never run when the directory is present, so a
// second invocation makes no network request at all.

use anyhow::{Context, Result};
use std::{fs, path::{Path, PathBuf}};

use crate::data::{loader::TextTreeLoader, preprocessor::Normalizer};
use crate::domain::traits::{ArchiveSource, DocumentSource};
use crate::infra::archive::extract_zip;

pub const DEFAULT_CORPUS_URL: &str =
    "https://github.com/codealltag/CodEAlltag_pXL_GERMAN/archive/refs/heads/master.zip";

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub url:        String,
    pub target_dir: String,
    pub extract_to: String,
    pub extension:  String,
    pub output:     String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            url:        DEFAULT_CORPUS_URL.to_string(),
            target_dir: "CodEAlltag_pXL_GERMAN-master".to_string(),
            extract_to: ".".to_string(),
            extension:  "txt".to_string(),
            output:     "training_data_alltag.txt".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The target directory existed, nothing was downloaded.
    AlreadyPresent,
    /// The archive was downloaded and `entries` files extracted.
    Extracted { entries: usize },
}

/// Downloads and unpacks an archive unless its directory is already there.
pub struct CorpusFetcher<S: ArchiveSource> {
    source: S,
}

impl<S: ArchiveSource> CorpusFetcher<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn fetch(&self, url: &str, extract_to: &Path, target_dir: &Path) -> Result<FetchOutcome> {
        if target_dir.exists() {
            tracing::info!("'{}' already exists, skipping download", target_dir.display());
            return Ok(FetchOutcome::AlreadyPresent);
        }

        let bytes   = self.source.fetch(url)?;
        let entries = extract_zip(&bytes, extract_to)?;
        Ok(FetchOutcome::Extracted { entries })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchReport {
    pub outcome:    FetchOutcome,
    pub file_count: usize,
    pub output:     PathBuf,
}

pub struct FetchUseCase<S: ArchiveSource> {
    config:  FetchConfig,
    fetcher: CorpusFetcher<S>,
}

impl<S: ArchiveSource> FetchUseCase<S> {
    pub fn new(config: FetchConfig, source: S) -> Self {
        Self { config, fetcher: CorpusFetcher::new(source) }
    }

    pub fn execute(&self) -> Result<FetchReport> {
        let cfg        = &self.config;
        let extract_to = Path::new(&cfg.extract_to);
        let target_dir = extract_to.join(&cfg.target_dir);

        // ── Steps 1-3: Download + extract (or skip) ───────────────────────────
        let outcome = self.fetcher.fetch(&cfg.url, extract_to, &target_dir)?;

        // ── Step 4: Merge ─────────────────────────────────────────────────────
        let docs   = TextTreeLoader::new(&target_dir, cfg.extension.as_str()).load_all()?;
        let merged = Normalizer::new().merge(&docs);

        // ── Step 5: Write ─────────────────────────────────────────────────────
        fs::write(&cfg.output, &merged.text)
            .with_context(|| format!("Cannot write '{}'", cfg.output))?;

        tracing::info!(
            "Merged {} files ({} chars) into '{}'",
            merged.file_count, merged.text.len(), cfg.output,
        );

        Ok(FetchReport {
            outcome,
            file_count: merged.file_count,
            output:     PathBuf::from(&cfg.output),
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::tempdir;

    use crate::infra::archive::tests::zip_bytes;

    /// Serves a fixed body and counts how often it was asked.
    struct CountingSource {
        body:     Vec<u8>,
        requests: Cell<usize>,
    }

    impl CountingSource {
        fn new(body: Vec<u8>) -> Self {
            Self { body, requests: Cell::new(0) }
        }
    }

    impl ArchiveSource for &CountingSource {
        fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
            self.requests.set(self.requests.get() + 1);
            Ok(self.body.clone())
        }
    }

    fn config(root: &Path) -> FetchConfig {
        FetchConfig {
            url:        "https://example.invalid/corpus.zip".to_string(),
            target_dir: "corpus-master".to_string(),
            extract_to: root.display().to_string(),
            extension:  "txt".to_string(),
            output:     root.join("merged.txt").display().to_string(),
        }
    }

    #[test]
    fn test_first_run_downloads_extracts_and_merges() {
        let dir    = tempdir().unwrap();
        let source = CountingSource::new(zip_bytes(&[
            ("corpus-master/a/1.txt", "Hallo, Welt!"),
            ("corpus-master/b/2.txt", "Grüße aus Köln 42"),
            ("corpus-master/README.md", "not a corpus file"),
        ]));

        let report = FetchUseCase::new(config(dir.path()), &source).execute().unwrap();

        assert_eq!(source.requests.get(), 1);
        assert_eq!(report.outcome, FetchOutcome::Extracted { entries: 3 });
        assert_eq!(report.file_count, 2);
        assert_eq!(
            fs::read_to_string(dir.path().join("merged.txt")).unwrap(),
            "hallo welt\ngrüße aus köln"
        );
    }

    #[test]
    fn test_second_run_makes_no_request() {
        let dir    = tempdir().unwrap();
        let source = CountingSource::new(zip_bytes(&[("corpus-master/1.txt", "eins")]));

        FetchUseCase::new(config(dir.path()), &source).execute().unwrap();
        let again = FetchUseCase::new(config(dir.path()), &source).execute().unwrap();

        assert_eq!(source.requests.get(), 1);
        assert_eq!(again.outcome, FetchOutcome::AlreadyPresent);
        assert_eq!(again.file_count, 1);
    }

    #[test]
    fn test_existing_directory_is_never_downloaded() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("corpus-master")).unwrap();
        let source = CountingSource::new(Vec::new());

        let report = FetchUseCase::new(config(dir.path()), &source).execute().unwrap();
        assert_eq!(source.requests.get(), 0);
        assert_eq!(report.file_count, 0);
    }

    #[test]
    fn test_non_zip_body_aborts() {
        let dir    = tempdir().unwrap();
        let source = CountingSource::new(b"<html>404</html>".to_vec());
        assert!(FetchUseCase::new(config(dir.path()), &source).execute().is_err());
        assert!(!dir.path().join("merged.txt").exists());
    }
}
