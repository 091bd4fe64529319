// ============================================================
// Layer 6 — ZIP Extraction
// ============================================================
// Unpacks an in-memory ZIP archive below a destination
// directory. Anything that is not a readable ZIP fails here,
// before a single file is written.

use anyhow::{Context, Result};
use std::{fs, io::Cursor, path::Path};
use zip::ZipArchive;

/// Extract every entry of `bytes` into `dest`. Returns the number
/// of file entries (directories not counted).
pub fn extract_zip(bytes: &[u8], dest: &Path) -> Result<usize> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .context("Downloaded body is not a valid ZIP archive")?;

    let files = archive.file_names().filter(|n| !n.ends_with('/')).count();

    fs::create_dir_all(dest)
        .with_context(|| format!("Cannot create '{}'", dest.display()))?;
    archive
        .extract(dest)
        .with_context(|| format!("Cannot extract archive into '{}'", dest.display()))?;

    tracing::info!("Extracted {} files into '{}'", files, dest.display());
    Ok(files)
}
