//! Storage layer for docseek
//!
//! A corpus is persisted as two artifacts that are only ever loaded and saved
//! together: the vector index and the chunk metadata.

pub mod metadata;

use crate::config::StorageConfig;
use crate::error::{DocseekError, Result};
use crate::index::VectorIndex;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub use metadata::MetadataStore;

/// Locations of the paired corpus artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusPaths {
    pub index: PathBuf,
    pub metadata: PathBuf,
}

impl CorpusPaths {
    pub fn new(index: impl Into<PathBuf>, metadata: impl Into<PathBuf>) -> Self {
        Self {
            index: index.into(),
            metadata: metadata.into(),
        }
    }

    /// `index.bin` and `metadata.json` inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join("index.bin"), dir.join("metadata.json"))
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.index_path(), config.metadata_path())
    }
}

/// Vector index plus the metadata rows it is aligned with
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    pub index: VectorIndex,
    pub metadata: MetadataStore,
}

impl Corpus {
    /// Load both artifacts.
    ///
    /// Neither present gives an empty corpus. One without the other, or a
    /// row count that differs from the record count, is `CorruptState`.
    pub fn load(paths: &CorpusPaths) -> Result<Self> {
        let corpus = match (paths.index.exists(), paths.metadata.exists()) {
            (false, false) => {
                debug!("No corpus artifacts at {}, starting empty", paths.index.display());
                return Ok(Self::default());
            }
            (true, false) => {
                return Err(DocseekError::corrupt(
                    &paths.metadata,
                    "metadata artifact missing while index artifact exists",
                ))
            }
            (false, true) => {
                return Err(DocseekError::corrupt(
                    &paths.index,
                    "index artifact missing while metadata artifact exists",
                ))
            }
            (true, true) => Self {
                index: VectorIndex::load(&paths.index)?,
                metadata: MetadataStore::load(&paths.metadata)?,
            },
        };

        if corpus.index.len() != corpus.metadata.len() {
            warn!(
                "Refusing corpus: {} index rows vs {} metadata records",
                corpus.index.len(),
                corpus.metadata.len()
            );
            return Err(DocseekError::corrupt(
                &paths.metadata,
                format!(
                    "index holds {} rows but metadata holds {} records",
                    corpus.index.len(),
                    corpus.metadata.len()
                ),
            ));
        }

        info!(
            "Loaded corpus: {} rows, dimension {:?}",
            corpus.len(),
            corpus.index.dimension()
        );
        Ok(corpus)
    }

    /// Save index first, then metadata.
    ///
    /// A crash between the two renames leaves a new index beside old
    /// metadata; [`Corpus::load`] reports that as a length mismatch.
    pub fn save(&self, paths: &CorpusPaths) -> Result<()> {
        self.index.save(&paths.index)?;
        self.metadata.save(&paths.metadata)?;
        debug!("Persisted corpus of {} rows", self.len());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Undo appends past `rows` in both halves
    pub(crate) fn truncate(&mut self, rows: usize) {
        self.index.truncate(rows);
        self.metadata.truncate(rows);
    }
}

/// Write `bytes` to a sibling temp file, fsync it, then rename over `path`
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| DocseekError::Io {
        source: e,
        context: format!("Failed to create directory: {}", parent.display()),
    })?;

    let file_name = path
        .file_name()
        .ok_or_else(|| DocseekError::Config(format!("Invalid artifact path: {}", path.display())))?;
    let mut temp_name = file_name.to_os_string();
    temp_name.push(".tmp");
    let temp_path = parent.join(temp_name);

    let result = write_and_rename(&temp_path, path, bytes);
    if result.is_err() && temp_path.exists() {
        if let Err(e) = fs::remove_file(&temp_path) {
            warn!("Failed to remove temp file {}: {}", temp_path.display(), e);
        }
    }
    result
}

fn write_and_rename(temp_path: &Path, path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = fs::File::create(temp_path).map_err(|e| DocseekError::Io {
        source: e,
        context: format!("Failed to create temp file: {}", temp_path.display()),
    })?;
    file.write_all(bytes).map_err(|e| DocseekError::Io {
        source: e,
        context: format!("Failed to write temp file: {}", temp_path.display()),
    })?;
    file.sync_all().map_err(|e| DocseekError::Io {
        source: e,
        context: format!("Failed to sync temp file: {}", temp_path.display()),
    })?;
    drop(file);

    fs::rename(temp_path, path).map_err(|e| DocseekError::Io {
        source: e,
        context: format!(
            "Failed to rename {} -> {}",
            temp_path.display(),
            path.display()
        ),
    })
}
