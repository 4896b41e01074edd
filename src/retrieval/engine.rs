//! Retrieval engine: ingestion (embed, index, persist) and query (embed, search, dedup)

use crate::chunking::ChunkRecord;
use crate::config::Settings;
use crate::embedding::Embedder;
use crate::error::{DocseekError, Result};
use crate::retrieval::{CorpusStats, Deduplicator, SearchHit};
use crate::storage::{Corpus, CorpusPaths};
use ahash::AHashSet;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

const DEFAULT_OVERFETCH_FACTOR: usize = 2;

/// Owns one corpus and the embedder used to read and write it.
///
/// Ingestion holds the write lock across index insert, metadata append and
/// persistence; queries hold the read lock across search and lookup, so a
/// reader always sees matching row and record counts.
pub struct RetrievalEngine {
    embedder: Embedder,
    paths: CorpusPaths,
    corpus: RwLock<Corpus>,
    overfetch_factor: usize,
}

impl RetrievalEngine {
    /// Load the corpus at `paths` (or start empty) and attach `embedder`
    pub fn open(paths: CorpusPaths, embedder: Embedder) -> Result<Self> {
        let corpus = Corpus::load(&paths)?;
        if let (Some(dim), true) = (corpus.index.dimension(), embedder.is_available()) {
            if dim != embedder.dimension() {
                warn!(
                    "Corpus dimension {} differs from embedder dimension {}; ingestion and search will fail",
                    dim,
                    embedder.dimension()
                );
            }
        }

        Ok(Self {
            embedder,
            paths,
            corpus: RwLock::new(corpus),
            overfetch_factor: DEFAULT_OVERFETCH_FACTOR,
        })
    }

    /// Build the embedder and artifact paths from settings, then open
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let embedder = Embedder::from_config(&settings.embedding)?;
        let paths = CorpusPaths::from_config(&settings.storage);
        Ok(Self::open(paths, embedder)?.with_overfetch_factor(settings.retrieval.overfetch_factor))
    }

    pub fn with_overfetch_factor(mut self, factor: usize) -> Self {
        self.overfetch_factor = factor.max(1);
        self
    }

    /// Embed, index, and persist `chunks` as one batch.
    ///
    /// Returns the number of rows added. Chunks whose text is blank are
    /// skipped so every index row keeps a metadata record. An empty batch
    /// touches nothing on disk. If persisting fails, the in-memory corpus is
    /// rolled back to its previous length before the error is returned.
    pub fn add_documents(&self, chunks: Vec<ChunkRecord>) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let submitted = chunks.len();
        let chunks: Vec<ChunkRecord> = chunks
            .into_iter()
            .filter(|c| !c.text.trim().is_empty())
            .collect();
        if chunks.len() < submitted {
            debug!("Skipped {} blank chunks", submitted - chunks.len());
        }
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedder.embed(&texts)?;
        if embeddings.nrows() == 0 {
            return Ok(0);
        }
        if embeddings.nrows() != chunks.len() {
            return Err(DocseekError::Other(anyhow::anyhow!(
                "embedder returned {} rows for {} chunks",
                embeddings.nrows(),
                chunks.len()
            )));
        }

        let mut corpus = self.write()?;
        let before = corpus.len();

        let added = corpus.index.insert(embeddings.view())?;
        corpus.metadata.append(chunks);

        if let Err(e) = corpus.save(&self.paths) {
            warn!("Persisting corpus failed, rolling back {} rows: {}", added, e);
            corpus.truncate(before);
            return Err(e);
        }

        info!("Indexed {} chunks ({} total)", added, corpus.len());
        Ok(added)
    }

    /// The `k` closest distinct chunks to `query`, closest first.
    ///
    /// Fails with `BackendUnavailable` when no embedder is configured, even
    /// on an empty corpus, so "no backend" is never reported as "no match".
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        if k == 0 {
            return Err(DocseekError::invalid_config("k must be positive"));
        }
        if !self.embedder.is_available() {
            return Err(DocseekError::BackendUnavailable(
                "cannot embed query without an embedding backend".to_string(),
            ));
        }
        if self.read()?.is_empty() {
            return Ok(Vec::new());
        }

        let query_matrix = self.embedder.embed(&[query])?;
        if query_matrix.nrows() == 0 {
            return Ok(Vec::new());
        }

        let corpus = self.read()?;
        let candidates = corpus
            .index
            .search(query_matrix.row(0), k.saturating_mul(self.overfetch_factor))?;

        let mut dedup = Deduplicator::new();
        let mut hits = Vec::with_capacity(k.min(candidates.len()));
        for candidate in candidates {
            let Some(record) = corpus.metadata.get(candidate.row) else {
                continue;
            };
            if !dedup.admit(record) {
                continue;
            }
            hits.push(SearchHit {
                record: record.clone(),
                distance: candidate.distance,
            });
            if hits.len() >= k {
                break;
            }
        }

        debug!("Query returned {} hits (k={})", hits.len(), k);
        Ok(hits)
    }

    /// Row count, dimension and distinct sources, read as one snapshot
    pub fn stats(&self) -> Result<CorpusStats> {
        let corpus = self.read()?;
        let sources: AHashSet<&str> = corpus.metadata.iter().map(|r| r.source.as_str()).collect();
        Ok(CorpusStats {
            rows: corpus.index.len(),
            records: corpus.metadata.len(),
            dimension: corpus.index.dimension(),
            sources: sources.len(),
        })
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    pub fn paths(&self) -> &CorpusPaths {
        &self.paths
    }

    pub fn embedder(&self) -> &Embedder {
        &self.embedder
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Corpus>> {
        self.corpus
            .read()
            .map_err(|_| DocseekError::Other(anyhow::anyhow!("corpus lock poisoned")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Corpus>> {
        self.corpus
            .write()
            .map_err(|_| DocseekError::Other(anyhow::anyhow!("corpus lock poisoned")))
    }
}
