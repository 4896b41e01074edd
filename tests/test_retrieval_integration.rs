//! Retrieval integration tests
//!
//! Drives the engine end to end with the deterministic hash embedder, so no
//! model download is needed.

use docseek::config::Settings;
use docseek::embedding::{Embedder, HashEmbeddingProvider};
use docseek::storage::CorpusPaths;
use docseek::{chunk_text, ChunkRecord, DocseekError, RetrievalEngine};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn hash_engine(dir: &TempDir) -> RetrievalEngine {
    let embedder = Embedder::new(Arc::new(HashEmbeddingProvider::new(8)));
    RetrievalEngine::open(CorpusPaths::in_dir(dir.path()), embedder).unwrap()
}

fn manual_records() -> Vec<ChunkRecord> {
    vec![
        ChunkRecord::new("manual_0", "Prime the pump before the first start", "manual.txt"),
        ChunkRecord::new("manual_1", "Replace the intake filter every spring", "manual.txt"),
        ChunkRecord::new("manual_2", "Store the unit somewhere dry in winter", "manual.txt"),
        ChunkRecord::new("faq_0", "Warranty covers parts for two years", "faq.txt"),
    ]
}

#[test]
fn test_results_survive_restart() {
    let temp = TempDir::new().unwrap();

    let before = {
        let engine = hash_engine(&temp);
        assert_eq!(engine.add_documents(manual_records()).unwrap(), 4);
        engine.search("intake filter", 3).unwrap()
    };
    assert_eq!(before.len(), 3);

    let engine = hash_engine(&temp);
    assert_eq!(engine.len().unwrap(), 4);
    let after = engine.search("intake filter", 3).unwrap();

    assert_eq!(before, after);
    for pair in after.windows(2) {
        assert!(pair[0].distance <= pair[1].distance);
    }
}

#[test]
fn test_duplicate_text_collapses_to_one_hit() {
    let temp = TempDir::new().unwrap();
    let engine = hash_engine(&temp);

    engine
        .add_documents(vec![
            ChunkRecord::new("a", "the quick fox", "one.txt"),
            ChunkRecord::new("b", "the   quick  fox", "two.txt"),
        ])
        .unwrap();

    let hits = engine.search("the quick fox", 2).unwrap();
    assert_eq!(hits.len(), 1);
}

#[test]
fn test_duplicate_id_collapses_to_one_hit() {
    let temp = TempDir::new().unwrap();
    let engine = hash_engine(&temp);

    engine
        .add_documents(vec![ChunkRecord::new("same", "first text", "x.txt")])
        .unwrap();
    engine
        .add_documents(vec![ChunkRecord::new("same", "second text", "x.txt")])
        .unwrap();

    assert_eq!(engine.len().unwrap(), 2);
    let hits = engine.search("text", 5).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].record.id, "same");
}

#[test]
fn test_k_larger_than_corpus_returns_everything() {
    let temp = TempDir::new().unwrap();
    let engine = hash_engine(&temp);
    engine.add_documents(manual_records()).unwrap();

    let hits = engine.search("warranty", 50).unwrap();
    assert_eq!(hits.len(), 4);
}

#[test]
fn test_empty_corpus_returns_nothing() {
    let temp = TempDir::new().unwrap();
    let engine = hash_engine(&temp);

    assert!(engine.search("anything", 3).unwrap().is_empty());
    assert!(!CorpusPaths::in_dir(temp.path()).index.exists());
}

#[test]
fn test_empty_batch_leaves_artifacts_untouched() {
    let temp = TempDir::new().unwrap();
    let engine = hash_engine(&temp);
    engine.add_documents(manual_records()).unwrap();

    let paths = engine.paths().clone();
    let index_bytes = std::fs::read(&paths.index).unwrap();
    let metadata_bytes = std::fs::read(&paths.metadata).unwrap();

    assert_eq!(engine.add_documents(Vec::new()).unwrap(), 0);

    assert_eq!(std::fs::read(&paths.index).unwrap(), index_bytes);
    assert_eq!(std::fs::read(&paths.metadata).unwrap(), metadata_bytes);
}

#[test]
fn test_missing_backend_is_reported() {
    let temp = TempDir::new().unwrap();
    let engine =
        RetrievalEngine::open(CorpusPaths::in_dir(temp.path()), Embedder::unavailable()).unwrap();

    let err = engine.search("pump", 3).unwrap_err();
    assert!(matches!(err, DocseekError::BackendUnavailable(_)));

    let err = engine
        .add_documents(vec![ChunkRecord::new("a", "text", "a.txt")])
        .unwrap_err();
    assert!(matches!(err, DocseekError::BackendUnavailable(_)));
    assert!(engine.is_empty().unwrap());
}

#[test]
fn test_engine_from_settings_with_hash_backend() {
    let temp = TempDir::new().unwrap();
    let mut settings = Settings::with_data_dir(temp.path());
    settings.embedding.backend = "hash".to_string();

    let engine = RetrievalEngine::from_settings(&settings).unwrap();
    engine.add_documents(manual_records()).unwrap();

    assert!(settings.storage.index_path().exists());
    assert!(settings.storage.metadata_path().exists());

    let stats = engine.stats().unwrap();
    assert_eq!(stats.rows, 4);
    assert_eq!(stats.records, 4);
    assert_eq!(stats.dimension, Some(settings.embedding.hash_dimension));
    assert_eq!(stats.sources, 2);
}

#[test]
fn test_chunked_document_is_searchable() {
    let temp = TempDir::new().unwrap();
    let engine = hash_engine(&temp);

    let text = "0 1 2 3 4 5 6 7 8 9";
    let chunks = chunk_text(text, 4, 1).unwrap();
    assert_eq!(chunks, vec!["0 1 2 3", "3 4 5 6", "6 7 8 9"]);

    let records = docseek::chunking::chunk_document("digits.txt", text, 4, 1).unwrap();
    assert_eq!(records[2].id, "digits_2");
    assert_eq!(engine.add_documents(records).unwrap(), 3);

    let hits = engine.search("3 4 5 6", 1).unwrap();
    assert_eq!(hits[0].record.text, "3 4 5 6");
    assert_eq!(hits[0].distance, 0.0);
}

#[test]
fn test_concurrent_ingest_and_search() {
    let temp = TempDir::new().unwrap();
    let engine = Arc::new(hash_engine(&temp));

    let writers: Vec<_> = (0..4)
        .map(|w| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for batch in 0..5 {
                    let records = (0..3)
                        .map(|i| {
                            ChunkRecord::new(
                                format!("w{}_b{}_{}", w, batch, i),
                                format!("writer {} batch {} chunk {}", w, batch, i),
                                format!("w{}.txt", w),
                            )
                        })
                        .collect();
                    engine.add_documents(records).unwrap();
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for _ in 0..20 {
                    let stats = engine.stats().unwrap();
                    assert_eq!(stats.rows, stats.records);
                    let hits = engine.search("writer batch chunk", 3).unwrap();
                    assert!(hits.len() <= 3);
                }
            })
        })
        .collect();

    for handle in writers.into_iter().chain(readers) {
        handle.join().unwrap();
    }

    assert_eq!(engine.len().unwrap(), 60);

    let reopened = hash_engine(&temp);
    let stats = reopened.stats().unwrap();
    assert_eq!(stats.rows, 60);
    assert_eq!(stats.records, 60);
    assert_eq!(stats.sources, 4);
}
