use docseek::embedding::{Embedder, HashEmbeddingProvider};
use docseek::storage::{Corpus, CorpusPaths, MetadataStore};
use docseek::{ChunkRecord, DocseekError, RetrievalEngine};
use std::sync::Arc;
use tempfile::TempDir;

fn ingest(paths: &CorpusPaths, records: Vec<ChunkRecord>) {
    let embedder = Embedder::new(Arc::new(HashEmbeddingProvider::new(4)));
    let engine = RetrievalEngine::open(paths.clone(), embedder).unwrap();
    engine.add_documents(records).unwrap();
}

fn records(n: usize) -> Vec<ChunkRecord> {
    (0..n)
        .map(|i| ChunkRecord::new(format!("doc_{}", i), format!("chunk number {}", i), "doc.txt"))
        .collect()
}

#[test]
fn test_fresh_directory_loads_empty() {
    let temp = TempDir::new().unwrap();
    let corpus = Corpus::load(&CorpusPaths::in_dir(temp.path())).unwrap();
    assert!(corpus.is_empty());
    assert_eq!(corpus.index.dimension(), None);
}

#[test]
fn test_index_without_metadata_is_corrupt() {
    let temp = TempDir::new().unwrap();
    let paths = CorpusPaths::in_dir(temp.path());
    ingest(&paths, records(2));

    std::fs::remove_file(&paths.metadata).unwrap();

    let err = Corpus::load(&paths).unwrap_err();
    assert!(err.is_corrupt_state(), "unexpected error: {}", err);
}

#[test]
fn test_metadata_without_index_is_corrupt() {
    let temp = TempDir::new().unwrap();
    let paths = CorpusPaths::in_dir(temp.path());
    ingest(&paths, records(2));

    std::fs::remove_file(&paths.index).unwrap();

    let err = Corpus::load(&paths).unwrap_err();
    assert!(err.is_corrupt_state());
}

#[test]
fn test_length_mismatch_is_corrupt() {
    let temp = TempDir::new().unwrap();
    let paths = CorpusPaths::in_dir(temp.path());
    ingest(&paths, records(3));

    // Simulate a crash after the index rename but before the metadata rename
    let mut short = MetadataStore::new();
    short.append(records(2));
    short.save(&paths.metadata).unwrap();

    let err = Corpus::load(&paths).unwrap_err();
    assert!(matches!(err, DocseekError::CorruptState { .. }));

    let embedder = Embedder::new(Arc::new(HashEmbeddingProvider::new(4)));
    assert!(RetrievalEngine::open(paths, embedder).is_err());
}

#[test]
fn test_flipped_index_byte_is_corrupt() {
    let temp = TempDir::new().unwrap();
    let paths = CorpusPaths::in_dir(temp.path());
    ingest(&paths, records(2));

    let mut bytes = std::fs::read(&paths.index).unwrap();
    bytes[20] ^= 0xFF;
    std::fs::write(&paths.index, bytes).unwrap();

    let err = Corpus::load(&paths).unwrap_err();
    assert!(err.is_corrupt_state());
}

#[test]
fn test_no_temp_files_left_behind() {
    let temp = TempDir::new().unwrap();
    let paths = CorpusPaths::in_dir(temp.path());
    ingest(&paths, records(5));

    let names: Vec<String> = std::fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();

    assert!(names.iter().all(|n| !n.ends_with(".tmp")), "{:?}", names);
    assert_eq!(names.len(), 2);
}

#[test]
fn test_appends_accumulate_across_sessions() {
    let temp = TempDir::new().unwrap();
    let paths = CorpusPaths::in_dir(temp.path());

    ingest(&paths, records(2));
    ingest(&paths, vec![ChunkRecord::new("late", "added later", "late.txt")]);

    let corpus = Corpus::load(&paths).unwrap();
    assert_eq!(corpus.index.len(), 3);
    assert_eq!(corpus.metadata.len(), 3);
    assert_eq!(corpus.metadata.get(2).unwrap().id, "late");
    assert_eq!(corpus.index.dimension(), Some(4));
}
