use docseek::config::Settings;
use docseek::DocseekError;
use tempfile::TempDir;

#[test]
fn test_saved_config_loads_back() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");

    let mut settings = Settings::with_data_dir(temp.path().join("data"));
    settings.chunking.size = 120;
    settings.chunking.overlap = 30;
    settings.embedding.backend = "hash".to_string();
    settings.save(&path).unwrap();

    let loaded = Settings::load(&path).unwrap();
    assert_eq!(loaded.chunking.size, 120);
    assert_eq!(loaded.chunking.overlap, 30);
    assert_eq!(loaded.embedding.backend, "hash");
    assert_eq!(
        loaded.storage.index_path(),
        temp.path().join("data").join("vectorstore/index.bin")
    );
}

#[test]
fn test_missing_config_file() {
    let temp = TempDir::new().unwrap();
    let err = Settings::load(&temp.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, DocseekError::ConfigNotFound { .. }));
}

#[test]
fn test_invalid_values_rejected_on_load() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");

    let mut settings = Settings::with_data_dir(temp.path());
    settings.chunking.size = 0;
    settings.embedding.backend = "word2vec".to_string();
    settings.save(&path).unwrap();

    match Settings::load(&path).unwrap_err() {
        DocseekError::ConfigValidation { errors } => {
            let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
            assert!(paths.contains(&"chunking.size"));
            assert!(paths.contains(&"embedding.backend"));
        }
        other => panic!("expected validation failure, got {}", other),
    }
}

#[test]
fn test_malformed_toml_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(&path, "[chunking\nsize = ").unwrap();

    let err = Settings::load(&path).unwrap_err();
    assert!(matches!(err, DocseekError::Toml(_)));
}
