use crate::config::{Settings, SCHEMA_VERSION};
use crate::error::{DocseekError, Result, ValidationError};

/// Embedding backends the engine knows how to build
pub const EMBEDDING_BACKENDS: [&str; 3] = ["fastembed", "hash", "none"];

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(settings: &Settings) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(settings, &mut errors);
        Self::validate_storage(settings, &mut errors);
        Self::validate_chunking(settings, &mut errors);
        Self::validate_embedding(settings, &mut errors);
        Self::validate_retrieval(settings, &mut errors);
        Self::validate_answer(settings, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DocseekError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(settings: &Settings, errors: &mut Vec<ValidationError>) {
        let version = &settings.meta.schema_version;
        if version != SCHEMA_VERSION {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_storage(settings: &Settings, errors: &mut Vec<ValidationError>) {
        if settings.storage.index_file.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "storage.index_file",
                "Index artifact path cannot be empty",
            ));
        }

        if settings.storage.metadata_file.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "storage.metadata_file",
                "Metadata artifact path cannot be empty",
            ));
        }

        if settings.storage.index_path() == settings.storage.metadata_path() {
            errors.push(ValidationError::new(
                "storage.metadata_file",
                "Index and metadata artifacts must be different files",
            ));
        }
    }

    fn validate_chunking(settings: &Settings, errors: &mut Vec<ValidationError>) {
        // overlap >= size is clamped by the chunker, not rejected
        if settings.chunking.size == 0 {
            errors.push(ValidationError::new(
                "chunking.size",
                "Chunk size must be greater than 0",
            ));
        }
    }

    fn validate_embedding(settings: &Settings, errors: &mut Vec<ValidationError>) {
        let backend = &settings.embedding.backend;
        if !EMBEDDING_BACKENDS.contains(&backend.as_str()) {
            errors.push(ValidationError::new(
                "embedding.backend",
                format!(
                    "Backend must be one of {:?}, got '{}'",
                    EMBEDDING_BACKENDS, backend
                ),
            ));
        }

        if settings.embedding.batch_size == 0 {
            errors.push(ValidationError::new(
                "embedding.batch_size",
                "Batch size must be greater than 0",
            ));
        }

        if settings.embedding.model.is_empty() {
            errors.push(ValidationError::new(
                "embedding.model",
                "Model name cannot be empty",
            ));
        }

        if backend == "hash" && settings.embedding.hash_dimension == 0 {
            errors.push(ValidationError::new(
                "embedding.hash_dimension",
                "Hash embedding dimension must be greater than 0",
            ));
        }
    }

    fn validate_retrieval(settings: &Settings, errors: &mut Vec<ValidationError>) {
        if settings.retrieval.top_k == 0 {
            errors.push(ValidationError::new(
                "retrieval.top_k",
                "top_k must be greater than 0",
            ));
        }

        if settings.retrieval.overfetch_factor == 0 {
            errors.push(ValidationError::new(
                "retrieval.overfetch_factor",
                "Overfetch factor must be at least 1",
            ));
        }
    }

    fn validate_answer(settings: &Settings, errors: &mut Vec<ValidationError>) {
        if settings.answer.max_context_tokens == 0 {
            errors.push(ValidationError::new(
                "answer.max_context_tokens",
                "Context token budget must be greater than 0",
            ));
        }
    }
}
