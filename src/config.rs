//! Configuration management for the role matcher

use crate::error::{Result, RoleMatcherError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub models: ModelConfig,
    pub embedding: EmbeddingConfig,
    pub processing: ProcessingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub path: PathBuf,
    pub title_column: String,
    pub description_column: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    pub default_embedding_model: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    Model2vec,
    Hashing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub backend: EmbeddingBackend,
    pub hashing_dimension: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    pub enable_caching: bool,
    /// Maximum number of texts held by the embedding cache.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    pub batch_size: usize,
}

fn default_cache_capacity() -> usize {
    1024
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".role-matcher")
            .join("models");

        Self {
            catalog: CatalogConfig {
                path: PathBuf::from("jobs.csv"),
                title_column: "Job Title".to_string(),
                description_column: "Job Description".to_string(),
            },
            models: ModelConfig {
                models_dir,
                default_embedding_model: "minishlab/potion-base-8M".to_string(),
            },
            embedding: EmbeddingConfig {
                backend: EmbeddingBackend::Model2vec,
                hashing_dimension: 256,
            },
            processing: ProcessingConfig {
                enable_caching: true,
                cache_capacity: default_cache_capacity(),
                batch_size: 32,
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults on first run.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| RoleMatcherError::Configuration(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| RoleMatcherError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("role-matcher")
            .join("config.toml")
    }

    fn validate(&self) -> Result<()> {
        if self.embedding.hashing_dimension == 0 {
            return Err(RoleMatcherError::Configuration(
                "embedding.hashing_dimension must be greater than zero".to_string(),
            ));
        }
        if self.processing.enable_caching && self.processing.cache_capacity == 0 {
            return Err(RoleMatcherError::Configuration(
                "processing.cache_capacity must be greater than zero when caching is enabled".to_string(),
            ));
        }
        if self.processing.batch_size == 0 {
            return Err(RoleMatcherError::Configuration(
                "processing.batch_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn models_dir(&self) -> &PathBuf {
        &self.models.models_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_first_load_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.catalog.title_column, "Job Title");
        assert_eq!(config.embedding.backend, EmbeddingBackend::Model2vec);

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.models.default_embedding_model, config.models.default_embedding_model);
    }

    #[test]
    fn test_rejects_zero_dimension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.embedding.hashing_dimension = 0;
        config.save_to(&path).unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(RoleMatcherError::Configuration(_))
        ));
    }

    #[test]
    fn test_cache_capacity_defaults_when_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let rendered = toml::to_string_pretty(&Config::default()).unwrap();
        let without_capacity: String = rendered
            .lines()
            .filter(|line| !line.starts_with("cache_capacity"))
            .map(|line| format!("{}\n", line))
            .collect();
        std::fs::write(&path, without_capacity).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.processing.cache_capacity, 1024);

        let mut config = Config::default();
        config.processing.cache_capacity = 0;
        config.save_to(&path).unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(RoleMatcherError::Configuration(_))
        ));
    }

    #[test]
    fn test_backend_serializes_lowercase() {
        let rendered = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(rendered.contains("backend = \"model2vec\""));
        assert!(rendered.contains("format = \"console\""));
    }
}
