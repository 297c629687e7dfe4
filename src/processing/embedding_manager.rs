//! Embedding model management for downloading and locating Model2Vec models

use crate::config::Config;
use crate::error::{Result, RoleMatcherError};
use hf_hub::api::tokio::Api;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Files `StaticModel::from_pretrained` needs in a local model directory.
const REQUIRED_FILES: [&str; 3] = ["tokenizer.json", "model.safetensors", "config.json"];
const OPTIONAL_FILES: [&str; 1] = ["README.md"];

/// Information about an available embedding model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingModelInfo {
    pub id: String,
    pub name: String,
    pub repo_id: String,
    pub size_mb: u64,
    pub description: String,
    pub dimensions: u32,
}

/// Models the CLI knows how to fetch by short id.
pub fn known_models() -> Vec<EmbeddingModelInfo> {
    vec![
        EmbeddingModelInfo {
            id: "potion-base-8M".to_string(),
            name: "Potion Base 8M".to_string(),
            repo_id: "minishlab/potion-base-8M".to_string(),
            size_mb: 33,
            description: "Recommended default, good quality at a small size".to_string(),
            dimensions: 256,
        },
        EmbeddingModelInfo {
            id: "potion-base-32M".to_string(),
            name: "Potion Base 32M".to_string(),
            repo_id: "minishlab/potion-base-32M".to_string(),
            size_mb: 130,
            description: "Larger Potion model for higher accuracy".to_string(),
            dimensions: 512,
        },
        EmbeddingModelInfo {
            id: "m2v-base".to_string(),
            name: "Model2Vec Base".to_string(),
            repo_id: "minishlab/M2V_base_output".to_string(),
            size_mb: 90,
            description: "Legacy Model2Vec base embeddings model".to_string(),
            dimensions: 256,
        },
    ]
}

/// Resolve a short id, repo id or display name to a known model.
pub fn resolve_model(input: &str) -> Option<EmbeddingModelInfo> {
    let input_lower = input.to_lowercase();
    known_models().into_iter().find(|m| {
        m.id == input || m.repo_id == input || m.name.to_lowercase() == input_lower
    })
}

/// Where `StaticModel` should load the configured model from: an explicit
/// path, a downloaded copy under the models directory, or the hub id itself.
pub fn resolve_model_path(config: &Config) -> PathBuf {
    let configured = &config.models.default_embedding_model;

    let explicit = Path::new(configured);
    if explicit.is_dir() {
        return explicit.to_path_buf();
    }

    if let Some(info) = resolve_model(configured) {
        let local = config.models_dir().join(&info.id);
        if has_required_files(&local) {
            return local;
        }
        return PathBuf::from(info.repo_id);
    }

    PathBuf::from(configured)
}

fn has_required_files(dir: &Path) -> bool {
    REQUIRED_FILES.iter().all(|f| dir.join(f).is_file())
}

/// Manager for embedding models - handles download and discovery
pub struct EmbeddingModelManager {
    models_dir: PathBuf,
    downloaded_models: HashSet<String>,
}

impl EmbeddingModelManager {
    pub async fn new(models_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&models_dir).await.map_err(|e| {
            RoleMatcherError::ModelError(format!("Failed to create models directory: {}", e))
        })?;

        let mut manager = Self {
            models_dir,
            downloaded_models: HashSet::new(),
        };
        manager.scan_downloaded_models().await?;

        Ok(manager)
    }

    async fn scan_downloaded_models(&mut self) -> Result<()> {
        let mut entries = fs::read_dir(&self.models_dir).await.map_err(|e| {
            RoleMatcherError::ModelError(format!("Failed to scan models directory: {}", e))
        })?;

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() && has_required_files(&entry.path()) {
                self.downloaded_models
                    .insert(entry.file_name().to_string_lossy().to_string());
            }
        }

        Ok(())
    }

    /// Download a known model from the Hugging Face Hub.
    pub async fn download_model(&mut self, model: &str, force: bool) -> Result<PathBuf> {
        let info = resolve_model(model)
            .ok_or_else(|| RoleMatcherError::ModelError(format!("Unknown embedding model: {}", model)))?;

        let model_dir = self.models_dir.join(&info.id);
        if !force && self.downloaded_models.contains(&info.id) {
            return Ok(model_dir);
        }

        println!("📥 Downloading embedding model: {} ({} MB)", info.name, info.size_mb);
        println!("📁 Repository: {}", info.repo_id);

        fs::create_dir_all(&model_dir).await?;

        let api = Api::new()
            .map_err(|e| RoleMatcherError::ModelError(format!("Failed to initialize HF API: {}", e)))?;
        let repo = api.repo(hf_hub::Repo::model(info.repo_id.clone()));

        for file in REQUIRED_FILES.iter().chain(OPTIONAL_FILES.iter()) {
            match repo.get(file).await {
                Ok(cached_path) => {
                    fs::copy(&cached_path, model_dir.join(file)).await.map_err(|e| {
                        RoleMatcherError::ModelError(format!("Failed to copy {}: {}", file, e))
                    })?;
                    println!("  ✅ Downloaded: {}", file);
                }
                Err(e) if OPTIONAL_FILES.contains(file) => {
                    println!("  ⚠️  Optional file {} not found: {}", file, e);
                }
                Err(e) => {
                    return Err(RoleMatcherError::ModelError(format!(
                        "Failed to download required file {}: {}",
                        file, e
                    )));
                }
            }
        }

        self.downloaded_models.insert(info.id.clone());
        info!("Embedding model {} stored in {}", info.id, model_dir.display());
        Ok(model_dir)
    }

    pub fn is_model_downloaded(&self, model: &str) -> bool {
        resolve_model(model)
            .map(|info| self.downloaded_models.contains(&info.id))
            .unwrap_or_else(|| self.downloaded_models.contains(model))
    }

    pub fn get_model_path(&self, model: &str) -> Option<PathBuf> {
        let id = resolve_model(model).map(|info| info.id).unwrap_or_else(|| model.to_string());
        if self.downloaded_models.contains(&id) {
            Some(self.models_dir.join(id))
        } else {
            None
        }
    }

    pub fn list_downloaded_models(&self) -> Vec<String> {
        let mut models: Vec<String> = self.downloaded_models.iter().cloned().collect();
        models.sort();
        models
    }
}
