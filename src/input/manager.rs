//! Input manager for handling different file types

use crate::error::{Result, RoleMatcherError};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::DocumentExtractor;
use log::{debug, info};
use std::collections::HashMap;
use std::path::Path;

pub struct InputManager {
    extractor: DocumentExtractor,
    cache: HashMap<String, String>,
    enable_cache: bool,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            extractor: DocumentExtractor::new(),
            cache: HashMap::new(),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    /// Extract the text of a document on disk.
    ///
    /// Blank output is not an error here; callers decide whether an empty
    /// document is acceptable.
    pub async fn extract_text(&mut self, path: &Path) -> Result<String> {
        let path_str = path.to_string_lossy().to_string();

        if self.enable_cache {
            if let Some(cached_text) = self.cache.get(&path_str) {
                debug!("Using cached text for: {}", path.display());
                return Ok(cached_text.clone());
            }
        }

        if !path.exists() {
            return Err(RoleMatcherError::InputValidation(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let file_type = FileType::from_path(path).ok_or_else(|| {
            RoleMatcherError::InputValidation(format!("File has no extension: {}", path.display()))
        })?;
        if file_type == FileType::Unknown {
            return Err(RoleMatcherError::UnsupportedFormat(format!(
                "Unsupported file type for: {}",
                path.display()
            )));
        }

        info!("Extracting {:?} text from: {}", file_type, path.display());
        let bytes = tokio::fs::read(path).await?;
        let text = self.extractor.extract(file_type, bytes).await?;

        if self.enable_cache {
            self.cache.insert(path_str, text.clone());
        }

        Ok(text)
    }

    /// Extract text from an uploaded document held in memory.
    pub async fn extract_upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String> {
        if bytes.is_empty() {
            return Err(RoleMatcherError::InputValidation(format!(
                "Uploaded file '{}' is empty",
                file_name
            )));
        }

        let file_type = FileType::from_path(Path::new(file_name)).unwrap_or(FileType::Unknown);
        self.extractor.extract(file_type, bytes).await
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
