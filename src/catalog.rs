//! Role catalog: job titles mapped to their canonical description

use crate::error::{Result, RoleMatcherError};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use strsim::jaro_winkler;

pub const TITLE_COLUMN: &str = "Job Title";
pub const DESCRIPTION_COLUMN: &str = "Job Description";

/// Minimum similarity for a "did you mean" hint on an unknown title.
const SUGGESTION_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleEntry {
    pub title: String,
    pub description: String,
}

/// Immutable after load. Titles are unique; the first occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct RoleCatalog {
    entries: Vec<RoleEntry>,
    index: HashMap<String, usize>,
}

impl RoleCatalog {
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_path_with_columns(path, TITLE_COLUMN, DESCRIPTION_COLUMN)
    }

    pub fn from_path_with_columns(path: &Path, title_column: &str, description_column: &str) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| {
            RoleMatcherError::Catalog(format!("Unable to open role catalog '{}': {}", path.display(), e))
        })?;
        let catalog = Self::from_reader(file, title_column, description_column)?;
        info!("Loaded {} roles from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn from_reader<R: Read>(reader: R, title_column: &str, description_column: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let column = |name: &str| {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                RoleMatcherError::Catalog(format!("Missing required column '{}'", name))
            })
        };
        let title_idx = column(title_column)?;
        let description_idx = column(description_column)?;

        let mut entries = Vec::new();
        let mut dropped = 0usize;
        for record in reader.records() {
            let record = record?;
            let title = record.get(title_idx).map(str::trim).unwrap_or_default();
            let description = record.get(description_idx).map(str::trim).unwrap_or_default();

            if title.is_empty() || description.is_empty() {
                dropped += 1;
                continue;
            }

            entries.push(RoleEntry {
                title: title.to_string(),
                description: description.to_string(),
            });
        }

        if dropped > 0 {
            warn!("Dropped {} catalog rows with an empty title or description", dropped);
        }

        Ok(Self::from_entries(entries))
    }

    /// Collapse duplicate titles to their first occurrence, keeping order.
    pub fn from_entries(entries: impl IntoIterator<Item = RoleEntry>) -> Self {
        let mut catalog = Self::default();
        for entry in entries {
            if catalog.index.contains_key(&entry.title) {
                continue;
            }
            catalog.index.insert(entry.title.clone(), catalog.entries.len());
            catalog.entries.push(entry);
        }
        catalog
    }

    /// Description for an exact title.
    pub fn lookup(&self, title: &str) -> Result<&str> {
        match self.index.get(title) {
            Some(&i) => Ok(&self.entries[i].description),
            None => Err(RoleMatcherError::NotFound {
                title: title.to_string(),
                suggestion: self.closest_title(title).map(str::to_string),
            }),
        }
    }

    pub fn contains(&self, title: &str) -> bool {
        self.index.contains_key(title)
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.title.as_str())
    }

    pub fn entries(&self) -> &[RoleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn closest_title(&self, title: &str) -> Option<&str> {
        let wanted = title.to_lowercase();
        self.titles()
            .map(|t| (t, jaro_winkler(&wanted, &t.to_lowercase())))
            .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(t, _)| t)
    }
}
