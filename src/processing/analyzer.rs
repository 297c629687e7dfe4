//! Matching service combining the catalog, embeddings, keyword gaps and recommendations

use crate::catalog::RoleCatalog;
use crate::error::{Result, RoleMatcherError};
use crate::input::InputManager;
use crate::processing::embeddings::Embedder;
use crate::processing::recommendations::RecommendationEngine;
use crate::processing::similarity::{fit_score, raw_percentage};
use crate::processing::skill_gap::gap;
use crate::processing::text_processor::{ExtractedResume, TextProcessor};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;

/// Full outcome of one analyze call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Fit score in `[0, 100]`, two decimals.
    pub score: f64,
    pub role: String,
    pub missing_skills: Vec<String>,
    pub improvements: Vec<String>,
    pub projects: Vec<String>,
}

/// The analyze response body handed back to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub score: f64,
    pub role: String,
    pub improvements: Vec<String>,
    pub projects: Vec<String>,
}

impl From<MatchResult> for AnalyzeResponse {
    fn from(result: MatchResult) -> Self {
        Self {
            score: result.score,
            role: result.role,
            improvements: result.improvements,
            projects: result.projects,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRanking {
    pub role: String,
    pub score: f64,
    /// Plain cosine percentage, for comparison with the fit score.
    pub raw_similarity: f64,
}

/// Built once at startup and shared by every request.
pub struct RoleMatcher {
    catalog: RoleCatalog,
    embedder: Box<dyn Embedder>,
    text_processor: TextProcessor,
    recommendations: RecommendationEngine,
}

impl RoleMatcher {
    pub fn new(catalog: RoleCatalog, embedder: Box<dyn Embedder>) -> Result<Self> {
        Ok(Self {
            catalog,
            embedder,
            text_processor: TextProcessor::new(),
            recommendations: RecommendationEngine::new()?,
        })
    }

    pub fn catalog(&self) -> &RoleCatalog {
        &self.catalog
    }

    pub fn roles(&self) -> Vec<&str> {
        self.catalog.titles().collect()
    }

    pub fn model_name(&self) -> &str {
        self.embedder.model_name()
    }

    /// Score a resume against one catalog role.
    pub fn analyze(&self, role: &str, resume_text: &str) -> Result<MatchResult> {
        let start_time = Instant::now();

        if role.trim().is_empty() {
            return Err(RoleMatcherError::InputValidation("no role selected".to_string()));
        }
        let description = self.catalog.lookup(role)?;
        let resume = ExtractedResume::from_text(&self.text_processor, resume_text)?;

        let vectors = self
            .embedder
            .embed_batch(&[resume.raw_text.clone(), description.to_string()])?;
        let [resume_vector, role_vector] = vectors.as_slice() else {
            return Err(RoleMatcherError::ComputeFailure(format!(
                "expected 2 embeddings, got {}",
                vectors.len()
            )));
        };
        let score = fit_score(resume_vector, role_vector)?;

        let role_keywords = self.text_processor.keywords(description);
        let missing_skills = gap(&role_keywords, &resume.normalized_keywords);
        let recommendations = self.recommendations.recommend(role, &missing_skills, score);

        debug!(
            "Analyzed '{}' in {:?}: score {:.2}, {} missing skills",
            role,
            start_time.elapsed(),
            score,
            missing_skills.len()
        );

        Ok(MatchResult {
            score,
            role: role.to_string(),
            missing_skills,
            improvements: recommendations.improvements,
            projects: recommendations.projects,
        })
    }

    /// Extract a resume file and score it against one role.
    pub async fn analyze_document(
        &self,
        input_manager: &mut InputManager,
        role: &str,
        resume_path: &Path,
    ) -> Result<MatchResult> {
        if role.trim().is_empty() {
            return Err(RoleMatcherError::InputValidation("no role selected".to_string()));
        }
        // Unknown roles are rejected before paying for extraction.
        self.catalog.lookup(role)?;

        let resume_text = input_manager.extract_text(resume_path).await?;
        self.analyze(role, &resume_text)
    }

    /// Score a resume against every catalog role, best first.
    pub fn rank(&self, resume_text: &str, top_n: usize) -> Result<Vec<RoleRanking>> {
        let resume = ExtractedResume::from_text(&self.text_processor, resume_text)?;
        if self.catalog.is_empty() {
            return Ok(Vec::new());
        }

        let mut texts = Vec::with_capacity(self.catalog.len() + 1);
        texts.push(resume.raw_text);
        texts.extend(self.catalog.entries().iter().map(|e| e.description.clone()));

        let vectors = self.embedder.embed_batch(&texts)?;
        let (resume_vector, role_vectors) = vectors.split_first().ok_or_else(|| {
            RoleMatcherError::ComputeFailure("Embedder returned no vectors".to_string())
        })?;
        if role_vectors.len() != self.catalog.len() {
            return Err(RoleMatcherError::ComputeFailure(format!(
                "expected {} role embeddings, got {}",
                self.catalog.len(),
                role_vectors.len()
            )));
        }

        let mut rankings = self
            .catalog
            .entries()
            .iter()
            .zip(role_vectors)
            .map(|(entry, role_vector)| {
                Ok(RoleRanking {
                    role: entry.title.clone(),
                    score: fit_score(resume_vector, role_vector)?,
                    raw_similarity: raw_percentage(resume_vector, role_vector)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        rankings.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.role.cmp(&b.role)));
        rankings.truncate(top_n);

        info!("Ranked {} roles, returning top {}", self.catalog.len(), rankings.len());
        Ok(rankings)
    }
}
