//! Text normalization and keyword extraction

use crate::error::{Result, RoleMatcherError};
use regex::Regex;
use std::collections::{BTreeSet, HashSet};

/// Words too common in job postings and resumes to count as skills.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "from", "are", "was", "were",
    "have", "has", "had", "you", "your", "their", "our", "will", "shall",
    "can", "could", "should", "would", "about", "into", "using", "such",
    "also", "other", "more", "than", "each", "within",
];

/// Minimum keyword length in characters.
pub const MIN_KEYWORD_LEN: usize = 3;

pub struct TextProcessor {
    stop_words: HashSet<&'static str>,
    word_regex: Regex,
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextProcessor {
    pub fn new() -> Self {
        let word_regex = Regex::new(r"\b[a-zA-Z]{3,}\b").expect("Invalid keyword regex");

        Self {
            stop_words: STOP_WORDS.iter().copied().collect(),
            word_regex,
        }
    }

    /// Lowercase alphabetic tokens of at least three letters, stop words removed.
    pub fn keywords(&self, text: &str) -> BTreeSet<String> {
        let lowered = text.to_lowercase();

        self.word_regex
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|word| !self.stop_words.contains(*word))
            .map(str::to_string)
            .collect()
    }

    /// Tokens in document order, duplicates kept. Used by the hashing embedder.
    pub fn tokens<'a>(&'a self, lowered: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.word_regex
            .find_iter(lowered)
            .map(|m| m.as_str())
            .filter(move |word| !self.stop_words.contains(*word))
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }
}

/// Resume text for a single request.
#[derive(Debug, Clone)]
pub struct ExtractedResume {
    pub raw_text: String,
    pub normalized_keywords: BTreeSet<String>,
}

impl ExtractedResume {
    /// Fails with `ExtractionFailure` when the text is blank.
    pub fn from_text(processor: &TextProcessor, text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(RoleMatcherError::ExtractionFailure(
                "document contains no extractable text".to_string(),
            ));
        }

        let raw_text = text.to_lowercase();
        let normalized_keywords = processor.keywords(&raw_text);

        Ok(Self {
            raw_text,
            normalized_keywords,
        })
    }
}
