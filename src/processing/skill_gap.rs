//! Keyword gap between a role description and a resume

use std::collections::BTreeSet;

/// Role keywords absent from the resume, in ascending order.
pub fn gap(role_keywords: &BTreeSet<String>, resume_keywords: &BTreeSet<String>) -> Vec<String> {
    role_keywords
        .difference(resume_keywords)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::text_processor::TextProcessor;

    fn set(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_identical_keywords_have_no_gap() {
        let keywords = set(&["python", "docker", "kubernetes"]);
        assert!(gap(&keywords, &keywords).is_empty());
    }

    #[test]
    fn test_data_scientist_gap() {
        let processor = TextProcessor::new();
        let role = processor.keywords("Python SQL machine learning for the analytics team");
        let resume = processor.keywords("python");

        let missing = gap(&role, &resume);

        assert!(missing.contains(&"machine".to_string()));
        assert!(missing.contains(&"learning".to_string()));
        assert!(missing.contains(&"sql".to_string()));
        assert!(!missing.contains(&"python".to_string()));
        assert!(!missing.contains(&"the".to_string()));
        assert!(!missing.contains(&"for".to_string()));
    }

    #[test]
    fn test_gap_is_sorted_and_ignores_resume_extras() {
        let role = set(&["sql", "docker", "aws"]);
        let resume = set(&["rust", "docker"]);
        assert_eq!(gap(&role, &resume), vec!["aws".to_string(), "sql".to_string()]);
    }
}
