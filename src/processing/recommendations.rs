//! Rule-based project suggestions and improvement tips

use crate::error::{Result, RoleMatcherError};
use aho_corasick::AhoCorasick;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How many missing skills are turned into project suggestions.
pub const MAX_SKILLS_CONSIDERED: usize = 3;

/// One row of a dispatch table: any of `patterns` as a substring selects `suggestion`.
#[derive(Debug)]
pub struct Rule {
    pub patterns: &'static [&'static str],
    pub suggestion: &'static str,
}

/// Evaluated in order against a lowercased missing skill; first match wins.
pub const SKILL_RULES: &[Rule] = &[
    Rule {
        patterns: &["ml", "tensorflow", "pytorch", "model"],
        suggestion: "Build an end-to-end ML pipeline with training, evaluation and deployment.",
    },
    Rule {
        patterns: &["react", "frontend", "ui"],
        suggestion: "Develop a modern responsive web app using React with dynamic state management.",
    },
    Rule {
        patterns: &["api", "backend", "flask"],
        suggestion: "Create a REST API with authentication and database integration.",
    },
    Rule {
        patterns: &["docker", "deployment"],
        suggestion: "Containerize an application using Docker and deploy it to cloud.",
    },
    Rule {
        patterns: &["sql", "database"],
        suggestion: "Design and implement a scalable database-backed application.",
    },
    Rule {
        patterns: &["nlp"],
        suggestion: "Build a real-world NLP project such as sentiment analysis or chatbot.",
    },
];

/// Evaluated in order against the lowercased role title when nothing is missing.
pub const ROLE_RULES: &[Rule] = &[
    Rule {
        patterns: &["machine learning"],
        suggestion: "Build a production-grade ML system with model monitoring and CI/CD.",
    },
    Rule {
        patterns: &["frontend"],
        suggestion: "Create a high-performance web application with optimized UX and animations.",
    },
    Rule {
        patterns: &["backend"],
        suggestion: "Architect a scalable backend system with caching and load balancing.",
    },
    Rule {
        patterns: &["data"],
        suggestion: "Develop an end-to-end data analytics pipeline with visualization dashboard.",
    },
];

const LOW_SCORE_TIPS: &[&str] = &[
    "Add more role-specific technical skills.",
    "Include measurable achievements.",
    "Mention tools and frameworks clearly.",
];

const MID_SCORE_TIPS: &[&str] = &[
    "Enhance project descriptions.",
    "Align resume keywords with job description.",
];

const HIGH_SCORE_TIPS: &[&str] = &["Excellent match. Minor refinements needed."];

/// Improvement tips for a fit score: below 50, below 75, and the rest.
pub fn improvement_tips(score: f64) -> Vec<String> {
    let tips = if score < 50.0 {
        LOW_SCORE_TIPS
    } else if score < 75.0 {
        MID_SCORE_TIPS
    } else {
        HIGH_SCORE_TIPS
    };
    tips.iter().map(|t| t.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub improvements: Vec<String>,
    pub projects: Vec<String>,
}

/// Compiled dispatch table.
struct RuleSet {
    automaton: AhoCorasick,
    rule_of_pattern: Vec<usize>,
    rules: &'static [Rule],
}

impl RuleSet {
    fn new(rules: &'static [Rule]) -> Result<Self> {
        let mut patterns = Vec::new();
        let mut rule_of_pattern = Vec::new();
        for (index, rule) in rules.iter().enumerate() {
            for pattern in rule.patterns {
                patterns.push(*pattern);
                rule_of_pattern.push(index);
            }
        }

        let automaton = AhoCorasick::new(&patterns)
            .map_err(|e| RoleMatcherError::Configuration(format!("Failed to build rule matcher: {}", e)))?;

        Ok(Self {
            automaton,
            rule_of_pattern,
            rules,
        })
    }

    /// Lowest-index rule with any pattern occurring in `haystack`.
    fn first_match(&self, haystack: &str) -> Option<&'static Rule> {
        self.automaton
            .find_overlapping_iter(haystack)
            .map(|m| self.rule_of_pattern[m.pattern().as_usize()])
            .min()
            .map(|index| &self.rules[index])
    }
}

pub struct RecommendationEngine {
    skill_rules: RuleSet,
    role_rules: RuleSet,
}

impl RecommendationEngine {
    pub fn new() -> Result<Self> {
        Ok(Self {
            skill_rules: RuleSet::new(SKILL_RULES)?,
            role_rules: RuleSet::new(ROLE_RULES)?,
        })
    }

    /// Project suggestions, deduplicated and sorted.
    pub fn projects(&self, role: &str, missing_skills: &[String]) -> Vec<String> {
        let mut projects = BTreeSet::new();

        if missing_skills.is_empty() {
            projects.insert(self.project_for_role(role));
        } else {
            for skill in missing_skills.iter().take(MAX_SKILLS_CONSIDERED) {
                projects.insert(self.project_for_skill(skill));
            }
        }

        projects.into_iter().collect()
    }

    pub fn project_for_skill(&self, skill: &str) -> String {
        let skill = skill.to_lowercase();
        match self.skill_rules.first_match(&skill) {
            Some(rule) => rule.suggestion.to_string(),
            None => format!(
                "Build a hands-on applied project integrating {} with real-world business use cases.",
                skill
            ),
        }
    }

    pub fn project_for_role(&self, role: &str) -> String {
        match self.role_rules.first_match(&role.to_lowercase()) {
            Some(rule) => rule.suggestion.to_string(),
            None => format!("Build an advanced domain-specific project in {}.", role),
        }
    }

    pub fn recommend(&self, role: &str, missing_skills: &[String], score: f64) -> Recommendations {
        Recommendations {
            improvements: improvement_tips(score),
            projects: self.projects(role, missing_skills),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    const CONTAINERIZE: &str = "Containerize an application using Docker and deploy it to cloud.";

    #[test]
    fn test_tip_counts_follow_score_thresholds() {
        assert_eq!(improvement_tips(42.0).len(), 3);
        assert_eq!(improvement_tips(60.0).len(), 2);
        assert_eq!(improvement_tips(90.0).len(), 1);
        assert_eq!(improvement_tips(49.99).len(), 3);
        assert_eq!(improvement_tips(50.0).len(), 2);
        assert_eq!(improvement_tips(75.0), vec!["Excellent match. Minor refinements needed.".to_string()]);
    }

    #[test]
    fn test_docker_project_listed_once() {
        let engine = RecommendationEngine::new().unwrap();

        let projects = engine.projects("DevOps Engineer", &skills(&["Docker", "AWS"]));
        assert_eq!(projects.iter().filter(|p| p.as_str() == CONTAINERIZE).count(), 1);
        assert!(projects.contains(
            &"Build a hands-on applied project integrating aws with real-world business use cases.".to_string()
        ));
        assert_eq!(projects.len(), 2);

        let projects = engine.projects("DevOps Engineer", &skills(&["docker", "deployment", "dockerfile"]));
        assert_eq!(projects, vec![CONTAINERIZE.to_string()]);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let engine = RecommendationEngine::new().unwrap();

        // matches both the ML rule ("model") and the SQL rule ("sql")
        assert_eq!(
            engine.project_for_skill("sqlmodel"),
            SKILL_RULES[0].suggestion.to_string()
        );
        // "flask" and "database" both present: API rule precedes SQL rule
        assert_eq!(
            engine.project_for_skill("flask-database"),
            SKILL_RULES[2].suggestion.to_string()
        );
        assert_eq!(
            engine.project_for_skill("PyTorch"),
            SKILL_RULES[0].suggestion.to_string()
        );
        assert_eq!(engine.project_for_skill("nlp"), SKILL_RULES[5].suggestion.to_string());
    }

    #[test]
    fn test_only_first_three_skills_considered() {
        let engine = RecommendationEngine::new().unwrap();
        let projects = engine.projects("Analyst", &skills(&["alpha", "beta", "gamma", "react"]));

        assert_eq!(projects.len(), 3);
        assert!(!projects.contains(&SKILL_RULES[1].suggestion.to_string()));
    }

    #[test]
    fn test_role_projects_when_nothing_missing() {
        let engine = RecommendationEngine::new().unwrap();

        assert_eq!(
            engine.projects("Machine Learning Engineer", &[]),
            vec![ROLE_RULES[0].suggestion.to_string()]
        );
        assert_eq!(engine.projects("Frontend Developer", &[]), vec![ROLE_RULES[1].suggestion.to_string()]);
        assert_eq!(engine.projects("Backend Developer", &[]), vec![ROLE_RULES[2].suggestion.to_string()]);
        assert_eq!(engine.projects("Data Analyst", &[]), vec![ROLE_RULES[3].suggestion.to_string()]);
        assert_eq!(
            engine.projects("Product Manager", &[]),
            vec!["Build an advanced domain-specific project in Product Manager.".to_string()]
        );
    }

    #[test]
    fn test_recommend_combines_tips_and_projects() {
        let engine = RecommendationEngine::new().unwrap();
        let recs = engine.recommend("Data Scientist", &skills(&["sql"]), 61.5);

        assert_eq!(recs.improvements.len(), 2);
        assert_eq!(recs.projects, vec![SKILL_RULES[4].suggestion.to_string()]);
    }
}
