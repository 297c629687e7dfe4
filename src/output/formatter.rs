//! Output formatters for match results and role rankings

use crate::config::OutputFormat;
use crate::error::Result;
use crate::processing::analyzer::{AnalyzeResponse, MatchResult, RoleRanking};
use colored::{Color, Colorize};

/// Trait for rendering analysis output
pub trait OutputFormatter {
    fn format_result(&self, result: &MatchResult) -> Result<String>;
    fn format_rankings(&self, rankings: &[RoleRanking]) -> Result<String>;
}

/// Console formatter with colors
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

/// JSON formatter emitting the analyze response body
pub struct JsonFormatter {
    pretty: bool,
    include_missing_skills: bool,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, score: f64) -> String {
        let (badge, color) = if score >= 75.0 {
            ("STRONG FIT", Color::Green)
        } else if score >= 50.0 {
            ("PARTIAL FIT", Color::Yellow)
        } else {
            ("WEAK FIT", Color::Red)
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_result(&self, result: &MatchResult) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("📊 ROLE MATCH ANALYSIS", 1));
        output.push_str(&format!(
            "Generated: {}\n",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        ));
        output.push_str(&format!("Role: {}\n", self.colorize(&result.role, Color::Cyan)));
        output.push_str(&format!(
            "Fit Score: {:.2}% {}\n",
            result.score,
            self.format_score_badge(result.score)
        ));

        if self.detailed {
            output.push_str(&self.format_header("⚠️  Missing Skills", 2));
            if result.missing_skills.is_empty() {
                output.push_str(&format!("  {}\n", self.colorize("None, every role keyword is covered", Color::Green)));
            } else {
                for skill in &result.missing_skills {
                    output.push_str(&format!("  • {}\n", self.colorize(skill, Color::Red)));
                }
            }
        } else if !result.missing_skills.is_empty() {
            output.push_str(&format!("Missing skills: {}\n", result.missing_skills.len()));
        }

        output.push_str(&self.format_header("🎯 Improvements", 2));
        for tip in &result.improvements {
            output.push_str(&format!("  • {}\n", self.colorize(tip, Color::Yellow)));
        }

        output.push_str(&self.format_header("💡 Suggested Projects", 2));
        for (i, project) in result.projects.iter().enumerate() {
            output.push_str(&format!("  {}. {}\n", i + 1, project));
        }

        Ok(output)
    }

    fn format_rankings(&self, rankings: &[RoleRanking]) -> Result<String> {
        let mut output = self.format_header("🏆 BEST MATCHING ROLES", 1);

        if rankings.is_empty() {
            output.push_str("No roles in the catalog.\n");
            return Ok(output);
        }

        for (i, ranking) in rankings.iter().enumerate() {
            output.push_str(&format!(
                "  {:>2}. {:<40} {:>6.2}% {}",
                i + 1,
                ranking.role,
                ranking.score,
                self.format_score_badge(ranking.score)
            ));
            if self.detailed {
                output.push_str(&format!(" (cosine {:.2}%)", ranking.raw_similarity));
            }
            output.push('\n');
        }

        Ok(output)
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool, include_missing_skills: bool) -> Self {
        Self {
            pretty,
            include_missing_skills,
        }
    }

    fn render<T: serde::Serialize>(&self, value: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_result(&self, result: &MatchResult) -> Result<String> {
        if self.include_missing_skills {
            self.render(result)
        } else {
            self.render(&AnalyzeResponse::from(result.clone()))
        }
    }

    fn format_rankings(&self, rankings: &[RoleRanking]) -> Result<String> {
        self.render(&rankings)
    }
}

/// Pick the formatter for an output format.
pub fn formatter_for(format: OutputFormat, use_colors: bool, detailed: bool) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Console => Box::new(ConsoleFormatter::new(use_colors, detailed)),
        OutputFormat::Json => Box::new(JsonFormatter::new(true, detailed)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MatchResult {
        MatchResult {
            score: 61.25,
            role: "Data Scientist".to_string(),
            missing_skills: vec!["sql".to_string(), "statistics".to_string()],
            improvements: vec![
                "Enhance project descriptions.".to_string(),
                "Align resume keywords with job description.".to_string(),
            ],
            projects: vec!["Design and implement a scalable database-backed application.".to_string()],
        }
    }

    #[test]
    fn test_json_matches_response_contract() {
        let formatter = JsonFormatter::new(false, false);
        let json: serde_json::Value = serde_json::from_str(&formatter.format_result(&sample()).unwrap()).unwrap();

        assert_eq!(json["score"], 61.25);
        assert_eq!(json["role"], "Data Scientist");
        assert_eq!(json["improvements"].as_array().unwrap().len(), 2);
        assert_eq!(json["projects"].as_array().unwrap().len(), 1);
        assert!(json.get("missing_skills").is_none());
    }

    #[test]
    fn test_detailed_json_includes_missing_skills() {
        let formatter = JsonFormatter::new(true, true);
        let json: serde_json::Value = serde_json::from_str(&formatter.format_result(&sample()).unwrap()).unwrap();
        assert_eq!(json["missing_skills"][1], "statistics");
    }

    #[test]
    fn test_console_output_without_colors() {
        let formatter = ConsoleFormatter::new(false, true);
        let output = formatter.format_result(&sample()).unwrap();

        assert!(output.contains("Fit Score: 61.25% [PARTIAL FIT]"));
        assert!(output.contains("• statistics"));
        assert!(output.contains("1. Design and implement a scalable database-backed application."));
        assert!(!output.contains('\u{1b}'));
    }

    #[test]
    fn test_rankings_render_in_order() {
        let rankings = vec![
            RoleRanking { role: "Frontend Developer".to_string(), score: 80.5, raw_similarity: 61.0 },
            RoleRanking { role: "Data Scientist".to_string(), score: 40.0, raw_similarity: -20.0 },
        ];
        let output = ConsoleFormatter::new(false, false).format_rankings(&rankings).unwrap();

        let first = output.find("Frontend Developer").unwrap();
        let second = output.find("Data Scientist").unwrap();
        assert!(first < second);
        assert!(output.contains("[WEAK FIT]"));
    }
}
