//! CLI interface for the role matcher

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "role-matcher")]
#[command(about = "Score a resume against job roles and suggest what to learn next")]
#[command(long_about = "Match a resume against a catalog of job-role descriptions using semantic embeddings, \
keyword gap analysis and rule-based project suggestions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score a resume against one role
    Analyze {
        /// Path to resume file (PDF, TXT, MD)
        #[arg(short, long)]
        resume: PathBuf,

        /// Role title exactly as listed in the catalog
        #[arg(short = 'j', long)]
        role: String,

        /// Role catalog CSV (overrides config)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Output format: console, json
        #[arg(short, long)]
        output: Option<String>,

        /// Include missing skills in the output
        #[arg(short, long)]
        detailed: bool,

        /// Use the hashing embedder instead of a Model2Vec model
        #[arg(long)]
        offline: bool,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Rank every catalog role against a resume
    Rank {
        /// Path to resume file (PDF, TXT, MD)
        #[arg(short, long)]
        resume: PathBuf,

        /// Role catalog CSV (overrides config)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Number of roles to show
        #[arg(short, long, default_value_t = 10)]
        top: usize,

        /// Output format: console, json
        #[arg(short, long)]
        output: Option<String>,

        /// Show raw cosine similarity next to each score
        #[arg(short, long)]
        detailed: bool,

        /// Use the hashing embedder instead of a Model2Vec model
        #[arg(long)]
        offline: bool,
    },

    /// List role titles in the catalog
    Roles {
        /// Role catalog CSV (overrides config)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Embedding model management commands
    Models {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ModelAction {
    /// List known embedding models
    List,

    /// Download a model
    Download {
        /// Model id or HuggingFace repo ID
        model: String,

        /// Force re-download if model exists
        #[arg(short, long)]
        force: bool,
    },

    /// Show model information
    Info {
        /// Model id
        model: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file path
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<crate::config::OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(crate::config::OutputFormat::Console),
        "json" => Ok(crate::config::OutputFormat::Json),
        _ => Err(format!("Invalid output format: {}. Supported: console, json", format)),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;

    #[test]
    fn test_parse_output_format() {
        assert_eq!(parse_output_format("JSON"), Ok(OutputFormat::Json));
        assert_eq!(parse_output_format("console"), Ok(OutputFormat::Console));
        assert!(parse_output_format("pdf").is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        let allowed = ["pdf", "txt", "md"];
        assert!(validate_file_extension(Path::new("cv.PDF"), &allowed).is_ok());
        assert!(validate_file_extension(Path::new("cv.docx"), &allowed).is_err());
        assert!(validate_file_extension(Path::new("cv"), &allowed).is_err());
    }

    #[test]
    fn test_analyze_arguments_parse() {
        let cli = Cli::try_parse_from([
            "role-matcher", "analyze", "--resume", "cv.pdf", "--role", "Data Scientist", "--offline",
        ])
        .unwrap();

        match cli.command {
            Commands::Analyze { resume, role, offline, .. } => {
                assert_eq!(resume, PathBuf::from("cv.pdf"));
                assert_eq!(role, "Data Scientist");
                assert!(offline);
            }
            _ => panic!("expected analyze command"),
        }
    }
}
