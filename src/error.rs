//! Error handling for the role matcher

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoleMatcherError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing file or missing role selection.
    #[error("Invalid input: {0}")]
    InputValidation(String),

    /// Role title is not in the catalog.
    #[error("Role not found: {title}{}", suggestion_suffix(.suggestion))]
    NotFound {
        title: String,
        suggestion: Option<String>,
    },

    /// The document yielded no text.
    #[error("No extractable text: {0}")]
    ExtractionFailure(String),

    /// A document could not be parsed, or embedding or scoring failed.
    #[error("Compute failure: {0}")]
    ComputeFailure(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Role catalog error: {0}")]
    Catalog(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, RoleMatcherError>;

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{}'?)", s),
        None => String::new(),
    }
}

impl RoleMatcherError {
    /// HTTP-style status a request handler should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            RoleMatcherError::InputValidation(_)
            | RoleMatcherError::NotFound { .. }
            | RoleMatcherError::ExtractionFailure(_)
            | RoleMatcherError::UnsupportedFormat(_) => 400,
            _ => 500,
        }
    }

    /// Short message for the response body of a request handler.
    pub fn public_message(&self) -> &'static str {
        match self {
            RoleMatcherError::InputValidation(_) => "Missing input",
            RoleMatcherError::NotFound { .. } => "Invalid role",
            RoleMatcherError::ExtractionFailure(_) => "Could not extract text from PDF",
            RoleMatcherError::UnsupportedFormat(_) => "Unsupported file type",
            RoleMatcherError::ComputeFailure(_) => "Could not compute match",
            _ => "Internal error",
        }
    }
}

/// Convert anyhow errors (reported by model2vec) to our custom error type
impl From<anyhow::Error> for RoleMatcherError {
    fn from(err: anyhow::Error) -> Self {
        RoleMatcherError::ModelError(format!("{:#}", err))
    }
}
