//! Resume to job-role matching library

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod processing;

pub use catalog::{RoleCatalog, RoleEntry};
pub use config::Config;
pub use error::{Result, RoleMatcherError};
pub use processing::analyzer::{AnalyzeResponse, MatchResult, RoleMatcher, RoleRanking};
