//! role-matcher: score a resume against job roles from the command line

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use role_matcher::catalog::RoleCatalog;
use role_matcher::cli::{self, Cli, Commands, ConfigAction, ModelAction};
use role_matcher::config::{Config, OutputFormat};
use role_matcher::error::{Result, RoleMatcherError};
use role_matcher::input::InputManager;
use role_matcher::output::formatter_for;
use role_matcher::processing::analyzer::RoleMatcher;
use role_matcher::processing::embedding_manager::{known_models, resolve_model, EmbeddingModelManager};
use role_matcher::processing::embeddings::build_embedder;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

const RESUME_EXTENSIONS: [&str; 4] = ["pdf", "txt", "md", "markdown"];

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, &config_path).await {
        error!("Command failed: {}", e);
        eprintln!("error [{}]: {}", e.status_code(), e.public_message());
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config, config_path: &Path) -> Result<()> {
    match command {
        Commands::Analyze {
            resume,
            role,
            catalog,
            output,
            detailed,
            offline,
            save,
        } => {
            cli::validate_file_extension(&resume, &RESUME_EXTENSIONS)
                .map_err(|e| RoleMatcherError::InputValidation(format!("Resume file: {}", e)))?;
            let format = resolve_output_format(output.as_deref(), &config)?;
            let detailed = detailed || config.output.detailed;

            let matcher = build_matcher(&config, catalog, offline)?;
            let mut input_manager = InputManager::new();

            info!("Analyzing {} for role '{}'", resume.display(), role);
            let result = matcher.analyze_document(&mut input_manager, &role, &resume).await?;

            let formatter = formatter_for(format, config.output.color_output && save.is_none(), detailed);
            let rendered = formatter.format_result(&result)?;
            emit(&rendered, save.as_deref())?;
        }

        Commands::Rank {
            resume,
            catalog,
            top,
            output,
            detailed,
            offline,
        } => {
            cli::validate_file_extension(&resume, &RESUME_EXTENSIONS)
                .map_err(|e| RoleMatcherError::InputValidation(format!("Resume file: {}", e)))?;
            let format = resolve_output_format(output.as_deref(), &config)?;

            let matcher = build_matcher(&config, catalog, offline)?;
            let mut input_manager = InputManager::new();
            let resume_text = input_manager.extract_text(&resume).await?;

            let rankings = matcher.rank(&resume_text, top)?;
            let formatter = formatter_for(format, config.output.color_output, detailed);
            emit(&formatter.format_rankings(&rankings)?, None)?;
        }

        Commands::Roles { catalog } => {
            let catalog = load_catalog(&config, catalog)?;
            println!("📚 {} roles available\n", catalog.len());
            for title in catalog.titles() {
                println!("  • {}", title);
            }
        }

        Commands::Models { action } => match action {
            ModelAction::List => {
                let manager = EmbeddingModelManager::new(config.models_dir().clone()).await?;
                println!("🧠 Embedding Models\n");
                for model in known_models() {
                    let status = if manager.is_model_downloaded(&model.id) {
                        "✅ Downloaded"
                    } else {
                        "⬇️  Available"
                    };
                    println!(
                        "  • {} ({}) - {} MB, {} dims [{}]",
                        model.id, model.repo_id, model.size_mb, model.dimensions, status
                    );
                    println!("    {}", model.description);
                }
            }

            ModelAction::Download { model, force } => {
                let mut manager = EmbeddingModelManager::new(config.models_dir().clone()).await?;
                if !force && manager.is_model_downloaded(&model) {
                    println!("✅ Model '{}' is already downloaded!", model);
                    println!("💡 Use --force to re-download");
                    return Ok(());
                }
                let path = manager.download_model(&model, force).await?;
                println!("✅ Model '{}' downloaded successfully!", model);
                println!("📁 Location: {}", path.display());
            }

            ModelAction::Info { model } => {
                let info = resolve_model(&model)
                    .ok_or_else(|| RoleMatcherError::ModelError(format!("Unknown embedding model: {}", model)))?;
                let manager = EmbeddingModelManager::new(config.models_dir().clone()).await?;

                println!("📋 Model Information for '{}'\n", info.id);
                println!("Name: {}", info.name);
                println!("Repository: {}", info.repo_id);
                println!("Size: {} MB", info.size_mb);
                println!("Dimensions: {}", info.dimensions);
                println!("Description: {}", info.description);
                match manager.get_model_path(&info.id) {
                    Some(path) => println!("Location: {}", path.display()),
                    None => println!("\n💡 To download this model, run:\n   role-matcher models download {}", info.id),
                }
            }
        },

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                println!("⚙️  Current Configuration\n");
                println!("Catalog: {}", config.catalog.path.display());
                println!("Models Directory: {}", config.models_dir().display());
                println!("Embedding Model: {}", config.models.default_embedding_model);
                println!("Embedding Backend: {:?}", config.embedding.backend);
                println!("Embedding Cache: {}", config.processing.enable_caching);
                println!("Output Format: {:?}", config.output.format);
            }

            Some(ConfigAction::Reset) => {
                Config::default().save_to(config_path)?;
                println!("✅ Configuration reset to defaults at {}", config_path.display());
            }

            Some(ConfigAction::Path) => {
                println!("{}", config_path.display());
            }
        },
    }

    Ok(())
}

fn resolve_output_format(flag: Option<&str>, config: &Config) -> Result<OutputFormat> {
    match flag {
        Some(format) => cli::parse_output_format(format).map_err(RoleMatcherError::InputValidation),
        None => Ok(config.output.format),
    }
}

fn load_catalog(config: &Config, path_override: Option<PathBuf>) -> Result<RoleCatalog> {
    let path = path_override.unwrap_or_else(|| config.catalog.path.clone());
    RoleCatalog::from_path_with_columns(
        &path,
        &config.catalog.title_column,
        &config.catalog.description_column,
    )
}

/// Load the catalog and embedding model once; the matcher is then reused.
fn build_matcher(config: &Config, catalog_override: Option<PathBuf>, offline: bool) -> Result<RoleMatcher> {
    let catalog = load_catalog(config, catalog_override)?;
    if catalog.is_empty() {
        return Err(RoleMatcherError::Catalog("role catalog has no usable rows".to_string()));
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Loading embedding model...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let embedder = build_embedder(config, offline);
    spinner.finish_and_clear();

    RoleMatcher::new(catalog, embedder?)
}

fn emit(rendered: &str, save: Option<&Path>) -> Result<()> {
    match save {
        Some(path) => {
            std::fs::write(path, rendered)?;
            println!("💾 Saved output to {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
