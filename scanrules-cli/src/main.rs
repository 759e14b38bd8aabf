//! scanrules - generate and inspect the scan tool's rule catalog
//!
//! Runs the same generation pipeline the platform plugin uses at startup,
//! and exposes its pieces (README section extraction, cache, platform
//! definitions) for inspection.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use scanrules_core::{
    docs, Catalog, GeneratorConfig, PlatformSettings, QualityProfile, RepositoryDefinition, RuleCache,
    RuleGenerator,
};

mod rules_cli;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "scanrules",
    about = "Rule catalog generation for the Ballerina scan tool",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Set log level
    #[clap(long, default_value = "info", global = true)]
    log_level: LogLevel,

    /// Override the configuration file path
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Override the tool registry endpoint
    #[clap(long, global = true)]
    registry_url: Option<String>,

    /// Override the rule cache location
    #[clap(long, global = true)]
    cache_path: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the rule catalog (falls back to the cache when offline)
    Generate {
        /// Output the catalog as JSON
        #[clap(long)]
        json: bool,
    },

    /// Show one rule of the catalog
    Show {
        /// Rule id (e.g., ballerina:1)
        id: String,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Print the rule repository definition registered with the platform
    Repository {
        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Print the built-in quality profile
    Profile {
        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Inspect or clear the rule cache
    Cache {
        #[clap(subcommand)]
        command: CacheCommand,
    },

    /// Extract per-rule documentation from a local README
    Docs {
        /// Path to the README (Markdown)
        readme: PathBuf,

        /// Render fragments to HTML
        #[clap(long)]
        html: bool,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
enum CacheCommand {
    /// Print the cache file location
    Path,

    /// Print the cached catalog
    Show {
        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Delete the cache file
    Clear,
}

/// Initialize tracing with CLI flags
///
/// `RUST_LOG` directives are layered on top of `--log-level`.
fn initialize_tracing(log_level: &LogLevel) {
    let mut filter = EnvFilter::new(log_level.to_filter_directive());

    if let Ok(env) = std::env::var("RUST_LOG") {
        for directive in env.split(',').filter(|d| !d.trim().is_empty()) {
            if let Ok(parsed) = directive.parse() {
                filter = filter.add_directive(parsed);
            }
        }
    }

    // Logs go to stderr; stdout carries command output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level);

    let config = load_config(&cli)?;

    match cli.command {
        Command::Generate { json } => generate_command(&config, json).await,
        Command::Show { id, json } => show_command(&config, &id, json).await,
        Command::Repository { json } => repository_command(&config, json).await,
        Command::Profile { json } => profile_command(&config, json).await,
        Command::Cache { command } => cache_command(&config, command),
        Command::Docs { readme, html, json } => docs_command(&readme, html, json),
    }
}

/// Config file (explicit or per-user default) with command-line overrides applied
fn load_config(cli: &Cli) -> Result<GeneratorConfig> {
    let mut config = match &cli.config {
        Some(path) => GeneratorConfig::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => GeneratorConfig::load().context("Failed to load config")?,
    };

    if let Some(url) = &cli.registry_url {
        config.registry_url = url.clone();
    }
    if let Some(path) = &cli.cache_path {
        config.cache_path = Some(path.clone());
    }

    tracing::debug!(
        "Registry: {} (rule entry: {})",
        config.registry_url,
        config.rule_info_entry
    );
    Ok(config)
}

async fn load_catalog(config: &GeneratorConfig) -> Result<Arc<Catalog>> {
    let generator =
        RuleGenerator::from_config(config).context("Failed to set up the rule generator")?;
    generator
        .ensure_catalog()
        .await
        .context("Failed to generate the rule catalog and no cached rules are available")
}

async fn generate_command(config: &GeneratorConfig, json: bool) -> Result<()> {
    let catalog = load_catalog(config).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(catalog.as_ref())?);
    } else {
        rules_cli::print_catalog(&catalog);
    }

    Ok(())
}

async fn show_command(config: &GeneratorConfig, id: &str, json: bool) -> Result<()> {
    let catalog = load_catalog(config).await?;
    let rule = catalog
        .get(id)
        .with_context(|| format!("Rule '{id}' not found in catalog"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(rule)?);
    } else {
        rules_cli::print_rule(rule);
    }

    Ok(())
}

async fn repository_command(config: &GeneratorConfig, json: bool) -> Result<()> {
    let catalog = load_catalog(config).await?;
    let repository = RepositoryDefinition::from_catalog(&catalog, &PlatformSettings::default());

    if json {
        println!("{}", serde_json::to_string_pretty(&repository)?);
    } else {
        rules_cli::print_repository(&repository);
    }

    Ok(())
}

async fn profile_command(config: &GeneratorConfig, json: bool) -> Result<()> {
    let catalog = load_catalog(config).await?;
    let profile = QualityProfile::activate_all(&catalog, &PlatformSettings::default());

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        println!(
            "Profile '{}' ({}): {} active rule(s)",
            profile.name,
            profile.language,
            profile.active_rules.len()
        );
        for active in &profile.active_rules {
            println!("  {}:{}", active.repository_key, active.rule_key);
        }
    }

    Ok(())
}

fn cache_command(config: &GeneratorConfig, command: CacheCommand) -> Result<()> {
    let cache = RuleCache::new(
        config
            .resolved_cache_path()
            .context("Failed to resolve the rule cache location")?,
    );

    match command {
        CacheCommand::Path => println!("{}", cache.path().display()),
        CacheCommand::Show { json } => {
            let catalog = cache.load().context("Failed to read the rule cache")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&catalog)?);
            } else {
                rules_cli::print_catalog(&catalog);
            }
        }
        CacheCommand::Clear => {
            if cache.clear().context("Failed to clear the rule cache")? {
                println!("Removed {}", cache.path().display());
            } else {
                println!("No rule cache at {}", cache.path().display());
            }
        }
    }

    Ok(())
}

fn docs_command(readme: &Path, html: bool, json: bool) -> Result<()> {
    let content = fs::read_to_string(readme)
        .with_context(|| format!("Failed to read {}", readme.display()))?;

    let fragments = docs::scrape_rule_docs(&content);
    let fragments = if html {
        docs::render_all(&fragments)
    } else {
        fragments
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&fragments)?);
        return Ok(());
    }

    if fragments.is_empty() {
        println!("No rule documentation found under '## {}'", docs::RULES_SECTION_TITLE);
        return Ok(());
    }

    for (id, fragment) in &fragments {
        println!("=== {id} ===");
        println!("{}", fragment.trim_end());
        println!();
    }

    Ok(())
}
