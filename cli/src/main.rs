use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fxrecipe_core::{RecipeStore, StoreConfig};
use tracing_subscriber::filter::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(version, about = "Inspect and edit effect recipe sets")]
struct Cli {
    /// Recipe directory (overrides the configured one)
    #[arg(short, long, global = true)]
    dir: Option<PathBuf>,

    /// Store config file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every set with its recipe count
    List,
    /// Show the recipes of one set
    Show { set: String },
    /// Decode every file and report failures
    Validate,
    /// Add or replace a recipe
    Add {
        set: String,
        name: String,
        #[arg(short, long, default_value = "")]
        effect: String,
        #[arg(long)]
        scale: Option<f32>,
        #[arg(long)]
        speed: Option<f32>,
        /// Loop the effect
        #[arg(long, overrides_with = "no_repeat")]
        repeat: bool,
        /// Play the effect once
        #[arg(long, overrides_with = "repeat")]
        no_repeat: bool,
        /// Attach to this character
        #[arg(long)]
        target: Option<String>,
        /// Attach to an equipment slot by id (e.g. "head", "accHat")
        #[arg(long)]
        slot: Option<String>,
    },
    /// Remove a recipe, or a whole set (and its file) when no name is given
    Remove { set: String, name: Option<String> },
    /// Rewrite every set file
    Fmt {
        #[arg(long)]
        compact: bool,
    },
    /// Print the effective store configuration
    Config,
}

/// Initialize logging, writing to FXRECIPE_LOG_PATH if set, otherwise stderr.
fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    if let Ok(path) = std::env::var("FXRECIPE_LOG_PATH") {
        if let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(file)
                .init();
            return;
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<StoreConfig, String> {
    let mut config = match &cli.config {
        Some(path) => StoreConfig::load_path(path).map_err(|e| e.to_string())?,
        None => StoreConfig::load(),
    };
    if let Some(dir) = &cli.dir {
        config.directory = dir.clone();
    }
    Ok(config)
}

/// `None` when neither `--repeat` nor `--no-repeat` was given
fn repeat_flag(repeat: bool, no_repeat: bool) -> Option<bool> {
    match (repeat, no_repeat) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn main() -> Result<(), String> {
    init_logging();

    let cli = Cli::parse();
    let mut config = load_config(&cli)?;

    match cli.command {
        Commands::Config => return commands::show_config(&config),
        Commands::Fmt { compact } => config.pretty = !compact,
        _ => {}
    }

    let mut store = RecipeStore::with_config(config);
    let stats = store.load();

    match cli.command {
        Commands::List => commands::list_sets(&store),
        Commands::Show { set } => commands::show_set(&store, &set),
        Commands::Validate => commands::validate(&store, stats),
        Commands::Add {
            set,
            name,
            effect,
            scale,
            speed,
            repeat,
            no_repeat,
            target,
            slot,
        } => {
            let edit = commands::RecipeEdit {
                effect,
                scale,
                speed,
                repeat: repeat_flag(repeat, no_repeat),
                target,
                slot,
            };
            commands::add_recipe(&mut store, &set, &name, edit)
        }
        Commands::Remove { set, name } => commands::remove(&mut store, &set, name.as_deref()),
        Commands::Fmt { .. } => commands::reformat(&mut store),
        Commands::Config => Ok(()),
    }
}
