//! gitbackup CLI - mirror every repository an account can see to local disk

mod commands;
mod credentials;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gitbackup_core::{BackupLayout, Config, Secrets};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{BackupArgs, ListArgs};

/// gitbackup: mirror GitHub repositories to local disk
#[derive(Parser, Debug)]
#[command(name = "gitbackup")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Backup directory (overrides config and env)
    #[arg(long, global = true, env = "GITBACKUP_DIR")]
    backup_dir: Option<PathBuf>,

    /// Path to git executable (overrides config and env)
    #[arg(long, global = true, env = "GITBACKUP_GIT_PATH")]
    git_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Clone or force-sync every repository (default)
    #[command(visible_alias = "b")]
    Backup(BackupArgs),

    /// List the repositories the token can see
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show current configuration
    Config,

    /// Create a secrets file template for the GitHub token
    Init,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = Config::load_with_overrides(cli.backup_dir.clone(), cli.git_path.clone())?;
    let project_root = std::env::current_dir()?;

    if cli.verbose {
        tracing::info!(
            backup_root = %config.backup.root.display(),
            git = %config.git.binary,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Backup(args)) => {
            args.execute(cli.verbose, &config, &project_root).await?;
        }
        None => {
            BackupArgs::default()
                .execute(cli.verbose, &config, &project_root)
                .await?;
        }
        Some(Commands::List(args)) => {
            args.execute(cli.verbose, &config).await?;
        }
        Some(Commands::Config) => {
            let layout = BackupLayout::from_config(&config, &project_root);
            println!("gitbackup Configuration");
            println!("=======================");
            println!();
            println!("Backup:");
            println!("  root: {}", layout.root().display());
            println!("  project root: {}", layout.project_root().display());
            println!();
            println!("GitHub:");
            println!("  affiliation: {}", config.github.affiliation);
            println!("  visibility: {}", config.github.visibility);
            println!("  per_page: {}", config.github.per_page);
            if let Some(api_url) = &config.github.api_url {
                println!("  api_url: {}", api_url);
            }
            println!();
            println!("Git:");
            println!("  binary: {}", config.git.binary);
            println!("  terminal_prompt: {}", config.git.terminal_prompt);
            println!();
            if let Some(path) = Config::default_config_path() {
                println!("Config file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
            if let Some(path) = Secrets::default_secrets_path() {
                println!("Secrets file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - run 'gitbackup init' or set GITHUB_PAT)");
                }
            }
        }
        Some(Commands::Init) => {
            let path = Secrets::create_template()?;
            println!("Created secrets template at {}", path.display());
            println!("Edit it and add your GitHub token.");
        }
        Some(Commands::Version) => {
            println!("gitbackup {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
