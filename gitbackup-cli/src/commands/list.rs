//! List command - show the repositories a backup would cover

use clap::Args;
use gitbackup_core::Config;

use crate::credentials;

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print the list as JSON
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    /// Execute the list command
    pub async fn execute(&self, verbose: bool, config: &Config) -> anyhow::Result<()> {
        let client = credentials::client(config.github.clone())?;

        if verbose {
            println!(
                "Listing repositories (affiliation: {}, visibility: {})...",
                config.github.affiliation, config.github.visibility
            );
        }

        let repos = client.list_repositories().await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&repos)?);
            return Ok(());
        }

        if repos.is_empty() {
            println!("No repositories found.");
            return Ok(());
        }

        println!("Repositories ({} found)", repos.len());
        println!();

        for repo in &repos {
            let mut flags = Vec::new();
            if repo.private {
                flags.push("private");
            }
            if repo.fork {
                flags.push("fork");
            }
            if repo.archived {
                flags.push("archived");
            }
            let flags = if flags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", flags.join(", "))
            };

            println!("  {} ({}){}", repo.full_name, repo.default_branch, flags);
        }

        Ok(())
    }
}
