//! Backup command - mirror every visible repository to local disk

use std::path::Path;

use clap::Args;
use gitbackup_core::backup::{PlannedSync, RepositoryReport, SyncPlan};
use gitbackup_core::{
    BackupLayout, Config, Git, Orchestrator, RepositorySelection, RunSummary, SyncOutcome,
};

use crate::credentials;

const AUTH_HINT: &str = "Hint: this looks like an HTTPS authentication problem. Check your git \
credential helper setup, or consider cloning over SSH.";

/// Arguments for the backup command
#[derive(Args, Debug, Default, Clone)]
pub struct BackupArgs {
    /// Show what would happen without cloning or modifying anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Leave out archived repositories
    #[arg(long)]
    pub skip_archived: bool,

    /// Leave out forks
    #[arg(long)]
    pub skip_forks: bool,

    /// Only mirror these repositories (name or owner/name, repeatable)
    #[arg(long = "only", value_name = "NAME")]
    pub only: Vec<String>,
}

impl BackupArgs {
    fn selection(&self) -> RepositorySelection {
        RepositorySelection {
            skip_archived: self.skip_archived,
            skip_forks: self.skip_forks,
            only: self.only.clone(),
        }
    }

    /// Execute the backup command
    pub async fn execute(&self, verbose: bool, config: &Config, project_root: &Path) -> anyhow::Result<()> {
        let layout = BackupLayout::from_config(config, project_root);
        let orchestrator = Orchestrator::new(layout, Git::new(&config.git));

        if !self.json {
            println!("gitbackup");
            println!("=========");
            println!();
            println!("Project root: {}", orchestrator.layout().project_root().display());
            println!("Backup directory: {}", orchestrator.layout().root().display());
            println!();
        }

        if !self.dry_run {
            orchestrator.prepare()?;
        }

        let client = credentials::client(config.github.clone())?;
        let login = client.authenticated_user().await?;

        if !self.json {
            println!("Authenticated as {}", login);
            println!("Fetching repository list...");
        }

        let listed = client.list_repositories().await?;
        let listed_count = listed.len();
        let repos = self.selection().apply(listed);

        if verbose && repos.len() != listed_count {
            tracing::info!(listed = listed_count, selected = repos.len(), "Applied repository selection");
        }

        if repos.is_empty() {
            if self.json {
                println!("{}", serde_json::to_string_pretty(&RunSummary::new())?);
            } else {
                println!("No repositories found to back up.");
            }
            return Ok(());
        }

        if self.dry_run {
            let plans = orchestrator.plan(&repos);
            if self.json {
                println!("{}", serde_json::to_string_pretty(&plans)?);
            } else {
                print_plan(&plans);
            }
            return Ok(());
        }

        if !self.json {
            println!("Processing {} repositories one at a time...", repos.len());
            println!();
        }

        let total = repos.len();
        let json = self.json;
        let summary = orchestrator
            .run(&repos, |index, report| {
                if !json {
                    print_report(index, total, report);
                }
            })
            .await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            print_summary(&summary);
        }

        Ok(())
    }
}

fn print_report(index: usize, total: usize, report: &RepositoryReport) {
    println!("[{}/{}] {}: {}", index + 1, total, report.full_name, report.outcome.label());

    match &report.outcome {
        SyncOutcome::Failed { reason, auth_hint } => {
            eprintln!("  {}", reason);
            if *auth_hint {
                eprintln!("  {}", AUTH_HINT);
            }
        }
        SyncOutcome::SkippedNotARepo => {
            if let Some(path) = &report.path {
                println!("  {} exists but is not a git repository; left untouched", path.display());
            }
        }
        SyncOutcome::SkippedUnsafePath => {
            println!("  repository name '{}' resolves outside the backup directory", report.name);
        }
        SyncOutcome::Cloned | SyncOutcome::Updated => {}
    }
}

fn print_plan(plans: &[PlannedSync]) {
    println!("[Dry run] No changes will be made");
    println!();

    for planned in plans {
        println!("  {}: {}", planned.repository.full_name, planned.plan.label());
        if let SyncPlan::ProbeFailed { reason } = &planned.plan {
            println!("      {}", reason);
        }
    }

    println!();
    println!("{} repositories listed", plans.len());
}

fn print_summary(summary: &RunSummary) {
    let elapsed = summary
        .finished_at
        .map(|finished| (finished - summary.started_at).num_milliseconds() as f64 / 1000.0)
        .unwrap_or_default();

    println!();
    println!("Summary");
    println!("=======");
    println!("Attempted: {} repositories in {:.1}s", summary.attempted, elapsed);
    println!("  Cloned:  {}", summary.cloned);
    println!("  Updated: {}", summary.updated);
    println!("  Skipped: {}", summary.skipped());
    println!("  Failed:  {}", summary.failed);

    if summary.likely_auth_failures > 0 {
        println!("  Likely auth issues: {}", summary.likely_auth_failures);
    }

    if summary.failed > 0 {
        println!();
        println!("Failed repositories:");
        for report in summary.failures() {
            println!("  - {}", report.full_name);
        }
        println!("Check the log above for details.");
    }
}
