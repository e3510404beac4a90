//! GitHub token acquisition

use gitbackup_core::secrets::{looks_like_github_token, TOKEN_ENV_VARS};
use gitbackup_core::Secrets;
use gitbackup_github::GitHubClient;

/// Prompt attempts before giving up on empty input
const MAX_PROMPT_ATTEMPTS: usize = 3;

/// Resolve a token from the environment, the secrets file, or a masked prompt
pub fn resolve_token() -> anyhow::Result<String> {
    let secrets = Secrets::load()?;

    if let Some(token) = secrets.github_token() {
        return Ok(token);
    }

    tracing::info!("No GitHub token in environment or secrets file, prompting");
    prompt_for_token()
}

/// Build an API client with a resolved token
pub fn client(settings: gitbackup_core::config::GitHubSettings) -> anyhow::Result<GitHubClient> {
    let token = resolve_token()?;
    Ok(GitHubClient::with_settings(token, settings)?)
}

fn prompt_for_token() -> anyhow::Result<String> {
    println!(
        "GitHub token not found in {} or the secrets file.",
        TOKEN_ENV_VARS.join(" / ")
    );

    for _ in 0..MAX_PROMPT_ATTEMPTS {
        let input = rpassword::prompt_password("Enter your GitHub Personal Access Token: ")
            .map_err(|e| anyhow::anyhow!("Failed to read token from terminal: {}", e))?;
        let token = input.trim();

        if token.is_empty() {
            eprintln!("Token cannot be empty.");
            continue;
        }

        if !looks_like_github_token(token) {
            eprintln!(
                "Warning: the token does not look like a GitHub PAT (ghp_... or github_pat_...). \
                 Continuing anyway."
            );
        }

        return Ok(token.to_string());
    }

    anyhow::bail!("No GitHub token provided")
}
