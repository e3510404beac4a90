//! GitHub API client using octocrab

use crate::{Error, Result};
use gitbackup_core::config::GitHubSettings;
use octocrab::Octocrab;
use tracing::{debug, info};

/// GitHub API client authenticated as one account
pub struct GitHubClient {
    client: Octocrab,
    settings: GitHubSettings,
}

impl GitHubClient {
    /// Create a client authenticated with a personal access token
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_settings(token, GitHubSettings::default())
    }

    /// Create a client with explicit listing settings
    pub fn with_settings(token: impl Into<String>, settings: GitHubSettings) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::Auth("GitHub token is empty".to_string()));
        }

        let mut builder = Octocrab::builder().personal_token(token);
        if let Some(api_url) = &settings.api_url {
            builder = builder
                .base_uri(api_url.as_str())
                .map_err(|e| Error::Other(format!("Invalid GitHub API URL '{}': {}", api_url, e)))?;
        }

        let client = builder
            .build()
            .map_err(|e| Error::Auth(format!("Failed to create GitHub client: {}", e)))?;

        debug!(?settings, "Created GitHub client");

        Ok(Self { client, settings })
    }

    /// Get the underlying octocrab client
    pub fn client(&self) -> &Octocrab {
        &self.client
    }

    /// Listing settings in effect
    pub fn settings(&self) -> &GitHubSettings {
        &self.settings
    }

    /// Login of the account the token belongs to
    ///
    /// A rejected token surfaces here as [`Error::Auth`].
    pub async fn authenticated_user(&self) -> Result<String> {
        let user = self
            .client
            .current()
            .user()
            .await
            .map_err(Error::classify)?;

        info!(login = %user.login, "Authenticated with GitHub");
        Ok(user.login)
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings_for(server: &MockServer) -> GitHubSettings {
        GitHubSettings {
            api_url: Some(server.uri()),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_token_rejected() {
        assert!(matches!(GitHubClient::new("   "), Err(Error::Auth(_))));
    }

    #[test]
    fn test_invalid_api_url_rejected() {
        let settings = GitHubSettings {
            api_url: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            GitHubClient::with_settings("ghp_test", settings),
            Err(Error::Other(_))
        ));
    }

    #[tokio::test]
    async fn test_authenticated_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "login": "octo",
                "id": 1,
                "node_id": "MDQ6VXNlcjE=",
                "avatar_url": "https://github.com/images/error/octo.gif",
                "gravatar_id": "",
                "url": "https://api.github.com/users/octo",
                "html_url": "https://github.com/octo",
                "followers_url": "https://api.github.com/users/octo/followers",
                "following_url": "https://api.github.com/users/octo/following{/other_user}",
                "gists_url": "https://api.github.com/users/octo/gists{/gist_id}",
                "starred_url": "https://api.github.com/users/octo/starred{/owner}{/repo}",
                "subscriptions_url": "https://api.github.com/users/octo/subscriptions",
                "organizations_url": "https://api.github.com/users/octo/orgs",
                "repos_url": "https://api.github.com/users/octo/repos",
                "events_url": "https://api.github.com/users/octo/events{/privacy}",
                "received_events_url": "https://api.github.com/users/octo/received_events",
                "type": "User",
                "site_admin": false,
            })))
            .mount(&server)
            .await;

        let client = GitHubClient::with_settings("ghp_test", settings_for(&server)).unwrap();
        assert_eq!(client.authenticated_user().await.unwrap(), "octo");
    }

    #[tokio::test]
    async fn test_authenticated_user_bad_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "message": "Bad credentials",
                "documentation_url": "https://docs.github.com/rest",
            })))
            .mount(&server)
            .await;

        let client = GitHubClient::with_settings("ghp_expired", settings_for(&server)).unwrap();
        let err = client.authenticated_user().await.unwrap_err();
        assert!(matches!(&err, Error::Auth(_)), "unexpected error {:?}", err);
    }
}
