//! Listing the repositories an account can see

use crate::{Error, GitHubClient, Result};
use gitbackup_core::RepositoryDescriptor;
use octocrab::models::Repository;
use tracing::{debug, info, warn};

/// Branch assumed when the API omits one
const FALLBACK_DEFAULT_BRANCH: &str = "main";

/// Convert an API repository into a descriptor
///
/// Returns `None` when the response carries no clone URL.
pub fn descriptor_from(repo: Repository) -> Option<RepositoryDescriptor> {
    let clone_url = repo.clone_url?.to_string();
    let full_name = repo.full_name.unwrap_or_else(|| repo.name.clone());
    let default_branch = repo
        .default_branch
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| FALLBACK_DEFAULT_BRANCH.to_string());

    Some(RepositoryDescriptor {
        name: repo.name,
        full_name,
        clone_url,
        default_branch,
        private: repo.private.unwrap_or(false),
        fork: repo.fork.unwrap_or(false),
        archived: repo.archived.unwrap_or(false),
    })
}

impl GitHubClient {
    /// List every repository the token can see, following pagination to the end
    ///
    /// Uses the configured affiliation and visibility (owner and
    /// collaborator, all visibilities by default). Order follows the API.
    pub async fn list_repositories(&self) -> Result<Vec<RepositoryDescriptor>> {
        let settings = self.settings();
        debug!(?settings, "Listing repositories for authenticated user");

        let mut page = self
            .client()
            .current()
            .list_repos_for_authenticated_user()
            .affiliation(settings.affiliation.as_str())
            .visibility(settings.visibility.as_str())
            .per_page(settings.per_page)
            .send()
            .await
            .map_err(Error::classify)?;

        let mut repositories = Vec::new();
        let mut page_num = 1u32;
        loop {
            debug!(page = page_num, items = page.items.len(), "Fetched repository page");

            for repo in page.items.drain(..) {
                let name = repo.name.clone();
                match descriptor_from(repo) {
                    Some(descriptor) => repositories.push(descriptor),
                    None => warn!(repo = %name, "Repository has no clone URL, skipping"),
                }
            }

            match self
                .client()
                .get_page::<Repository>(&page.next)
                .await
                .map_err(Error::classify)?
            {
                Some(next) => {
                    page = next;
                    page_num += 1;
                }
                None => break,
            }
        }

        info!(count = repositories.len(), "Fetched all repositories");

        Ok(repositories)
    }
}
