use std::sync::Arc;

use regex::Regex;
use tracing::debug;

use super::{ComparisonProvider, GitHubProvider, RemoteLocation};
use crate::api::GitHubClient;

/// Builds a provider for a remote, or declines with `None`.
pub type ProviderFactory =
    Arc<dyn Fn(&RemoteLocation) -> Option<Arc<dyn ComparisonProvider>> + Send + Sync>;

/// Ordered list of host patterns and the provider factories serving them.
/// The first pattern that matches a remote's host wins.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    entries: Vec<(Regex, ProviderFactory)>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry serving `github.com` (and, for GitHub Enterprise, the host
    /// of the configured API) through `client`.
    pub fn with_github(client: GitHubClient) -> Self {
        let mut registry = Self::new();

        let api_host = client.base_url().host_str().map(str::to_lowercase);
        let mut hosts = vec![r"^(www\.)?github\.com$".to_string()];
        if let Some(host) = api_host.filter(|h| h != "api.github.com") {
            hosts.push(format!("^{}$", regex::escape(&host)));
        }

        for pattern in hosts {
            let client = client.clone();
            let factory: ProviderFactory = Arc::new(move |location: &RemoteLocation| {
                GitHubProvider::for_location(client.clone(), location)
                    .map(|p| Arc::new(p) as Arc<dyn ComparisonProvider>)
            });
            // Patterns above are static or escaped.
            if let Ok(re) = Regex::new(&pattern) {
                registry.entries.push((re, factory));
            }
        }
        registry
    }

    /// Add a provider for remotes whose host matches `host_pattern`.
    pub fn register(
        &mut self,
        host_pattern: &str,
        factory: ProviderFactory,
    ) -> Result<(), regex::Error> {
        self.entries.push((Regex::new(host_pattern)?, factory));
        Ok(())
    }

    /// Provider for `remote_url`, if any registered host matches.
    pub fn provider_for(&self, remote_url: &str) -> Option<Arc<dyn ComparisonProvider>> {
        let location = RemoteLocation::parse(remote_url)?;
        let provider = self
            .entries
            .iter()
            .filter(|(re, _)| re.is_match(&location.host))
            .find_map(|(_, factory)| factory(&location));
        if provider.is_none() {
            debug!("No comparison provider for {}", remote_url);
        }
        provider
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(re, _)| re.as_str()))
            .finish()
    }
}
