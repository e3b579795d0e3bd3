//! Remote URL parsing.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

/// Host and repository path of a remote, e.g. `github.com` + `owner/repo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteLocation {
    pub host: String,
    pub path: String,
}

impl RemoteLocation {
    /// Parse the URL forms git accepts for a remote:
    /// `https://host/path`, `ssh://user@host/path`, `git://host/path` and the
    /// scp-like `user@host:path`.
    pub fn parse(remote: &str) -> Option<Self> {
        let remote = remote.trim();

        let (host, path) = if remote.contains("://") {
            let url = Url::parse(remote).ok()?;
            (url.host_str()?.to_string(), url.path().to_string())
        } else {
            let caps = scp_like()?.captures(remote)?;
            (caps[1].to_string(), caps[2].to_string())
        };

        let path = path.trim_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        if host.is_empty() || path.is_empty() {
            return None;
        }

        Some(Self {
            host: host.to_lowercase(),
            path: path.to_string(),
        })
    }

    /// `owner` and `repo` for two-level paths such as GitHub's.
    pub fn owner_and_repo(&self) -> Option<(&str, &str)> {
        let mut parts = self.path.split('/');
        let owner = parts.next().filter(|s| !s.is_empty())?;
        let repo = parts.next().filter(|s| !s.is_empty())?;
        if parts.next().is_some() {
            return None;
        }
        Some((owner, repo))
    }

    /// Best-effort web page for the repository.
    pub fn web_url(&self) -> Option<Url> {
        Url::parse(&format!("https://{}/{}", self.host, self.path)).ok()
    }
}

/// `[user@]host:path`, the scp-style remote git accepts.
fn scp_like() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:[^@/]+@)?([^:/]+):(.+)$").ok())
        .as_ref()
}
