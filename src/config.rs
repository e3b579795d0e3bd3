//! Runtime configuration.
//!
//! Values come from the environment (`GOPATH`, `GOROOT`, `GITHUB_TOKEN` and
//! the `PKGSTORE_*` overrides) and are resolved once at startup into a
//! [`Config`] that is passed to whichever component needs it.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;
use url::Url;

/// Default GitHub REST API base URL
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com/";

/// Grouping is filesystem-bound and cheap, so it fans out wide.
pub const DEFAULT_GROUP_WORKERS: usize = 64;

/// The status pass talks to remotes; keep outbound requests bounded.
pub const DEFAULT_STATUS_WORKERS: usize = 8;

/// Default per-call comparison timeout in seconds
pub const DEFAULT_COMPARE_TIMEOUT_SECS: u64 = 30;

pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const GITHUB_API_ENV: &str = "PKGSTORE_GITHUB_API";
pub const USER_AGENT_ENV: &str = "PKGSTORE_USER_AGENT";
pub const GROUP_WORKERS_ENV: &str = "PKGSTORE_GROUP_WORKERS";
pub const STATUS_WORKERS_ENV: &str = "PKGSTORE_STATUS_WORKERS";
pub const COMPARE_TIMEOUT_ENV: &str = "PKGSTORE_COMPARE_TIMEOUT_SECS";

/// Process-wide configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// GOPATH entries, in search order
    pub gopath: Vec<PathBuf>,
    /// Standard-library root, excluded from scans
    pub goroot: Option<PathBuf>,
    pub github_api: Url,
    pub github_token: Option<String>,
    pub user_agent: String,
    pub group_workers: usize,
    pub status_workers: usize,
    pub compare_timeout: Duration,
}

impl Config {
    /// Resolve the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        let gopath = match std::env::var_os("GOPATH") {
            Some(value) if !value.is_empty() => std::env::split_paths(&value).collect(),
            _ => vec![dirs::home_dir()
                .context("Could not determine home directory for default GOPATH")?
                .join("go")],
        };

        let goroot = std::env::var_os("GOROOT")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let github_api = std::env::var(GITHUB_API_ENV)
            .unwrap_or_else(|_| DEFAULT_GITHUB_API.to_string());
        let github_api = parse_base_url(&github_api)?;

        let github_token = std::env::var(GITHUB_TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty());

        let user_agent = std::env::var(USER_AGENT_ENV)
            .unwrap_or_else(|_| format!("pkgstore/{}", env!("CARGO_PKG_VERSION")));

        let config = Self {
            gopath,
            goroot,
            github_api,
            github_token,
            user_agent,
            group_workers: env_usize(GROUP_WORKERS_ENV, DEFAULT_GROUP_WORKERS)?,
            status_workers: env_usize(STATUS_WORKERS_ENV, DEFAULT_STATUS_WORKERS)?,
            compare_timeout: Duration::from_secs(env_u64(
                COMPARE_TIMEOUT_ENV,
                DEFAULT_COMPARE_TIMEOUT_SECS,
            )?),
        };

        debug!("Resolved configuration: {:?}", config.redacted());
        Ok(config)
    }

    /// `src` directories of every GOPATH entry.
    pub fn source_roots(&self) -> Vec<PathBuf> {
        self.gopath.iter().map(|p| p.join("src")).collect()
    }

    fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.github_token.is_some() {
            copy.github_token = Some("***".to_string());
        }
        copy
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gopath: Vec::new(),
            goroot: None,
            github_api: Url::parse(DEFAULT_GITHUB_API).expect("default API URL is valid"),
            github_token: None,
            user_agent: format!("pkgstore/{}", env!("CARGO_PKG_VERSION")),
            group_workers: DEFAULT_GROUP_WORKERS,
            status_workers: DEFAULT_STATUS_WORKERS,
            compare_timeout: Duration::from_secs(DEFAULT_COMPARE_TIMEOUT_SECS),
        }
    }
}

/// Parse an API base URL, making sure it ends with `/` so that relative
/// endpoint joins keep any path prefix (GitHub Enterprise uses `/api/v3/`).
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    Url::parse(&normalized).with_context(|| format!("Invalid API base URL: {}", raw))
}

fn env_usize(name: &str, default: usize) -> Result<usize> {
    match std::env::var(name) {
        Ok(value) => {
            let parsed: usize = value
                .trim()
                .parse()
                .with_context(|| format!("{} must be a positive integer, got {:?}", name, value))?;
            Ok(parsed.max(1))
        }
        Err(_) => Ok(default),
    }
}

fn env_u64(name: &str, default: u64) -> Result<u64> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} must be an integer, got {:?}", name, value)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    struct EnvVarRestore {
        name: &'static str,
        prev: Option<String>,
    }

    impl EnvVarRestore {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                prev: std::env::var(name).ok(),
            }
        }
    }

    impl Drop for EnvVarRestore {
        fn drop(&mut self) {
            match &self.prev {
                Some(value) => std::env::set_var(self.name, value),
                None => std::env::remove_var(self.name),
            }
        }
    }

    #[test]
    fn test_parse_base_url_adds_trailing_slash() {
        let url = parse_base_url("https://ghe.example.com/api/v3").unwrap();
        assert_eq!(url.as_str(), "https://ghe.example.com/api/v3/");
        assert_eq!(
            url.join("repos/o/r").unwrap().as_str(),
            "https://ghe.example.com/api/v3/repos/o/r"
        );
    }

    #[test]
    fn test_gopath_split_and_source_roots() {
        let _guard = env_lock().lock().unwrap();
        let _restore = EnvVarRestore::new("GOPATH");
        let joined = std::env::join_paths(["/tmp/one", "/tmp/two"]).unwrap();
        std::env::set_var("GOPATH", joined);

        let config = Config::from_env().unwrap();
        assert_eq!(
            config.source_roots(),
            vec![PathBuf::from("/tmp/one/src"), PathBuf::from("/tmp/two/src")]
        );
    }

    #[test]
    fn test_worker_counts_from_env() {
        let _guard = env_lock().lock().unwrap();
        let _restore_group = EnvVarRestore::new(GROUP_WORKERS_ENV);
        let _restore_status = EnvVarRestore::new(STATUS_WORKERS_ENV);

        std::env::set_var(GROUP_WORKERS_ENV, "16");
        std::env::set_var(STATUS_WORKERS_ENV, "0");
        let config = Config::from_env().unwrap();
        assert_eq!(config.group_workers, 16);
        assert_eq!(config.status_workers, 1);

        std::env::set_var(STATUS_WORKERS_ENV, "many");
        assert!(Config::from_env().is_err());
    }

    #[test]
    fn test_token_is_redacted() {
        let config = Config {
            github_token: Some("secret".to_string()),
            ..Config::default()
        };
        assert_eq!(config.redacted().github_token.as_deref(), Some("***"));
    }
}
