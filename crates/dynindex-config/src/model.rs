//! Immutable service configuration resolved at process start.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default listen address, in `host:port` or `:port` form.
pub const DEFAULT_LISTEN_ADDR: &str = ":6060";
/// Default deadline for one complete indexing pipeline run.
pub const DEFAULT_INDEX_TIMEOUT: Duration = Duration::from_secs(60 * 60);

const REPOS_DIR_NAME: &str = "repos";
const INDEX_DIR_NAME: &str = "index";
const WILDCARD_HOST: &str = "0.0.0.0";

/// Working directories, listen address and pipeline deadline for the server.
///
/// The repo and index directories live under the data root unless they are
/// overridden with [`ServiceConfig::with_repo_dir`] or
/// [`ServiceConfig::with_index_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    data_root: PathBuf,
    repo_dir: PathBuf,
    index_dir: PathBuf,
    listen_addr: String,
    index_timeout: Duration,
}

impl ServiceConfig {
    /// Derive a configuration rooted at `data_root` with default settings.
    #[must_use]
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        let data_root = data_root.into();
        Self {
            repo_dir: data_root.join(REPOS_DIR_NAME),
            index_dir: data_root.join(INDEX_DIR_NAME),
            data_root,
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            index_timeout: DEFAULT_INDEX_TIMEOUT,
        }
    }

    /// Override the directory holding bare repository clones.
    #[must_use]
    pub fn with_repo_dir(mut self, repo_dir: impl Into<PathBuf>) -> Self {
        self.repo_dir = repo_dir.into();
        self
    }

    /// Override the directory receiving index shards.
    #[must_use]
    pub fn with_index_dir(mut self, index_dir: impl Into<PathBuf>) -> Self {
        self.index_dir = index_dir.into();
        self
    }

    /// Override the listen address.
    #[must_use]
    pub fn with_listen_addr(mut self, listen_addr: impl Into<String>) -> Self {
        self.listen_addr = listen_addr.into();
        self
    }

    /// Override the pipeline deadline.
    #[must_use]
    pub const fn with_index_timeout(mut self, index_timeout: Duration) -> Self {
        self.index_timeout = index_timeout;
        self
    }

    /// Root directory holding all server data.
    #[must_use]
    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// Directory holding bare repository clones.
    #[must_use]
    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    /// Directory receiving index shards.
    #[must_use]
    pub fn index_dir(&self) -> &Path {
        &self.index_dir
    }

    /// Listen address exactly as configured.
    #[must_use]
    pub fn listen_addr(&self) -> &str {
        &self.listen_addr
    }

    /// Deadline shared by all stages of one pipeline run.
    #[must_use]
    pub const fn index_timeout(&self) -> Duration {
        self.index_timeout
    }

    /// Listen address suitable for binding; `:port` expands to all interfaces.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        self.listen_addr.strip_prefix(':').map_or_else(
            || self.listen_addr.clone(),
            |port| format!("{WILDCARD_HOST}:{port}"),
        )
    }

    /// Directories that must exist before the HTTP surface starts.
    #[must_use]
    pub fn managed_directories(&self) -> [&Path; 3] {
        [&self.data_root, &self.repo_dir, &self.index_dir]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directories_default_under_data_root() {
        let config = ServiceConfig::new("/srv/data");
        assert_eq!(config.data_root(), Path::new("/srv/data"));
        assert_eq!(config.repo_dir(), Path::new("/srv/data/repos"));
        assert_eq!(config.index_dir(), Path::new("/srv/data/index"));
        assert_eq!(config.listen_addr(), DEFAULT_LISTEN_ADDR);
        assert_eq!(config.index_timeout(), DEFAULT_INDEX_TIMEOUT);
    }

    #[test]
    fn overrides_replace_derived_values() {
        let config = ServiceConfig::new("/srv/data")
            .with_index_dir("/mnt/shards")
            .with_repo_dir("/mnt/repos")
            .with_listen_addr("127.0.0.1:7000")
            .with_index_timeout(Duration::from_secs(30));
        assert_eq!(config.index_dir(), Path::new("/mnt/shards"));
        assert_eq!(config.repo_dir(), Path::new("/mnt/repos"));
        assert_eq!(config.data_root(), Path::new("/srv/data"));
        assert_eq!(config.bind_addr(), "127.0.0.1:7000");
        assert_eq!(config.index_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn bind_addr_expands_port_only_form() {
        let config = ServiceConfig::new("/data");
        assert_eq!(config.bind_addr(), "0.0.0.0:6060");
    }

    #[test]
    fn managed_directories_lists_root_first() {
        let config = ServiceConfig::new("/data").with_index_dir("/elsewhere");
        assert_eq!(
            config.managed_directories(),
            [
                Path::new("/data"),
                Path::new("/data/repos"),
                Path::new("/elsewhere")
            ]
        );
    }
}
