//! Configuration module
//!
//! Settings come from `~/.mem0/config.toml` (or an explicit path), then
//! `MEM0_*` environment variables, then a `.env` file for the API key.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::bridge::DEFAULT_INTERPRETER;
use crate::remote::{ClientConfig, HeaderToggles, DEFAULT_BASE_URL};

pub const ENV_API_KEY: &str = "MEM0_API_KEY";
pub const ENV_BASE_URL: &str = "MEM0_BASE_URL";
pub const ENV_USER_ID: &str = "MEM0_USER_ID";
pub const ENV_ORG_ID: &str = "MEM0_ORG_ID";
pub const ENV_PROJECT_ID: &str = "MEM0_PROJECT_ID";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub identity: IdentityConfig,

    #[serde(default)]
    pub headers: HeaderConfig,

    #[serde(default)]
    pub bridge: BridgeConfig,
}

/// Endpoint and credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Log request payloads and response bodies
    #[serde(default)]
    pub debug: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            debug: false,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

/// Who the requests are made for
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IdentityConfig {
    /// Default owner for add/list/search, also sent as `Mem0-User-ID`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

/// Per-header switches for the identity headers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderConfig {
    #[serde(default = "enabled")]
    pub send_user_id: bool,

    #[serde(default = "enabled")]
    pub send_organization_id: bool,

    #[serde(default = "enabled")]
    pub send_project_id: bool,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            send_user_id: true,
            send_organization_id: true,
            send_project_id: true,
        }
    }
}

fn enabled() -> bool {
    true
}

/// External python client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default = "default_python")]
    pub python: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            python: default_python(),
        }
    }
}

fn default_python() -> String {
    DEFAULT_INTERPRETER.to_string()
}

impl Config {
    /// Load config from `path` (or the global location) and apply the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::global_config_path(),
        };

        let mut config = match path {
            Some(ref p) if p.exists() => Self::load_from(p)?,
            _ => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());

        if config.api.api_key.is_none() {
            config.api.api_key = read_dotenv_key(Path::new(".env"));
        }

        Ok(config)
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Save config to a file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get global config path (~/.mem0/config.toml)
    pub fn global_config_path() -> Option<PathBuf> {
        directories::UserDirs::new().map(|u| u.home_dir().join(".mem0").join("config.toml"))
    }

    /// Apply `MEM0_*` variables; non-empty values win over the file
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_API_KEY) {
            self.api.api_key = Some(key);
        }
        if let Some(url) = get(ENV_BASE_URL) {
            self.api.base_url = url;
        }
        if let Some(user) = get(ENV_USER_ID) {
            self.identity.user_id = Some(user);
        }
        if let Some(org) = get(ENV_ORG_ID) {
            self.identity.organization_id = Some(org);
        }
        if let Some(project) = get(ENV_PROJECT_ID) {
            self.identity.project_id = Some(project);
        }
    }

    /// API key, failing with a hint when none is configured
    pub fn require_api_key(&self) -> Result<&str> {
        self.api
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "{} is required.\n\
                     Export it, add it to .env, or run: mem0 init",
                    ENV_API_KEY
                )
            })
    }

    /// Client settings for [`crate::remote::RemoteMemoryClient`]
    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut client = ClientConfig::new(self.require_api_key()?)
            .with_base_url(self.api.base_url.clone())
            .with_timeout(Duration::from_secs(self.api.timeout_secs))
            .with_debug(self.api.debug)
            .with_header_toggles(HeaderToggles {
                user_id: self.headers.send_user_id,
                organization_id: self.headers.send_organization_id,
                project_id: self.headers.send_project_id,
            });

        if let Some(user) = &self.identity.user_id {
            client = client.with_user_id(user.clone());
        }
        if let Some(org) = &self.identity.organization_id {
            client = client.with_organization_id(org.clone());
        }
        if let Some(project) = &self.identity.project_id {
            client = client.with_project_id(project.clone());
        }

        Ok(client)
    }
}

/// Read `MEM0_API_KEY=...` from a dotenv-style file
pub fn read_dotenv_key(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let prefix = format!("{}=", ENV_API_KEY);

    content
        .lines()
        .map(str::trim)
        .map(|line| line.strip_prefix("export ").unwrap_or(line))
        .find_map(|line| line.strip_prefix(prefix.as_str()))
        .map(|v| v.trim().trim_matches('"').trim_matches('\'').to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.timeout_secs, 10);
        assert!(config.headers.send_user_id);
        assert_eq!(config.bridge.python, "python3");
        assert!(config.require_api_key().is_err());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [api]
            api_key = "m0-abc"

            [headers]
            send_user_id = false
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.require_api_key().unwrap(), "m0-abc");
        assert!(!config.headers.send_user_id);
        assert!(config.headers.send_project_id);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::default();
        config.api.api_key = Some("from-file".to_string());
        config.identity.user_id = Some("file-user".to_string());

        let env: HashMap<&str, &str> = [
            (ENV_API_KEY, "from-env"),
            (ENV_ORG_ID, "org-9"),
            (ENV_USER_ID, ""),
        ]
        .into_iter()
        .collect();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.identity.organization_id.as_deref(), Some("org-9"));
        // empty variables do not clear file values
        assert_eq!(config.identity.user_id.as_deref(), Some("file-user"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.api.api_key = Some("m0-key".to_string());
        config.identity.user_id = Some("alex".to_string());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api.api_key.as_deref(), Some("m0-key"));
        assert_eq!(loaded.identity.user_id.as_deref(), Some("alex"));
    }

    #[test]
    fn test_dotenv_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "OTHER=1\nexport MEM0_API_KEY=\"m0-dotenv\"\n").unwrap();
        assert_eq!(read_dotenv_key(&path).as_deref(), Some("m0-dotenv"));

        std::fs::write(&path, "MEM0_API_KEY=\n").unwrap();
        assert_eq!(read_dotenv_key(&path), None);

        assert_eq!(read_dotenv_key(&dir.path().join("missing")), None);
    }

    #[test]
    fn test_client_config_builds_client() {
        let mut config = Config::default();
        config.api.api_key = Some("m0-key".to_string());
        config.api.base_url = "http://localhost:8000/api/v1".to_string();
        config.identity.organization_id = Some("org-1".to_string());

        let client = config.client_config().unwrap().build().unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8000/api/v1/");
    }
}
