//! Configuration structures and loading logic.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Production API base URL.
pub const DEFAULT_API_BASE: &str = "https://onlyfans.com/api2/v2";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub options: OptionsConfig,

    #[serde(default)]
    pub drm: DrmConfig,
}

/// Account credentials, copied from a logged-in browser session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Numeric account id (`auth_id` cookie).
    #[serde(default)]
    pub identity_id: String,

    /// Browser user agent string.
    #[serde(default)]
    pub user_agent: String,

    /// Session cookie (`sess`).
    #[serde(default)]
    pub session_token: String,

    /// Client token (`x-bc` header).
    #[serde(default)]
    pub client_token: String,
}

/// Download options configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Root directory for downloads.
    #[serde(default = "default_download_directory")]
    pub download_directory: PathBuf,

    /// Local dynamic rules JSON file.
    #[serde(default = "default_dynamic_rules")]
    pub dynamic_rules: PathBuf,

    /// Remote dynamic rules document, fetched once at startup when set.
    #[serde(default)]
    pub dynamic_rules_url: Option<String>,

    /// Maximum concurrent post page fetches.
    #[serde(default = "default_concurrency")]
    pub page_concurrency: usize,

    /// Maximum concurrent media acquisitions.
    #[serde(default = "default_concurrency")]
    pub download_concurrency: usize,

    /// ffmpeg binary used to decrypt protected media.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            download_directory: default_download_directory(),
            dynamic_rules: default_dynamic_rules(),
            dynamic_rules_url: None,
            page_concurrency: default_concurrency(),
            download_concurrency: default_concurrency(),
            ffmpeg_path: default_ffmpeg_path(),
            api_base: default_api_base(),
        }
    }
}

/// Widevine device credentials used for protected media.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrmConfig {
    /// RSA private key (PEM, PKCS#1 or PKCS#8).
    #[serde(default = "default_private_key")]
    pub private_key: PathBuf,

    /// Serialized client identification blob.
    #[serde(default = "default_client_id")]
    pub client_id: PathBuf,
}

impl Default for DrmConfig {
    fn default() -> Self {
        Self {
            private_key: default_private_key(),
            client_id: default_client_id(),
        }
    }
}

fn default_download_directory() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_dynamic_rules() -> PathBuf {
    PathBuf::from("dynamic_rules.json")
}

fn default_concurrency() -> usize {
    10
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_private_key() -> PathBuf {
    PathBuf::from("device/private_key.pem")
}

fn default_client_id() -> PathBuf {
    PathBuf::from("device/client_id.bin")
}

/// Outcome of looking for a configuration file.
#[derive(Debug)]
pub enum ConfigState {
    /// An existing file was parsed.
    Loaded(Config),
    /// No file existed; a template was written at this path.
    TemplateCreated(PathBuf),
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!("Configuration file not found: {}", path.display()))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the configuration, or write an empty template when none exists.
    pub fn load_or_init(path: &Path) -> Result<ConfigState> {
        if path.exists() {
            return Ok(ConfigState::Loaded(Self::load(path)?));
        }

        Self::default().save(path)?;
        Ok(ConfigState::TemplateCreated(path.to_path_buf()))
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the effective download directory.
    pub fn download_directory(&self) -> &Path {
        &self.options.download_directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_template_created_when_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        match Config::load_or_init(&path).unwrap() {
            ConfigState::TemplateCreated(p) => assert_eq!(p, path),
            ConfigState::Loaded(_) => panic!("expected a template"),
        }
        assert!(path.exists());

        // Second call parses the template back.
        match Config::load_or_init(&path).unwrap() {
            ConfigState::Loaded(config) => {
                assert_eq!(config.auth, AuthConfig::default());
                assert_eq!(config.options.download_concurrency, 10);
            }
            ConfigState::TemplateCreated(_) => panic!("template should be reused"),
        }
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config: Config = toml::from_str(
            r#"
            [auth]
            identity_id = "12345"
            user_agent = "Mozilla/5.0"
            session_token = "sess"
            client_token = "xbc"
            "#,
        )
        .unwrap();

        assert_eq!(config.auth.identity_id, "12345");
        assert_eq!(config.download_directory(), Path::new("downloads"));
        assert_eq!(config.options.page_concurrency, 10);
        assert_eq!(config.options.api_base, DEFAULT_API_BASE);
        assert_eq!(config.drm.client_id, PathBuf::from("device/client_id.bin"));
    }
}
