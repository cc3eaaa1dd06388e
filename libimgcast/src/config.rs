//! Configuration management for Imgcast
//!
//! Credentials live under a single `[twitter]` table. The `[source]` and
//! `[run]` tables are optional and fall back to the imgur front page and a
//! five-post run in the working directory.

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Config file looked up relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding the config file location
pub const CONFIG_ENV_VAR: &str = "IMGCAST_CONFIG";

#[derive(Debug, Deserialize)]
pub struct Config {
    pub twitter: TwitterConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub run: RunConfig,
}

#[derive(Debug, Deserialize)]
pub struct TwitterConfig {
    pub consumer_key: String,
    #[serde(deserialize_with = "deserialize_secret")]
    pub consumer_secret: SecretString,
    pub access_token: String,
    #[serde(deserialize_with = "deserialize_secret")]
    pub access_secret: SecretString,
    /// Screen name whose timeline feeds the duplicate guard
    #[serde(default = "default_account")]
    pub account: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_upload_base")]
    pub upload_base: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub listing_url: String,
    pub link_selector: String,
    pub marker_selector: String,
    pub title_selector: String,
    pub image_selector: String,
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            listing_url: "https://imgur.com".to_string(),
            link_selector: ".post a".to_string(),
            marker_selector: "[itemtype=\"http://schema.org/ImageObject\"]".to_string(),
            title_selector: ".post-title".to_string(),
            image_selector: ".post-image img".to_string(),
            user_agent: concat!("imgcast/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub max_posts: usize,
    pub image_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_posts: 5,
            image_dir: PathBuf::from("."),
        }
    }
}

fn default_account() -> String {
    "useless_imgur".to_string()
}

fn default_api_base() -> String {
    "https://api.twitter.com".to_string()
}

fn default_upload_base() -> String {
    "https://upload.twitter.com".to_string()
}

fn deserialize_secret<'de, D>(deserializer: D) -> std::result::Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path();
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        use secrecy::ExposeSecret;

        let required = [
            ("twitter.consumer_key", self.twitter.consumer_key.as_str()),
            (
                "twitter.consumer_secret",
                self.twitter.consumer_secret.expose_secret(),
            ),
            ("twitter.access_token", self.twitter.access_token.as_str()),
            (
                "twitter.access_secret",
                self.twitter.access_secret.expose_secret(),
            ),
            ("twitter.account", self.twitter.account.as_str()),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField(field.to_string()).into());
            }
        }

        if self.run.max_posts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "run.max_posts".to_string(),
                reason: "must be at least 1".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Resolve the configuration file path
///
/// `IMGCAST_CONFIG` wins when set; otherwise `config.toml` in the working directory.
pub fn resolve_config_path() -> PathBuf {
    match std::env::var(CONFIG_ENV_VAR) {
        Ok(path) if !path.is_empty() => PathBuf::from(shellexpand::tilde(&path).to_string()),
        _ => PathBuf::from(DEFAULT_CONFIG_FILE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImgcastError;
    use secrecy::ExposeSecret;
    use serial_test::serial;

    const MINIMAL: &str = r#"
[twitter]
consumer_key = "ck"
consumer_secret = "cs"
access_token = "at"
access_secret = "as"
"#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::from_toml(MINIMAL).unwrap();

        assert_eq!(config.twitter.consumer_key, "ck");
        assert_eq!(config.twitter.consumer_secret.expose_secret(), "cs");
        assert_eq!(config.twitter.account, "useless_imgur");
        assert_eq!(config.twitter.api_base, "https://api.twitter.com");
        assert_eq!(config.source.listing_url, "https://imgur.com");
        assert_eq!(config.source.link_selector, ".post a");
        assert_eq!(config.run.max_posts, 5);
        assert_eq!(config.run.image_dir, PathBuf::from("."));
    }

    #[test]
    fn test_overrides_are_applied() {
        let content = format!(
            "{}\n[source]\nlisting_url = \"http://localhost:8080\"\n\n[run]\nmax_posts = 2\nimage_dir = \"/tmp/pics\"\n",
            MINIMAL
        );
        let config = Config::from_toml(&content).unwrap();

        assert_eq!(config.source.listing_url, "http://localhost:8080");
        // untouched source fields keep their defaults
        assert_eq!(config.source.title_selector, ".post-title");
        assert_eq!(config.run.max_posts, 2);
        assert_eq!(config.run.image_dir, PathBuf::from("/tmp/pics"));
    }

    #[test]
    fn test_missing_section_is_parse_error() {
        let result = Config::from_toml("[run]\nmax_posts = 5\n");
        assert!(matches!(
            result,
            Err(ImgcastError::Config(ConfigError::ParseError(_)))
        ));
    }

    #[test]
    fn test_empty_credential_is_missing_field() {
        let content = MINIMAL.replace("access_secret = \"as\"", "access_secret = \"  \"");
        let err = Config::from_toml(&content).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing required field: twitter.access_secret"
        );
    }

    #[test]
    fn test_zero_max_posts_is_rejected() {
        let content = format!("{}\n[run]\nmax_posts = 0\n", MINIMAL);
        let err = Config::from_toml(&content).unwrap_err();
        assert!(err.to_string().contains("run.max_posts"));
    }

    #[test]
    fn test_secrets_are_redacted_in_debug() {
        let config = Config::from_toml(MINIMAL).unwrap();
        let debug = format!("{:?}", config.twitter);
        assert!(!debug.contains("\"cs\""));
        assert!(!debug.contains("\"as\""));
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, MINIMAL).unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.twitter.access_token, "at");
    }

    #[test]
    fn test_load_from_missing_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = Config::load_from_path(&dir.path().join("absent.toml"));
        assert!(matches!(
            result,
            Err(ImgcastError::Config(ConfigError::ReadError(_)))
        ));
    }

    #[test]
    #[serial]
    fn test_resolve_config_path_default() {
        std::env::remove_var(CONFIG_ENV_VAR);
        assert_eq!(resolve_config_path(), PathBuf::from("config.toml"));
    }

    #[test]
    #[serial]
    fn test_resolve_config_path_from_env() {
        std::env::set_var(CONFIG_ENV_VAR, "/etc/imgcast/config.toml");
        let path = resolve_config_path();
        std::env::remove_var(CONFIG_ENV_VAR);
        assert_eq!(path, PathBuf::from("/etc/imgcast/config.toml"));
    }
}
