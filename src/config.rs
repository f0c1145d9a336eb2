use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Directory holding the persisted settings blob
    #[serde(default = "default_settings_dir")]
    pub settings_dir: PathBuf,
    #[serde(default)]
    pub fetch: FetchConfig,
}

fn default_bind_address() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_settings_dir() -> PathBuf {
    PathBuf::from(".")
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    /// Deadline for a single feed fetch, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_reddit_base_url")]
    pub reddit_base_url: String,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    "LittlePrinter/1.0 (Daily Strip)".to_string()
}

fn default_reddit_base_url() -> String {
    "https://www.reddit.com".to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            reddit_base_url: default_reddit_base_url(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            settings_dir: default_settings_dir(),
            fetch: FetchConfig::default(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bind_address, "0.0.0.0:3000");
        assert_eq!(config.settings_dir, PathBuf::from("."));
        assert_eq!(config.fetch.timeout_secs, 10);
        assert_eq!(config.fetch.reddit_base_url, "https://www.reddit.com");
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
            bind_address = "127.0.0.1:8080"
            settings_dir = "/var/lib/little-printer"

            [fetch]
            timeout_secs = 4
            user_agent = "Test/1.0"
            reddit_base_url = "http://localhost:9999"
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(config.settings_dir, PathBuf::from("/var/lib/little-printer"));
        assert_eq!(config.fetch.timeout_secs, 4);
        assert_eq!(config.fetch.user_agent, "Test/1.0");
        assert_eq!(config.fetch.reddit_base_url, "http://localhost:9999");
    }

    #[test]
    fn test_partial_fetch_table_keeps_defaults() {
        let content = r#"
            [fetch]
            timeout_secs = 3
        "#;

        let config = Config::from_str(content).unwrap();

        assert_eq!(config.fetch.timeout_secs, 3);
        assert_eq!(config.fetch.user_agent, "LittlePrinter/1.0 (Daily Strip)");
        assert_eq!(config.bind_address, "0.0.0.0:3000");
    }

    #[test]
    fn test_empty_config_is_all_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.fetch.timeout_secs, 10);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("/nonexistent/path/config.toml").unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:3000");
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let content = "this is not valid toml {{{";

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();

        assert!(Config::load(temp_file.path()).is_err());
        assert!(Config::load_or_default(temp_file.path()).is_err());
    }

    #[test]
    fn test_wrong_field_type() {
        let content = r#"
            [fetch]
            timeout_secs = "soon"
        "#;

        assert!(Config::from_str(content).is_err());
    }
}
