use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variable consulted when `[reader] api-key` is not set
pub const READER_API_KEY_ENV: &str = "JINA_API_KEY";

/// Environment variable consulted when `[knowledge-base] api-key` is not set
pub const KB_API_KEY_ENV: &str = "DIFY_API_KEY";

/// Loads and parses a configuration file from the given path
///
/// Credentials missing from the file are filled in from the environment
/// before validation.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sitemap_reader::config::load_config;
///
/// let config = load_config(Path::new("crawl.toml")).unwrap();
/// println!("Target: {}", config.crawl.target);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut config = parse_config(&content)?;
    apply_env_credentials(&mut config);
    validate(&config)?;
    Ok(config)
}

/// Parses configuration text without touching the environment or validating
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Fills unset credentials from `JINA_API_KEY` / `DIFY_API_KEY`
pub fn apply_env_credentials(config: &mut Config) {
    if config.reader.api_key.is_none() {
        config.reader.api_key = std::env::var(READER_API_KEY_ENV).ok();
    }

    if let Some(kb) = config.knowledge_base.as_mut() {
        if kb.api_key.is_none() {
            kb.api_key = std::env::var(KB_API_KEY_ENV).ok();
        }
    }
}

/// Computes a SHA-256 hash of the configuration file content
///
/// This is recorded in the run summary so two output directories can be
/// traced back to the configuration that produced them.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
