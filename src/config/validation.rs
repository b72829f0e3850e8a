use crate::config::types::{Config, CrawlConfig, KnowledgeBaseConfig, OutputConfig, ReaderConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_reader_config(&config.reader)?;
    validate_crawl_config(&config.crawl)?;
    validate_output_config(&config.output)?;
    if let Some(kb) = &config.knowledge_base {
        validate_knowledge_base_config(kb)?;
    }
    Ok(())
}

/// Validates reader API configuration
fn validate_reader_config(config: &ReaderConfig) -> Result<(), ConfigError> {
    if config.request_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout must be >= 1 second, got {}",
            config.request_timeout
        )));
    }

    if let Some(endpoint) = &config.endpoint {
        validate_http_url(endpoint, "endpoint")?;
    }

    Ok(())
}

/// Validates crawl loop configuration
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.target.trim().is_empty() {
        return Err(ConfigError::Validation("target cannot be empty".to_string()));
    }
    validate_http_url(&config.target, "target")?;

    // The upper bound depends on the resolved list and is checked at run time
    if config.start_index < 1 {
        return Err(ConfigError::Validation(format!(
            "start_index must be >= 1, got {}",
            config.start_index
        )));
    }

    if !config.min_delay.is_finite() || config.min_delay < 0.0 {
        return Err(ConfigError::Validation(format!(
            "min_delay must be >= 0, got {}",
            config.min_delay
        )));
    }

    if !config.max_delay.is_finite() || config.max_delay < config.min_delay {
        return Err(ConfigError::Validation(format!(
            "max_delay must be >= min_delay ({}), got {}",
            config.min_delay, config.max_delay
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.root.is_empty() {
        return Err(ConfigError::Validation("output root cannot be empty".to_string()));
    }

    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates knowledge-base configuration
fn validate_knowledge_base_config(config: &KnowledgeBaseConfig) -> Result<(), ConfigError> {
    validate_http_url(&config.base_url, "base_url")?;

    if config.top_k < 1 {
        return Err(ConfigError::Validation(format!(
            "top_k must be >= 1, got {}",
            config.top_k
        )));
    }

    if !(0.0..=1.0).contains(&config.score_threshold) {
        return Err(ConfigError::Validation(format!(
            "score_threshold must be within [0, 1], got {}",
            config.score_threshold
        )));
    }

    if !(0.0..=1.0).contains(&config.weights) {
        return Err(ConfigError::Validation(format!(
            "weights must be within [0, 1], got {}",
            config.weights
        )));
    }

    Ok(())
}

/// Checks that a value parses as an http(s) URL
fn validate_http_url(value: &str, field: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    fn base_config() -> Config {
        parse_config(
            r#"
[crawl]
target = "https://example.com/sitemap.xml"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_valid_defaults() {
        assert!(validate(&base_config()).is_ok());
    }

    #[test]
    fn test_validate_http_url() {
        assert!(validate_http_url("https://example.com/sitemap.xml", "target").is_ok());
        assert!(validate_http_url("http://localhost:8080/", "target").is_ok());

        assert!(validate_http_url("", "target").is_err());
        assert!(validate_http_url("not a url", "target").is_err());
        assert!(validate_http_url("ftp://example.com/file", "target").is_err());
    }

    #[test]
    fn test_start_index_zero_rejected() {
        let mut config = base_config();
        config.crawl.start_index = 0;
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_delay_bounds() {
        let mut config = base_config();
        config.crawl.min_delay = 0.0;
        config.crawl.max_delay = 0.0;
        assert!(validate(&config).is_ok());

        config.crawl.min_delay = -1.0;
        assert!(validate(&config).is_err());

        config.crawl.min_delay = 4.0;
        config.crawl.max_delay = 2.0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_request_timeout_zero_rejected() {
        let mut config = base_config();
        config.reader.request_timeout = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let mut config = base_config();
        config.reader.endpoint = Some("::not-a-url".to_string());
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_knowledge_base_ranges() {
        let mut config = parse_config(
            r#"
[crawl]
target = "https://example.com/sitemap.xml"

[knowledge-base]
weights = 1.5
"#,
        )
        .unwrap();
        assert!(validate(&config).is_err());

        if let Some(kb) = config.knowledge_base.as_mut() {
            kb.weights = 0.5;
            kb.top_k = 0;
        }
        assert!(validate(&config).is_err());
    }
}
