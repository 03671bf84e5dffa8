use crate::config::types::{
    Config, CrawlerConfig, OutputConfig, UserAgentConfig, PAGE_PLACEHOLDER,
};
use crate::ConfigError;
use url::Url;

/// Upper bound for `concurrency-limit`
pub const MAX_CONCURRENCY: u32 = 256;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_template(&config.base_url_template)?;

    let origin = config
        .resolved_origin()
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid site_origin: {}", e)))?;
    if !is_http(&origin) {
        return Err(ConfigError::InvalidUrl(format!(
            "site_origin must use http or https, got '{}'",
            origin
        )));
    }

    if !config.detail_path_prefix.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "detail_path_prefix must start with '/', got '{}'",
            config.detail_path_prefix
        )));
    }

    if config.max_index_pages < 1 {
        return Err(ConfigError::Validation(
            "max_index_pages must be >= 1".to_string(),
        ));
    }

    if config.pages_to_sample > config.max_index_pages {
        return Err(ConfigError::SampleTooLarge {
            requested: config.pages_to_sample,
            available: config.max_index_pages,
        });
    }

    if config.concurrency_limit < 1 || config.concurrency_limit > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency_limit must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency_limit
        )));
    }

    if config.request_timeout < 1 {
        return Err(ConfigError::Validation(
            "request_timeout must be >= 1 second".to_string(),
        ));
    }

    Ok(())
}

/// Validates the index page template
fn validate_template(template: &str) -> Result<(), ConfigError> {
    let placeholders = template.matches(PAGE_PLACEHOLDER).count();
    if placeholders != 1 {
        return Err(ConfigError::Validation(format!(
            "base_url_template must contain exactly one '{}' placeholder, found {}",
            PAGE_PLACEHOLDER, placeholders
        )));
    }

    let sample = template.replacen(PAGE_PLACEHOLDER, "1", 1);
    let url = Url::parse(&sample).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid base_url_template '{}': {}", template, e))
    })?;

    if !is_http(&url) {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url_template must use http or https, got '{}'",
            template
        )));
    }

    Ok(())
}

fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https") && url.host_str().is_some()
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.json_path.is_empty() {
        return Err(ConfigError::Validation(
            "json_path cannot be empty".to_string(),
        ));
    }

    if config.csv_path.is_empty() {
        return Err(ConfigError::Validation(
            "csv_path cannot be empty".to_string(),
        ));
    }

    if config.json_path == config.csv_path {
        return Err(ConfigError::Validation(format!(
            "json_path and csv_path must differ, both are '{}'",
            config.json_path
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
