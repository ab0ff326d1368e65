use crate::config::types::{Config, CrawlerConfig, FetchConfig, OutputConfig, SeedConfig};
use crate::url::normalize_target;
use crate::ConfigError;

/// Upper bound on simultaneous fetches
pub const MAX_CONCURRENCY_LIMIT: u32 = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_seed_config(&config.seed)?;
    validate_crawler_config(&config.crawler)?;
    validate_fetch_config(&config.fetch)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the seed section: exactly one mode, every URL well formed
fn validate_seed_config(config: &SeedConfig) -> Result<(), ConfigError> {
    match (&config.domain, &config.urls) {
        (Some(_), Some(_)) => {
            return Err(ConfigError::Validation(
                "seed must set either 'domain' or 'urls', not both".to_string(),
            ));
        }
        (None, None) => {
            return Err(ConfigError::Validation(
                "seed must set either 'domain' or 'urls'".to_string(),
            ));
        }
        (Some(domain), None) => validate_seed_url(domain)?,
        (None, Some(urls)) => {
            if urls.is_empty() {
                return Err(ConfigError::Validation(
                    "seed 'urls' must contain at least one URL".to_string(),
                ));
            }
            for url in urls {
                validate_seed_url(url)?;
            }
        }
    }

    if let Some(prefix) = &config.scope_prefix {
        if config.urls.is_some() {
            return Err(ConfigError::Validation(
                "'scope-prefix' only applies to 'domain' seeds".to_string(),
            ));
        }
        validate_seed_url(prefix)?;
    }

    Ok(())
}

fn validate_seed_url(url: &str) -> Result<(), ConfigError> {
    normalize_target(url)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", url, e)))
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrency < 1 || config.max_concurrency > MAX_CONCURRENCY_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY_LIMIT, config.max_concurrency
        )));
    }

    if config.run_timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "run_timeout_secs must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates fetch engine configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be greater than 0".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be greater than 0".to_string(),
        ));
    }

    if let Some(agent) = &config.user_agent {
        if agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user_agent cannot be blank".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    validate_extension(&config.extension)?;

    if let Some(path) = &config.summary_path {
        if path.is_empty() {
            return Err(ConfigError::Validation(
                "summary_path cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Extensions are bare words like `md` or `txt`
fn validate_extension(extension: &str) -> Result<(), ConfigError> {
    if extension.is_empty() {
        return Err(ConfigError::Validation(
            "extension cannot be empty".to_string(),
        ));
    }

    if extension.starts_with('.')
        || !extension
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(ConfigError::Validation(format!(
            "extension must be a bare name like 'md', got '{}'",
            extension
        )));
    }

    Ok(())
}
