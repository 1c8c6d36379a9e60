//! Parsers for individual environment values.

use std::time::Duration;

use url::Url;

use crate::error::{ConfigError, ConfigResult};

/// Parse an `http`/`https` base URL.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for unparsable URLs, other schemes, or
/// URLs without a host.
pub fn parse_base_url(field: &'static str, value: &str) -> ConfigResult<Url> {
    let url = Url::parse(value.trim())
        .map_err(|_| ConfigError::invalid(field, value, "must be an absolute url"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::invalid(field, value, "scheme must be http or https"));
    }
    if url.host_str().is_none() {
        return Err(ConfigError::invalid(field, value, "url must include a host"));
    }
    Ok(url)
}

/// Parse a positive number of seconds.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for non-numeric or zero values.
pub fn parse_seconds(field: &'static str, value: &str) -> ConfigResult<Duration> {
    let secs: u64 = value
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid(field, value, "must be a whole number of seconds"))?;
    if secs == 0 {
        return Err(ConfigError::invalid(field, value, "must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}

/// Parse a boolean flag (`true/false`, `1/0`, `yes/no`, `on/off`).
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for anything else.
pub fn parse_flag(field: &'static str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(field, value, "must be a boolean")),
    }
}

/// Parse a worker count between 1 and 1024.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for non-numeric or out-of-range values.
pub fn parse_concurrency(field: &'static str, value: &str) -> ConfigResult<u16> {
    let count: u16 = value
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid(field, value, "must be an integer"))?;
    if !(1..=1_024).contains(&count) {
        return Err(ConfigError::invalid(field, value, "must be between 1 and 1024"));
    }
    Ok(count)
}

/// Validate a log format name, returning it lowercased.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] unless the value is `json` or `pretty`.
pub fn parse_log_format(field: &'static str, value: &str) -> ConfigResult<String> {
    let format = value.trim().to_ascii_lowercase();
    if matches!(format.as_str(), "json" | "pretty") {
        Ok(format)
    } else {
        Err(ConfigError::invalid(field, value, "must be json or pretty"))
    }
}
