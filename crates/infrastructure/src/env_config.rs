use std::env;
use std::time::Duration;

use auditscope_application::{CachePolicy, ViewerConfig};
use auditscope_core::{AppError, AppResult};
use auditscope_domain::PageSize;
use url::Url;

const BASE_URL_VAR: &str = "AUDIT_LOG_API_BASE_URL";
const TOKEN_VAR: &str = "AUDIT_LOG_API_TOKEN";
const TIMEOUT_VAR: &str = "AUDIT_LOG_HTTP_TIMEOUT_MS";
const PAGE_SIZE_VAR: &str = "AUDIT_LOG_PAGE_SIZE";
const STALE_AFTER_VAR: &str = "AUDIT_LOG_STALE_AFTER_MS";
const STALE_WHILE_REVALIDATE_VAR: &str = "AUDIT_LOG_STALE_WHILE_REVALIDATE";

const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// Connection settings for [`crate::HttpAuditLogBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpBackendConfig {
    /// Service root; endpoint paths are appended to it.
    pub base_url: Url,
    /// Sent as `Authorization: Bearer <token>` when present.
    pub bearer_token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl HttpBackendConfig {
    /// Creates a config with no token and the default timeout.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            bearer_token: None,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

/// Reads a variable from the process environment.
///
/// Pass this to the loaders in production; tests pass a closure over a map.
#[must_use]
pub fn process_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

/// Loads backend connection settings.
pub fn load_http_backend_config<F>(lookup: F) -> AppResult<HttpBackendConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let raw_base_url = required_env(&lookup, BASE_URL_VAR)?;
    let base_url = Url::parse(raw_base_url.trim()).map_err(|error| {
        AppError::Validation(format!(
            "invalid {BASE_URL_VAR} value '{raw_base_url}': {error}"
        ))
    })?;
    if !matches!(base_url.scheme(), "http" | "https") {
        return Err(AppError::Validation(format!(
            "{BASE_URL_VAR} must use http or https, got '{}'",
            base_url.scheme()
        )));
    }

    let bearer_token = optional_env(&lookup, TOKEN_VAR);
    let timeout_ms = parse_env_u64(&lookup, TIMEOUT_VAR, DEFAULT_TIMEOUT_MS)?;
    if timeout_ms == 0 {
        return Err(AppError::Validation(format!(
            "{TIMEOUT_VAR} must be greater than zero"
        )));
    }

    Ok(HttpBackendConfig {
        base_url,
        bearer_token,
        timeout: Duration::from_millis(timeout_ms),
    })
}

/// Loads page size and cache policy, falling back to the defaults.
pub fn load_viewer_config<F>(lookup: F) -> AppResult<ViewerConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = ViewerConfig::default();

    let page_size = parse_env_u64(&lookup, PAGE_SIZE_VAR, defaults.page_size.get())?;
    let page_size = PageSize::new(page_size).map_err(|_| {
        AppError::Validation(format!("{PAGE_SIZE_VAR} must be greater than zero"))
    })?;

    let stale_after_ms = parse_env_u64(
        &lookup,
        STALE_AFTER_VAR,
        u64::try_from(defaults.cache_policy.stale_after.as_millis()).unwrap_or(u64::MAX),
    )?;
    let stale_while_revalidate = parse_env_bool(
        &lookup,
        STALE_WHILE_REVALIDATE_VAR,
        defaults.cache_policy.stale_while_revalidate,
    )?;

    Ok(ViewerConfig {
        page_size,
        cache_policy: CachePolicy {
            stale_after: Duration::from_millis(stale_after_ms),
            stale_while_revalidate,
        },
    })
}

fn required_env<F>(lookup: &F, name: &str) -> AppResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    optional_env(lookup, name).ok_or_else(|| AppError::Validation(format!("{name} is required")))
}

fn optional_env<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_env_u64<F>(lookup: &F, name: &str, default: u64) -> AppResult<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match optional_env(lookup, name) {
        Some(value) => value.parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}

fn parse_env_bool<F>(lookup: &F, name: &str, default: bool) -> AppResult<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match optional_env(lookup, name) {
        Some(value) => match value.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(AppError::Validation(format!(
                "invalid {name} value '{value}': expected true or false"
            ))),
        },
        None => Ok(default),
    }
}
