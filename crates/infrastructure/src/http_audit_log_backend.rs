use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use auditscope_application::AuditLogBackend;
use auditscope_core::{AppError, AppResult, CallerRole};
use auditscope_domain::{AuditLogPage, PageSize};

use crate::HttpBackendConfig;

const ROLE_PATH: [&str; 3] = ["api", "audit-log", "role"];
const ENTRIES_PATH: [&str; 3] = ["api", "audit-log", "entries"];

#[derive(Debug, Deserialize)]
struct RoleResponse {
    role: String,
}

/// Audit log backend reached over HTTP with JSON bodies.
pub struct HttpAuditLogBackend {
    http_client: reqwest::Client,
    base_url: Url,
    bearer_token: Option<String>,
}

impl HttpAuditLogBackend {
    /// Builds a backend with its own HTTP client.
    pub fn new(config: HttpBackendConfig) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|error| {
                AppError::Internal(format!("failed to build HTTP client: {error}"))
            })?;

        Self::with_client(http_client, config)
    }

    /// Builds a backend over an existing client. The config timeout is not
    /// applied to it.
    pub fn with_client(http_client: reqwest::Client, config: HttpBackendConfig) -> AppResult<Self> {
        if config.base_url.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "audit log base url '{}' cannot carry a path",
                config.base_url
            )));
        }

        Ok(Self {
            http_client,
            base_url: config.base_url,
            bearer_token: config.bearer_token,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                AppError::Internal(format!(
                    "audit log base url '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    async fn get_json<T>(&self, url: Url, endpoint: &str) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        debug!(endpoint, url = %url, "calling audit log endpoint");

        let mut request = self.http_client.get(url);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|error| {
            warn!(endpoint, error = %error, "audit log endpoint unreachable");
            AppError::Remote(format!("failed to call audit log {endpoint} endpoint: {error}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            warn!(endpoint, status = status.as_u16(), "audit log endpoint rejected request");
            return Err(AppError::Remote(format!(
                "audit log {endpoint} endpoint returned status {}: {body}",
                status.as_u16()
            )));
        }

        response.json::<T>().await.map_err(|error| {
            AppError::Remote(format!(
                "failed to parse audit log {endpoint} endpoint response body: {error}"
            ))
        })
    }
}

#[async_trait]
impl AuditLogBackend for HttpAuditLogBackend {
    async fn get_my_role(&self) -> AppResult<CallerRole> {
        let url = self.endpoint(&ROLE_PATH)?;
        let response = self.get_json::<RoleResponse>(url, "role").await?;

        Ok(CallerRole::new(response.role))
    }

    async fn get_audit_logs(&self, page: u64, page_size: PageSize) -> AppResult<AuditLogPage> {
        let mut url = self.endpoint(&ENTRIES_PATH)?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("page_size", &page_size.to_string());

        self.get_json::<AuditLogPage>(url, "entries").await
    }
}
