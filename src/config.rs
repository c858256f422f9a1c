//! Configuration for the HTTP gateway.
//!
//! The backend address is always injected through [`ClientConfig`]; the
//! gateway itself knows no default host. [`ClientConfig::default()`] points at
//! a backend on `localhost:8000`, where the reference service listens.

use crate::error::InsightsError;
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Default backend address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Connection settings for the extraction backend.
///
/// Built via [`ClientConfig::builder()`] or using [`ClientConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf_insights::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .base_url("http://10.0.0.5:8000/")
///     .build()
///     .unwrap();
/// assert_eq!(config.endpoint_url(&config.upload_path).unwrap().as_str(),
///            "http://10.0.0.5:8000/upload");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Scheme, host and optional path prefix of the backend. Trailing slashes
    /// are stripped. Default: `http://localhost:8000`.
    pub base_url: String,

    /// Path of the multipart upload endpoint. Default: `/upload`.
    pub upload_path: String,

    /// Path of the prompt endpoint. Default: `/process`.
    pub query_path: String,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            upload_path: "/upload".to_string(),
            query_path: "/process".to_string(),
            user_agent: concat!("pdf-insights/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Join `path` onto the base URL.
    pub fn endpoint_url(&self, path: &str) -> Result<Url, InsightsError> {
        let raw = format!("{}{}", self.base_url, path);
        Url::parse(&raw)
            .map_err(|e| InsightsError::InvalidConfig(format!("bad endpoint URL '{raw}': {e}")))
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.config.base_url = url.trim().trim_end_matches('/').to_string();
        self
    }

    pub fn upload_path(mut self, path: impl Into<String>) -> Self {
        self.config.upload_path = normalise_path(path.into());
        self
    }

    pub fn query_path(mut self, path: impl Into<String>) -> Self {
        self.config.query_path = normalise_path(path.into());
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, InsightsError> {
        let c = &self.config;
        let url = Url::parse(&c.base_url).map_err(|e| {
            InsightsError::InvalidConfig(format!("base URL '{}' is not a URL: {e}", c.base_url))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(InsightsError::InvalidConfig(format!(
                "base URL must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(InsightsError::InvalidConfig(
                "base URL must not carry a query string or fragment".into(),
            ));
        }
        if c.upload_path == c.query_path {
            return Err(InsightsError::InvalidConfig(format!(
                "upload and query endpoints must differ, both are '{}'",
                c.upload_path
            )));
        }
        Ok(self.config)
    }
}

fn normalise_path(path: String) -> String {
    let trimmed = path.trim();
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_backend() {
        let c = ClientConfig::default();
        assert_eq!(c.base_url, "http://localhost:8000");
        assert_eq!(
            c.endpoint_url(&c.upload_path).unwrap().as_str(),
            "http://localhost:8000/upload"
        );
        assert_eq!(
            c.endpoint_url(&c.query_path).unwrap().as_str(),
            "http://localhost:8000/process"
        );
        assert!(c.user_agent.starts_with("pdf-insights/"));
    }

    #[test]
    fn trailing_slash_and_prefix_are_kept_clean() {
        let c = ClientConfig::builder()
            .base_url("https://api.example.com/v1/")
            .query_path("ask")
            .build()
            .unwrap();
        assert_eq!(c.base_url, "https://api.example.com/v1");
        assert_eq!(
            c.endpoint_url(&c.query_path).unwrap().as_str(),
            "https://api.example.com/v1/ask"
        );
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = ClientConfig::builder()
            .base_url("ftp://example.com")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("http or https"), "got: {err}");
    }

    #[test]
    fn rejects_garbage_url() {
        assert!(ClientConfig::builder().base_url("not a url").build().is_err());
    }

    #[test]
    fn rejects_identical_endpoints() {
        let err = ClientConfig::builder()
            .upload_path("/x")
            .query_path("x")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn rejects_query_string_in_base() {
        assert!(ClientConfig::builder()
            .base_url("http://localhost:8000/?token=1")
            .build()
            .is_err());
    }
}
