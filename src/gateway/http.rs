//! `reqwest` implementation of [`DocumentApi`].

use super::wire::{error_message, QueryRequest, QueryResponse, UploadResponse};
use super::DocumentApi;
use crate::config::ClientConfig;
use crate::error::{InsightsError, TransportError};
use crate::file::PdfFile;
use crate::session::Operation;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

/// HTTP client for the extraction backend.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    upload_url: Url,
    query_url: Url,
}

impl HttpGateway {
    /// Build a gateway with its own connection pool.
    pub fn new(config: &ClientConfig) -> Result<Self, InsightsError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| InsightsError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;
        Self::with_client(client, config)
    }

    /// Build a gateway over an existing `reqwest::Client`.
    pub fn with_client(client: Client, config: &ClientConfig) -> Result<Self, InsightsError> {
        let upload_url = config.endpoint_url(&config.upload_path)?;
        let query_url = config.endpoint_url(&config.query_path)?;
        info!(base_url = %config.base_url, "API gateway initialised");
        Ok(Self {
            client,
            upload_url,
            query_url,
        })
    }

    pub fn upload_url(&self) -> &Url {
        &self.upload_url
    }

    pub fn query_url(&self) -> &Url {
        &self.query_url
    }
}

#[async_trait]
impl DocumentApi for HttpGateway {
    async fn upload(&self, file: &PdfFile) -> Result<UploadResponse, TransportError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| TransportError::Request {
                reason: e.to_string(),
            })?;
        let form = Form::new().part("file", part);

        debug!(url = %self.upload_url, file = %file.name, bytes = file.len(), "POST upload");

        let response = self
            .client
            .post(self.upload_url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| send_error(&self.upload_url, e))?;

        decode(Operation::Upload, response).await
    }

    async fn query(&self, prompt: &str) -> Result<QueryResponse, TransportError> {
        debug!(url = %self.query_url, chars = prompt.chars().count(), "POST query");

        let response = self
            .client
            .post(self.query_url.clone())
            .json(&QueryRequest {
                user_prompt: prompt,
            })
            .send()
            .await
            .map_err(|e| send_error(&self.query_url, e))?;

        decode(Operation::Query, response).await
    }
}

fn send_error(url: &Url, e: reqwest::Error) -> TransportError {
    if e.is_builder() {
        TransportError::Request {
            reason: e.to_string(),
        }
    } else {
        warn!(url = %url, error = %e, "request did not reach the backend");
        TransportError::Connect {
            url: url.to_string(),
            reason: e.without_url().to_string(),
        }
    }
}

async fn decode<R: DeserializeOwned>(
    operation: Operation,
    response: Response,
) -> Result<R, TransportError> {
    let status = response.status();

    if status.is_success() {
        return response.json::<R>().await.map_err(|e| {
            warn!(%operation, error = %e, "undecodable response body");
            TransportError::Decode {
                reason: e.without_url().to_string(),
            }
        });
    }

    let body = response.bytes().await.unwrap_or_default();
    let message = error_message(operation, status.as_u16(), status.canonical_reason(), &body);
    warn!(%operation, status = status.as_u16(), message = %message, "backend returned an error");

    Err(TransportError::Status {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_follow_config() {
        let config = ClientConfig::builder()
            .base_url("http://127.0.0.1:9000/api")
            .build()
            .unwrap();
        let gw = HttpGateway::new(&config).unwrap();
        assert_eq!(gw.upload_url().as_str(), "http://127.0.0.1:9000/api/upload");
        assert_eq!(gw.query_url().as_str(), "http://127.0.0.1:9000/api/process");
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_connect_error() {
        // Grab a free port, then close it again.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let config = ClientConfig::builder()
            .base_url(format!("http://127.0.0.1:{port}"))
            .build()
            .unwrap();
        let gw = HttpGateway::new(&config).unwrap();
        let err = gw.query("hello").await.unwrap_err();
        assert!(matches!(err, TransportError::Connect { .. }), "got: {err:?}");
        assert_eq!(err.status(), None);
    }
}
