//! Transport seam and the HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::api_request::{ApiRequest, AttachmentSource};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Executes [`ApiRequest`]s and returns the raw JSON response envelope.
///
/// Decoding the envelope into typed payloads is left to the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<Value>;
}

/// [`Transport`] speaking the REST API over HTTP.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Creates a transport from `config`.
    ///
    /// # Errors
    /// Fails if the token is not a valid header value or the HTTP client
    /// cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ClientError::Transport(format!("Invalid token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .default_headers(headers)
            .build()?;

        // Ensure base URL doesn't have trailing slash
        let base_url = config.api_base.trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, datasheet: &str, resource: &str) -> String {
        format!(
            "{}/fusion/v1/datasheets/{}/{}",
            self.base_url, datasheet, resource
        )
    }

    async fn upload_form(&self, source: &AttachmentSource) -> Result<Form> {
        let part = match source {
            AttachmentSource::Url(url) => {
                let resp = self.client.get(url).send().await?.error_for_status()?;
                let mime = resp
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let name = url
                    .rsplit('/')
                    .next()
                    .filter(|s| !s.is_empty())
                    .unwrap_or("file")
                    .to_string();
                let bytes = resp.bytes().await?;
                Part::bytes(bytes.to_vec()).file_name(name).mime_str(&mime)?
            }
            AttachmentSource::Path(path) => {
                let bytes = tokio::fs::read(path).await?;
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "file".to_string());
                Part::bytes(bytes).file_name(name)
            }
        };
        Ok(Form::new().part("files", part))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<Value> {
        tracing::debug!(
            "{} on datasheet {}",
            request.name(),
            request.datasheet()
        );

        let builder = match &request {
            ApiRequest::ListFields { datasheet } => {
                self.client.get(self.endpoint(datasheet, "fields"))
            }
            ApiRequest::GetRecords { datasheet, query } => self
                .client
                .get(self.endpoint(datasheet, "records"))
                .query(query),
            ApiRequest::CreateRecords { datasheet, body } => self
                .client
                .post(self.endpoint(datasheet, "records"))
                .json(body),
            ApiRequest::UpdateRecords { datasheet, body } => self
                .client
                .patch(self.endpoint(datasheet, "records"))
                .json(body),
            ApiRequest::DeleteRecords {
                datasheet,
                record_ids,
            } => {
                let query: Vec<(&str, &str)> = record_ids
                    .iter()
                    .map(|id| ("recordIds", id.as_str()))
                    .collect();
                self.client
                    .delete(self.endpoint(datasheet, "records"))
                    .query(&query)
            }
            ApiRequest::UploadAttachment { datasheet, source } => {
                let form = self.upload_form(source).await?;
                self.client
                    .post(self.endpoint(datasheet, "attachments"))
                    .multipart(form)
            }
        };

        let resp = builder.send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| ClientError::Decode(format!("HTTP {} response: {}", status, e)))
    }
}
