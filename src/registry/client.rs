use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client as HttpClient, Response, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::api::{ImageEndpoint, RawAsset, RegistryApi};
use super::config::RegistryConfig;
use super::error::{FetchError, RegistryError, truncate_body};
use super::retry::RetryPolicy;
use super::schema::RegistrySchema;
use crate::auth::{ClientCredentialsSource, CredentialCache};
use crate::constants::MAX_ERROR_BODY_CHARS;

const CLIENT_ID_HEADER: &str = "X-IBM-Client-Id";
const ACCEPT_JSON: &str = "application/json";
const ACCEPT_IMAGE: &str = "image/*";
const ACCEPT_DOWNLOAD: &str = "image/*,application/octet-stream;q=0.8,*/*;q=0.5";

/// HTTPS JSON client for the trademark registry.
///
/// Every authorized call takes its bearer token from the shared [`CredentialCache`]
/// and runs under a [`RetryPolicy`]: one refresh on 401, then [`crate::auth::AuthError::Rejected`].
#[derive(Debug, Clone)]
pub struct RegistryClient {
    http: HttpClient,
    config: RegistryConfig,
    credentials: Arc<CredentialCache>,
    schema: RegistrySchema,
}

impl RegistryClient {
    pub fn new(http: HttpClient, config: RegistryConfig, credentials: Arc<CredentialCache>) -> Self {
        Self {
            http,
            config,
            credentials,
            schema: RegistrySchema::EUIPO_V1,
        }
    }

    /// Builds the HTTP client, token source and credential cache from configuration.
    pub fn from_config(config: RegistryConfig) -> Result<Self, RegistryError> {
        let http = HttpClient::builder()
            .user_agent(concat!("markwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RegistryError::Transport {
                operation: "client_init",
                reason: e.to_string(),
            })?;
        let source = ClientCredentialsSource::from_config(http.clone(), &config);
        let credentials = Arc::new(CredentialCache::new(Arc::new(source)));
        Ok(Self::new(http, config, credentials))
    }

    /// Overrides the field mapping (for registries with another schema version).
    pub fn with_schema(mut self, schema: RegistrySchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn credentials(&self) -> &Arc<CredentialCache> {
        &self.credentials
    }

    /// `{base_url}/{id}/{suffix...}` with the id percent-encoded as one path segment.
    fn record_url(&self, operation: &'static str, id: &str, suffix: &str) -> Result<Url, FetchError> {
        let invalid = |reason: String| RegistryError::Transport { operation, reason };

        let mut url = Url::parse(&self.config.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid(format!("base URL cannot carry a path: {}", self.config.base_url)))?
            .pop_if_empty()
            .push(id)
            .extend(suffix.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    async fn send_authorized(
        &self,
        operation: &'static str,
        url: &str,
        query: &[(&str, String)],
        accept: &'static str,
        timeout: Duration,
    ) -> Result<Response, FetchError> {
        let mut policy = RetryPolicy::new();

        loop {
            let credential = self.credentials.get_token().await?;

            let response = self
                .http
                .get(url)
                .query(query)
                .timeout(timeout)
                .header(AUTHORIZATION, format!("Bearer {}", credential.token()))
                .header(CLIENT_ID_HEADER, &self.config.client_id)
                .header(ACCEPT, accept)
                .send()
                .await
                .map_err(|e| RegistryError::from_reqwest(operation, &e))?;

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED {
                warn!(
                    operation,
                    refreshed = policy.has_refreshed(),
                    "Registry rejected bearer token"
                );
                policy.on_unauthorized()?;
                self.credentials.invalidate(credential.token()).await;
                continue;
            }

            return check_status(operation, response).await;
        }
    }

    async fn read_json(operation: &'static str, response: Response) -> Result<Value, FetchError> {
        let body = response
            .bytes()
            .await
            .map_err(|e| RegistryError::from_reqwest(operation, &e))?;
        serde_json::from_slice(&body).map_err(|e| {
            FetchError::from(RegistryError::Malformed {
                operation,
                reason: e.to_string(),
            })
        })
    }

    async fn read_asset(operation: &'static str, response: Response) -> Result<RawAsset, FetchError> {
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RegistryError::from_reqwest(operation, &e))?;
        Ok(RawAsset {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}

async fn check_status(operation: &'static str, response: Response) -> Result<Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RegistryError::Status {
        operation,
        status: status.as_u16(),
        body: truncate_body(&body, MAX_ERROR_BODY_CHARS),
    }
    .into())
}

impl RegistryApi for RegistryClient {
    fn schema(&self) -> &RegistrySchema {
        &self.schema
    }

    #[instrument(skip(self))]
    async fn search(&self, filter: &str, size: u32) -> Result<Value, FetchError> {
        let params = [("query", filter.to_string()), ("size", size.to_string())];
        let response = self
            .send_authorized(
                "search",
                &self.config.base_url,
                &params,
                ACCEPT_JSON,
                self.config.search_timeout,
            )
            .await?;
        Self::read_json("search", response).await
    }

    #[instrument(skip(self))]
    async fn detail(&self, id: &str, fields: Option<&str>) -> Result<Value, FetchError> {
        let params: Vec<(&str, String)> = fields
            .map(|f| vec![("fields", f.to_string())])
            .unwrap_or_default();
        let url = self.record_url("detail", id, "")?;
        let response = self
            .send_authorized(
                "detail",
                url.as_str(),
                &params,
                ACCEPT_JSON,
                self.config.detail_timeout,
            )
            .await?;
        Self::read_json("detail", response).await
    }

    #[instrument(skip(self))]
    async fn image(&self, id: &str, endpoint: ImageEndpoint) -> Result<RawAsset, FetchError> {
        let suffix = match endpoint {
            ImageEndpoint::Thumbnail => self.schema.thumbnail_suffix,
            ImageEndpoint::Full => self.schema.full_image_suffix,
        };
        let url = self.record_url("image", id, suffix)?;
        let response = self
            .send_authorized("image", url.as_str(), &[], ACCEPT_IMAGE, self.config.image_timeout)
            .await?;
        Self::read_asset("image", response).await
    }

    #[instrument(skip(self))]
    async fn download(&self, url: &str) -> Result<RawAsset, FetchError> {
        debug!("Downloading image referenced by registry record");
        let response = self
            .http
            .get(url)
            .timeout(self.config.download_timeout)
            .header(ACCEPT, ACCEPT_DOWNLOAD)
            .send()
            .await
            .map_err(|e| RegistryError::from_reqwest("download", &e))?;
        let response = check_status("download", response).await?;
        Self::read_asset("download", response).await
    }
}
