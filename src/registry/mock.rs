use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{Value, json};

use super::api::{ImageEndpoint, RawAsset, RegistryApi};
use super::error::{FetchError, RegistryError};
use super::schema::RegistrySchema;

#[derive(Default)]
struct MockState {
    searches: Vec<(String, Result<Value, FetchError>)>,
    details: HashMap<(String, bool), Value>,
    images: HashMap<(String, ImageEndpoint), RawAsset>,
    downloads: HashMap<String, RawAsset>,
    calls: Vec<String>,
}

/// In-memory registry with canned responses and a call log.
///
/// Unconfigured searches return an empty result list; unconfigured detail, image and
/// download requests fail with HTTP 404.
#[derive(Clone, Default)]
pub struct MockRegistry {
    state: Arc<Mutex<MockState>>,
    schema: RegistrySchema,
    search_delay: Duration,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every search, for deadline tests.
    pub fn with_search_delay(mut self, delay: Duration) -> Self {
        self.search_delay = delay;
        self
    }

    /// Answers searches whose filter contains `pattern`. First match wins.
    pub fn on_search(&self, pattern: &str, response: Value) -> &Self {
        self.state
            .lock()
            .searches
            .push((pattern.to_string(), Ok(response)));
        self
    }

    /// Fails searches whose filter contains `pattern`.
    pub fn fail_search(&self, pattern: &str, err: FetchError) -> &Self {
        self.state
            .lock()
            .searches
            .push((pattern.to_string(), Err(err)));
        self
    }

    /// Sets the detail record returned with (`with_fields = true`) or without a `fields` selection.
    pub fn on_detail(&self, id: &str, with_fields: bool, record: Value) -> &Self {
        self.state
            .lock()
            .details
            .insert((id.to_string(), with_fields), record);
        self
    }

    pub fn on_image(&self, id: &str, endpoint: ImageEndpoint, asset: RawAsset) -> &Self {
        self.state
            .lock()
            .images
            .insert((id.to_string(), endpoint), asset);
        self
    }

    pub fn on_download(&self, url: &str, asset: RawAsset) -> &Self {
        self.state.lock().downloads.insert(url.to_string(), asset);
        self
    }

    /// Every call made so far, e.g. `search:<filter>`, `detail:<id>:fields`, `image:<id>:thumbnail`.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    /// Number of calls whose log entry starts with `prefix`.
    pub fn count_calls(&self, prefix: &str) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn not_found(operation: &'static str) -> FetchError {
        RegistryError::Status {
            operation,
            status: 404,
            body: "not found".to_string(),
        }
        .into()
    }
}

impl RegistryApi for MockRegistry {
    fn schema(&self) -> &RegistrySchema {
        &self.schema
    }

    async fn search(&self, filter: &str, _size: u32) -> Result<Value, FetchError> {
        self.state.lock().calls.push(format!("search:{filter}"));
        if !self.search_delay.is_zero() {
            tokio::time::sleep(self.search_delay).await;
        }
        let state = self.state.lock();
        state
            .searches
            .iter()
            .find(|(pattern, _)| filter.contains(pattern.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| Ok(json!({ self.schema.results_field: [] })))
    }

    async fn detail(&self, id: &str, fields: Option<&str>) -> Result<Value, FetchError> {
        let mut state = self.state.lock();
        let label = if fields.is_some() { ":fields" } else { "" };
        state.calls.push(format!("detail:{id}{label}"));
        state
            .details
            .get(&(id.to_string(), fields.is_some()))
            .cloned()
            .ok_or_else(|| Self::not_found("detail"))
    }

    async fn image(&self, id: &str, endpoint: ImageEndpoint) -> Result<RawAsset, FetchError> {
        let mut state = self.state.lock();
        let label = match endpoint {
            ImageEndpoint::Thumbnail => "thumbnail",
            ImageEndpoint::Full => "full",
        };
        state.calls.push(format!("image:{id}:{label}"));
        state
            .images
            .get(&(id.to_string(), endpoint))
            .cloned()
            .ok_or_else(|| Self::not_found("image"))
    }

    async fn download(&self, url: &str) -> Result<RawAsset, FetchError> {
        let mut state = self.state.lock();
        state.calls.push(format!("download:{url}"));
        state
            .downloads
            .get(url)
            .cloned()
            .ok_or_else(|| Self::not_found("download"))
    }
}
