//! S3-compatible HTTP object store: HEAD for existence, PUT to persist, GET
//! to read back. A 404 on HEAD or GET is a typed not-found, never an error
//! string to match on.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, info};

use super::{object_key, CacheLookup, DatasetStore};
use crate::config::StorageConfig;
use crate::error::{ReviewScopeError, ReviewScopeResult};
use crate::export;
use crate::model::CanonicalDataset;

#[derive(Debug)]
pub struct HttpObjectStore {
    client: Client,
    endpoint: String,
    bucket: String,
}

impl HttpObjectStore {
    pub fn new(config: &StorageConfig) -> ReviewScopeResult<Self> {
        let endpoint = config
            .endpoint
            .as_deref()
            .ok_or_else(|| ReviewScopeError::config("storage.endpoint is required for the http backend"))?
            .trim_end_matches('/')
            .to_string();

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| ReviewScopeError::cache(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            bucket: config.bucket.clone(),
        })
    }

    fn object_url(&self, product_id: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, object_key(product_id))
    }
}

#[async_trait]
impl DatasetStore for HttpObjectStore {
    async fn exists(&self, product_id: &str) -> ReviewScopeResult<CacheLookup> {
        let url = self.object_url(product_id);
        debug!("HEAD {}", url);

        let response = self
            .client
            .head(&url)
            .send()
            .await
            .map_err(|e| ReviewScopeError::cache(format!("HEAD {} failed: {}", url, e)))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(CacheLookup::NotFound),
            status if status.is_success() => Ok(CacheLookup::Found),
            status => Err(ReviewScopeError::HttpRequest {
                url,
                status: status.as_u16(),
            }),
        }
    }

    async fn write(
        &self,
        product_id: &str,
        dataset: &CanonicalDataset,
    ) -> ReviewScopeResult<String> {
        let url = self.object_url(product_id);
        let csv = export::to_csv(dataset)?;

        let response = self
            .client
            .put(&url)
            .header("Content-Type", "text/csv")
            .body(csv)
            .send()
            .await
            .map_err(|e| ReviewScopeError::cache(format!("PUT {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(ReviewScopeError::HttpRequest {
                url,
                status: response.status().as_u16(),
            });
        }

        info!("Wrote {} records to {}", dataset.len(), url);
        Ok(url)
    }

    async fn read(&self, product_id: &str) -> ReviewScopeResult<CanonicalDataset> {
        let url = self.object_url(product_id);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ReviewScopeError::cache(format!("GET {} failed: {}", url, e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ReviewScopeError::DatasetNotFound {
                product_id: product_id.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(ReviewScopeError::HttpRequest {
                url,
                status: response.status().as_u16(),
            });
        }

        let content = response
            .text()
            .await
            .map_err(|e| ReviewScopeError::cache(e.to_string()))?;
        Ok(export::from_csv(&content)?)
    }

    fn location(&self, product_id: &str) -> String {
        self.object_url(product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(endpoint: &str) -> StorageConfig {
        StorageConfig {
            endpoint: Some(endpoint.to_string()),
            ..StorageConfig::default()
        }
    }

    #[test]
    fn test_object_url_layout() {
        let store = HttpObjectStore::new(&config("https://objects.example.com/")).unwrap();
        assert_eq!(
            store.location("5689919121"),
            format!("https://objects.example.com/{}/5689919121.csv", store.bucket)
        );
    }

    #[test]
    fn test_missing_endpoint_is_config_error() {
        let config = StorageConfig {
            endpoint: None,
            ..StorageConfig::default()
        };
        let err = HttpObjectStore::new(&config).unwrap_err();
        assert!(matches!(err, ReviewScopeError::Configuration { .. }));
    }
}
