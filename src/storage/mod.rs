//! Object-storage cache for normalized datasets, keyed by product
//! identifier. One CSV object per product; last write wins on concurrent
//! writers for the same product (accepted race, no locking).

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

pub mod http;

pub use http::HttpObjectStore;

use crate::error::{ReviewScopeError, ReviewScopeResult};
use crate::export;
use crate::model::CanonicalDataset;

/// Outcome of a cache existence check. A typed result rather than an error
/// code to match on: not-found is an expected answer, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLookup {
    Found,
    NotFound,
}

impl CacheLookup {
    pub fn is_found(self) -> bool {
        matches!(self, CacheLookup::Found)
    }
}

/// Storage boundary for normalized datasets.
#[async_trait]
pub trait DatasetStore: Send + Sync {
    /// Check whether a dataset is already cached for the product.
    async fn exists(&self, product_id: &str) -> ReviewScopeResult<CacheLookup>;

    /// Persist a dataset, returning the storage location written.
    async fn write(
        &self,
        product_id: &str,
        dataset: &CanonicalDataset,
    ) -> ReviewScopeResult<String>;

    /// Read a cached dataset back. A missing object is `DatasetNotFound`.
    async fn read(&self, product_id: &str) -> ReviewScopeResult<CanonicalDataset>;

    /// Storage location a write for this product would land at.
    fn location(&self, product_id: &str) -> String;
}

pub fn object_key(product_id: &str) -> String {
    format!("{}.csv", product_id)
}

/// Filesystem-rooted store for local runs: one `<root>/<product_id>.csv` per
/// product.
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, product_id: &str) -> PathBuf {
        self.root.join(object_key(product_id))
    }
}

#[async_trait]
impl DatasetStore for LocalObjectStore {
    async fn exists(&self, product_id: &str) -> ReviewScopeResult<CacheLookup> {
        let path = self.object_path(product_id);
        match tokio::fs::try_exists(&path).await {
            Ok(true) => {
                debug!("Cache hit for product {}", product_id);
                Ok(CacheLookup::Found)
            }
            Ok(false) => {
                debug!("Cache miss for product {}", product_id);
                Ok(CacheLookup::NotFound)
            }
            Err(e) => Err(ReviewScopeError::cache(format!(
                "existence check failed for {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn write(
        &self,
        product_id: &str,
        dataset: &CanonicalDataset,
    ) -> ReviewScopeResult<String> {
        let path = self.object_path(product_id);
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| ReviewScopeError::cache(e.to_string()))?;

        let csv = export::to_csv(dataset)?;
        tokio::fs::write(&path, csv)
            .await
            .map_err(|e| ReviewScopeError::cache(format!("write failed for {}: {}", path.display(), e)))?;

        info!("Wrote {} records to {}", dataset.len(), path.display());
        Ok(self.location(product_id))
    }

    async fn read(&self, product_id: &str) -> ReviewScopeResult<CanonicalDataset> {
        let path = self.object_path(product_id);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ReviewScopeError::DatasetNotFound {
                    product_id: product_id.to_string(),
                });
            }
            Err(e) => {
                return Err(ReviewScopeError::cache(format!(
                    "read failed for {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        Ok(export::from_csv(&content)?)
    }

    fn location(&self, product_id: &str) -> String {
        self.object_path(product_id).display().to_string()
    }
}

/// In-memory store for test substitution.
pub struct MemoryStore {
    objects: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatasetStore for MemoryStore {
    async fn exists(&self, product_id: &str) -> ReviewScopeResult<CacheLookup> {
        let objects = self.objects.read().await;
        if objects.contains_key(&object_key(product_id)) {
            Ok(CacheLookup::Found)
        } else {
            Ok(CacheLookup::NotFound)
        }
    }

    async fn write(
        &self,
        product_id: &str,
        dataset: &CanonicalDataset,
    ) -> ReviewScopeResult<String> {
        let csv = export::to_csv(dataset)?;
        self.objects.write().await.insert(object_key(product_id), csv);
        Ok(self.location(product_id))
    }

    async fn read(&self, product_id: &str) -> ReviewScopeResult<CanonicalDataset> {
        let objects = self.objects.read().await;
        let content = objects
            .get(&object_key(product_id))
            .ok_or_else(|| ReviewScopeError::DatasetNotFound {
                product_id: product_id.to_string(),
            })?;
        Ok(export::from_csv(content)?)
    }

    fn location(&self, product_id: &str) -> String {
        format!("memory://{}", object_key(product_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CanonicalReviewRecord;
    use chrono::{NaiveDate, NaiveTime};

    fn sample_dataset() -> CanonicalDataset {
        CanonicalDataset::new(vec![CanonicalReviewRecord {
            customer_id: "C1".to_string(),
            customer_rating: Some(5.0),
            review_date: NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_time(NaiveTime::MIN),
            review_text: "great phone".to_string(),
        }])
    }

    #[tokio::test]
    async fn test_local_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path());
        let dataset = sample_dataset();

        assert_eq!(store.exists("42").await.unwrap(), CacheLookup::NotFound);

        let location = store.write("42", &dataset).await.unwrap();
        assert!(location.ends_with("42.csv"));
        assert_eq!(store.exists("42").await.unwrap(), CacheLookup::Found);

        let restored = store.read("42").await.unwrap();
        assert_eq!(restored, dataset);
    }

    #[tokio::test]
    async fn test_local_store_missing_read_is_typed() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path());

        let err = store.read("nope").await.unwrap_err();
        assert!(matches!(err, ReviewScopeError::DatasetNotFound { .. }));
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        let dataset = sample_dataset();

        assert_eq!(store.exists("7").await.unwrap(), CacheLookup::NotFound);
        store.write("7", &dataset).await.unwrap();
        assert_eq!(store.exists("7").await.unwrap(), CacheLookup::Found);
        assert_eq!(store.read("7").await.unwrap(), dataset);
    }

    #[tokio::test]
    async fn test_memory_store_last_write_wins() {
        let store = MemoryStore::new();
        let first = sample_dataset();
        let second = CanonicalDataset::new(vec![]);

        store.write("7", &first).await.unwrap();
        store.write("7", &second).await.unwrap();

        assert_eq!(store.read("7").await.unwrap(), second);
    }
}
