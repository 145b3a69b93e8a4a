use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{AppConfig, StorageBackend};
use crate::error::{ReviewScopeError, ReviewScopeResult};
use crate::llm::{ReviewSummary, Summarizer};
use crate::model::RawReviewRecord;
use crate::pipeline::DatasetBuilder;
use crate::scraper::ReviewScraper;
use crate::storage::{DatasetStore, HttpObjectStore, LocalObjectStore};

/// Outcome of a clean-and-store request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CleanOutcome {
    /// The cache gate found an existing dataset; the pipeline did not run.
    Cached { location: String },
    /// A fresh dataset was built and persisted.
    Uploaded { location: String, count: usize },
}

/// Core application state: explicitly constructed clients, initialized once
/// at startup and shared across requests. No ambient globals; the store is
/// injectable so tests can substitute a fake backend.
pub struct ReviewScope {
    config: AppConfig,
    scraper: Arc<ReviewScraper>,
    store: Arc<dyn DatasetStore>,
    summarizer: Arc<Summarizer>,
    builder: DatasetBuilder,
    product_id_pattern: Regex,
}

impl ReviewScope {
    /// Initialize the core application with the store backend named in the
    /// configuration.
    pub fn new(config: AppConfig) -> ReviewScopeResult<Self> {
        let store: Arc<dyn DatasetStore> = match config.storage.backend {
            StorageBackend::Local => {
                Arc::new(LocalObjectStore::new(config.storage.root_dir.clone()))
            }
            StorageBackend::Http => Arc::new(HttpObjectStore::new(&config.storage)?),
        };

        Self::with_store(config, store)
    }

    /// Initialize with an injected dataset store.
    pub fn with_store(config: AppConfig, store: Arc<dyn DatasetStore>) -> ReviewScopeResult<Self> {
        info!("Initializing reviewscope core");

        let scraper = Arc::new(ReviewScraper::new(&config.scraper)?);
        info!("Review scraper initialized");

        let summarizer = Arc::new(Summarizer::new(&config.summarizer)?);
        info!("Summarizer initialized");

        Ok(Self {
            config,
            scraper,
            store,
            summarizer,
            builder: DatasetBuilder::new(),
            product_id_pattern: Regex::new(r"/ip/[^/]+/(\d+)").expect("hard-coded pattern"),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Extract the numeric product identifier from a product page URL.
    pub fn extract_product_id(&self, url: &str) -> ReviewScopeResult<String> {
        self.product_id_pattern
            .captures(url)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| ReviewScopeError::InvalidUrl { url: url.to_string() })
    }

    /// Fetch raw reviews from the upstream provider.
    pub async fn scrape_reviews(
        &self,
        product_id: &str,
        pages: u32,
        sort: &str,
    ) -> ReviewScopeResult<Vec<RawReviewRecord>> {
        info!("Scraping reviews for product {}", product_id);
        self.scraper.fetch_reviews(product_id, pages, sort).await
    }

    /// Run the cache gate, then the normalization pipeline.
    ///
    /// An existing cached dataset skips the pipeline entirely. On a miss the
    /// batch is built and written exactly once each; neither call is retried
    /// here, and any failure propagates. Concurrent writers for the same
    /// product race on the existence check; last write wins.
    pub async fn clean_and_store(
        &self,
        product_id: &str,
        raw_records: &[RawReviewRecord],
    ) -> ReviewScopeResult<CleanOutcome> {
        if self.store.exists(product_id).await?.is_found() {
            let location = self.store.location(product_id);
            info!("Dataset already cached for product {}: {}", product_id, location);
            return Ok(CleanOutcome::Cached { location });
        }

        let dataset = self.builder.build(raw_records)?;
        let count = dataset.len();
        let location = self.store.write(product_id, &dataset).await?;

        info!("Cleaned and stored {} reviews for product {}", count, product_id);
        Ok(CleanOutcome::Uploaded { location, count })
    }

    /// Read the cached dataset for a product and summarize it.
    pub async fn summarize(&self, product_id: &str) -> ReviewScopeResult<ReviewSummary> {
        info!("Summarizing cached reviews for product {}", product_id);

        let dataset = self.store.read(product_id).await?;
        self.summarizer.summarize(&dataset).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn scope_with_memory_store() -> (ReviewScope, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let scope = ReviewScope::with_store(AppConfig::default(), store.clone()).unwrap();
        (scope, store)
    }

    fn raw(position: u64, rating: f64, submitted: &str, text: &str) -> RawReviewRecord {
        RawReviewRecord {
            position: Some(position),
            rating: Some(rating),
            review_submission_time: Some(submitted.to_string()),
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_extract_product_id() {
        let (scope, _) = scope_with_memory_store();

        let id = scope
            .extract_product_id(
                "https://www.walmart.com/ip/Apple-AirPods-Pro-2/5689919121?classType=VARIANT",
            )
            .unwrap();
        assert_eq!(id, "5689919121");
    }

    #[test]
    fn test_extract_product_id_rejects_unmatched_url() {
        let (scope, _) = scope_with_memory_store();

        let err = scope
            .extract_product_id("https://example.com/no-product-here")
            .unwrap_err();
        assert!(matches!(err, ReviewScopeError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_clean_and_store_writes_on_miss() {
        let (scope, store) = scope_with_memory_store();
        let batch = vec![raw(1, 5.0, "2024-01-15", "GREAT Phone!!")];

        let outcome = scope.clean_and_store("42", &batch).await.unwrap();
        assert!(matches!(outcome, CleanOutcome::Uploaded { count: 1, .. }));

        let stored = store.read("42").await.unwrap();
        assert_eq!(stored.records()[0].customer_id, "C1");
        assert_eq!(stored.records()[0].review_text, "great phone");
    }

    #[tokio::test]
    async fn test_cache_gate_skips_pipeline_on_hit() {
        let (scope, _) = scope_with_memory_store();
        let batch = vec![raw(1, 5.0, "2024-01-15", "fine")];
        scope.clean_and_store("42", &batch).await.unwrap();

        // A second call with an invalid batch still succeeds: the gate
        // short-circuits before the pipeline would fail on it.
        let broken = vec![RawReviewRecord::default()];
        let outcome = scope.clean_and_store("42", &broken).await.unwrap();
        assert!(matches!(outcome, CleanOutcome::Cached { .. }));
    }

    #[tokio::test]
    async fn test_clean_and_store_propagates_cleaning_error() {
        let (scope, store) = scope_with_memory_store();
        let mut bad = raw(1, 5.0, "2024-01-15", "fine");
        bad.rating = None;

        let err = scope.clean_and_store("42", &[bad]).await.unwrap_err();
        assert!(matches!(err, ReviewScopeError::Cleaning(_)));

        // No partial dataset may survive the failure.
        let read = store.read("42").await;
        assert!(matches!(read, Err(ReviewScopeError::DatasetNotFound { .. })));
    }

    #[tokio::test]
    async fn test_summarize_missing_product_is_not_found() {
        let (scope, _) = scope_with_memory_store();

        let err = scope.summarize("nope").await.unwrap_err();
        assert!(matches!(err, ReviewScopeError::DatasetNotFound { .. }));
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let cached = CleanOutcome::Cached { location: "memory://42.csv".to_string() };
        let json = serde_json::to_value(&cached).unwrap();
        assert_eq!(json["status"], "cached");

        let uploaded = CleanOutcome::Uploaded { location: "memory://42.csv".to_string(), count: 3 };
        let json = serde_json::to_value(&uploaded).unwrap();
        assert_eq!(json["status"], "uploaded");
        assert_eq!(json["count"], 3);
    }
}
