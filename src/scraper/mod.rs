//! Client for the third-party review search API. Fetches one page at a time
//! and concatenates the pages in order; no cross-page deduplication.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::error::{ReviewScopeError, ReviewScopeResult};
use crate::model::RawReviewRecord;

/// One page of the provider's review search response. Fields other than
/// `reviews` are ignored.
#[derive(Debug, Deserialize)]
struct ReviewSearchResponse {
    #[serde(default)]
    reviews: Vec<RawReviewRecord>,
}

pub struct ReviewScraper {
    client: Client,
    config: ScraperConfig,
}

impl ReviewScraper {
    pub fn new(config: &ScraperConfig) -> ReviewScopeResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ReviewScopeError::scrape(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Fetch `pages` pages of reviews for a product, in page order.
    pub async fn fetch_reviews(
        &self,
        product_id: &str,
        pages: u32,
        sort: &str,
    ) -> ReviewScopeResult<Vec<RawReviewRecord>> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ReviewScopeError::config("scraper.api_key not set"))?;

        let mut all_reviews = Vec::new();
        for page in 1..=pages {
            let page_reviews = self.fetch_page(product_id, sort, page, api_key).await?;
            debug!("Page {} returned {} reviews for product {}", page, page_reviews.len(), product_id);
            all_reviews.extend(page_reviews);
        }

        info!("Fetched {} reviews for product {} across {} pages", all_reviews.len(), product_id, pages);
        Ok(all_reviews)
    }

    async fn fetch_page(
        &self,
        product_id: &str,
        sort: &str,
        page: u32,
        api_key: &str,
    ) -> ReviewScopeResult<Vec<RawReviewRecord>> {
        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));
        let page_string = page.to_string();
        let params = [
            ("engine", self.config.engine.as_str()),
            ("product_id", product_id),
            ("sort", sort),
            ("page", page_string.as_str()),
            ("api_key", api_key),
        ];

        let mut last_error = None;
        for attempt in 1..=self.config.max_retries {
            debug!("Review search attempt {} for product {} page {}", attempt, product_id, page);

            match self.client.get(&url).query(&params).send().await {
                Ok(response) if response.status().is_success() => {
                    let body: ReviewSearchResponse = response
                        .json()
                        .await
                        .map_err(|e| ReviewScopeError::scrape(format!("bad provider payload: {}", e)))?;
                    return Ok(body.reviews);
                }
                Ok(response) if response.status().is_server_error() => {
                    warn!("Provider returned {} for page {}, retrying", response.status(), page);
                    last_error = Some(ReviewScopeError::HttpRequest {
                        url: url.clone(),
                        status: response.status().as_u16(),
                    });
                }
                Ok(response) => {
                    // Client errors (bad key, unknown product) will not heal
                    // on retry.
                    return Err(ReviewScopeError::HttpRequest {
                        url,
                        status: response.status().as_u16(),
                    });
                }
                Err(e) => {
                    warn!("Review search request failed (attempt {}): {}", attempt, e);
                    last_error = Some(ReviewScopeError::scrape(e.to_string()));
                }
            }

            if attempt < self.config.max_retries {
                let delay = Duration::from_secs(self.config.retry_delay_seconds * attempt as u64);
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error.unwrap_or_else(|| ReviewScopeError::scrape("all retry attempts failed")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_api_key_fails_before_any_request() {
        let config = ScraperConfig {
            api_key: None,
            ..ScraperConfig::default()
        };
        let scraper = ReviewScraper::new(&config).unwrap();

        let err = scraper
            .fetch_reviews("5689919121", 2, "helpful")
            .await
            .unwrap_err();
        assert!(matches!(err, ReviewScopeError::Configuration { .. }));
    }

    #[test]
    fn test_search_response_tolerates_missing_reviews_array() {
        let body: ReviewSearchResponse = serde_json::from_str(r#"{"search_metadata": {}}"#).unwrap();
        assert!(body.reviews.is_empty());
    }

    #[test]
    fn test_search_response_parses_provider_records() {
        // customer_type arrives in provider-specific shapes (string or list);
        // the record must still parse the fields the pipeline needs.
        let body: ReviewSearchResponse = serde_json::from_str(
            r#"{"reviews": [
                {"position": 1, "rating": 5, "review_submission_time": "2024-01-15",
                 "text": "Great", "user_nickname": "shopper", "customer_type": ["registered"]}
            ]}"#,
        )
        .unwrap();

        assert_eq!(body.reviews.len(), 1);
        assert_eq!(body.reviews[0].position, Some(1));
        assert_eq!(body.reviews[0].rating, Some(5.0));
        assert_eq!(body.reviews[0].text.as_deref(), Some("Great"));
    }
}
