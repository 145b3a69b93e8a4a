use actix_web::{web, HttpResponse, Result as ActixResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::core::ReviewScope;
use crate::error::ReviewScopeError;
use crate::model::RawReviewRecord;

/// API request carrying a product page URL
#[derive(Debug, Deserialize)]
pub struct ExtractIdRequest {
    pub url: String,
}

/// API response for product-id extraction
#[derive(Debug, Serialize)]
pub struct ExtractIdResponse {
    pub product_id: String,
}

/// API request for review scraping
#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    pub product_id: String,
    #[serde(default = "default_pages")]
    pub pages: u32,
    #[serde(default = "default_sort")]
    pub sort: String,
}

fn default_pages() -> u32 {
    5
}

fn default_sort() -> String {
    "helpful".to_string()
}

/// API response for review scraping
#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub rows: Vec<RawReviewRecord>,
    pub count: usize,
}

/// API request for cleaning a scraped batch
#[derive(Debug, Deserialize)]
pub struct DataCleanRequest {
    pub product_id: String,
    pub json_result: Vec<RawReviewRecord>,
}

/// API request for summarization
#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub product_id: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
}

/// Configure API routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/extract_id", web::post().to(extract_id))
        .route("/scrape", web::post().to(scrape))
        .route("/data_clean", web::post().to(data_clean))
        .route("/summarize", web::post().to(summarize));
}

/// Map a service error to the HTTP response the UI expects.
fn error_response(error: &ReviewScopeError) -> HttpResponse {
    let body = ErrorResponse {
        success: false,
        message: error.to_string(),
    };

    match error {
        ReviewScopeError::InvalidUrl { .. } => HttpResponse::BadRequest().json(body),
        ReviewScopeError::DatasetNotFound { .. } => HttpResponse::NotFound().json(body),
        ReviewScopeError::Cleaning(_) => HttpResponse::UnprocessableEntity().json(body),
        ReviewScopeError::Configuration { .. } => HttpResponse::ServiceUnavailable().json(body),
        _ => HttpResponse::InternalServerError().json(body),
    }
}

/// Health check endpoint
async fn health_check() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

/// Extract a product ID from a product page URL
async fn extract_id(
    app: web::Data<Arc<ReviewScope>>,
    req: web::Json<ExtractIdRequest>,
) -> ActixResult<HttpResponse> {
    info!("API: Extracting product ID");

    match app.extract_product_id(&req.url) {
        Ok(product_id) => Ok(HttpResponse::Ok().json(ExtractIdResponse { product_id })),
        Err(e) => {
            error!("API: Failed to extract product ID: {}", e);
            Ok(error_response(&e))
        }
    }
}

/// Fetch raw reviews from the upstream provider
async fn scrape(
    app: web::Data<Arc<ReviewScope>>,
    req: web::Json<ScrapeRequest>,
) -> ActixResult<HttpResponse> {
    info!("API: Scraping reviews for product {}", req.product_id);

    match app.scrape_reviews(&req.product_id, req.pages, &req.sort).await {
        Ok(rows) => {
            let count = rows.len();
            Ok(HttpResponse::Ok().json(ScrapeResponse { rows, count }))
        }
        Err(e) => {
            error!("API: Scrape failed for product {}: {}", req.product_id, e);
            Ok(error_response(&e))
        }
    }
}

/// Clean a scraped batch and persist the canonical dataset (cache gate first)
async fn data_clean(
    app: web::Data<Arc<ReviewScope>>,
    req: web::Json<DataCleanRequest>,
) -> ActixResult<HttpResponse> {
    info!(
        "API: Cleaning {} reviews for product {}",
        req.json_result.len(),
        req.product_id
    );

    match app.clean_and_store(&req.product_id, &req.json_result).await {
        Ok(outcome) => Ok(HttpResponse::Ok().json(outcome)),
        Err(e) => {
            error!("API: Data cleaning failed for product {}: {}", req.product_id, e);
            Ok(error_response(&e))
        }
    }
}

/// Summarize the cached dataset for a product
async fn summarize(
    app: web::Data<Arc<ReviewScope>>,
    req: web::Json<SummarizeRequest>,
) -> ActixResult<HttpResponse> {
    info!("API: Summarizing reviews for product {}", req.product_id);

    match app.summarize(&req.product_id).await {
        Ok(summary) => Ok(HttpResponse::Ok().json(summary)),
        Err(e) => {
            error!("API: Summarization failed for product {}: {}", req.product_id, e);
            Ok(error_response(&e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::storage::MemoryStore;
    use actix_web::{test, App};

    fn test_app_state() -> web::Data<Arc<ReviewScope>> {
        let store = Arc::new(MemoryStore::new());
        let scope = ReviewScope::with_store(AppConfig::default(), store).unwrap();
        web::Data::new(Arc::new(scope))
    }

    #[actix_web::test]
    async fn test_health_endpoint() {
        let app = test::init_service(
            App::new().app_data(test_app_state()).configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_extract_id_endpoint() {
        let app = test::init_service(
            App::new().app_data(test_app_state()).configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/extract_id")
            .set_json(serde_json::json!({
                "url": "https://www.walmart.com/ip/Some-Gadget/123456"
            }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["product_id"], "123456");
    }

    #[actix_web::test]
    async fn test_extract_id_rejects_bad_url() {
        let app = test::init_service(
            App::new().app_data(test_app_state()).configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/extract_id")
            .set_json(serde_json::json!({"url": "https://example.com/nothing"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_data_clean_then_cached() {
        let app = test::init_service(
            App::new().app_data(test_app_state()).configure(configure_routes),
        )
        .await;

        let payload = serde_json::json!({
            "product_id": "42",
            "json_result": [{
                "position": 1,
                "rating": 5,
                "review_submission_time": "2024-01-15",
                "text": "GREAT Phone!!"
            }]
        });

        let req = test::TestRequest::post()
            .uri("/data_clean")
            .set_json(&payload)
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "uploaded");
        assert_eq!(body["count"], 1);

        let req = test::TestRequest::post()
            .uri("/data_clean")
            .set_json(&payload)
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "cached");
    }

    #[actix_web::test]
    async fn test_data_clean_bad_batch_is_unprocessable() {
        let app = test::init_service(
            App::new().app_data(test_app_state()).configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/data_clean")
            .set_json(serde_json::json!({
                "product_id": "43",
                "json_result": [{"position": 1, "text": "no rating or date"}]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.status(),
            actix_web::http::StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[actix_web::test]
    async fn test_summarize_unknown_product_is_not_found() {
        let app = test::init_service(
            App::new().app_data(test_app_state()).configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/summarize")
            .set_json(serde_json::json!({"product_id": "missing"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
    }
}
