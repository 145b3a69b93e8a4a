//! ReviewScope - product review scraping, normalization, and summarization
//!
//! This library provides the core functionality for ReviewScope, including:
//! - Review scraping through a search-API provider
//! - A deterministic text-normalization and record-transformation pipeline
//! - Canonical CSV export and cache-gated dataset storage
//! - LLM-backed review summarization
//! - HTTP API surface

pub mod api;
pub mod config;
pub mod core;
pub mod error;
pub mod export;
pub mod llm;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod scraper;
pub mod storage;

// Re-export main types for convenience
pub use crate::config::AppConfig;
pub use crate::core::ReviewScope;
pub use crate::error::{DataCleaningError, ReviewScopeError, ReviewScopeResult};
pub use crate::model::{CanonicalDataset, CanonicalReviewRecord, RawReviewRecord};
