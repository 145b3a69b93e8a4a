use thiserror::Error;

/// Errors raised by the review cleaning pipeline.
///
/// Any single failure aborts the whole batch; there is no partial-success
/// mode. The variant carries enough context to name the offending record.
#[derive(Error, Debug)]
pub enum DataCleaningError {
    #[error("missing required field `{field}` in review record {row}")]
    MissingField { field: &'static str, row: usize },

    #[error("unparseable review date `{value}` in review record {row}")]
    DateParse { value: String, row: usize },

    #[error("dataset serialization failed: {message}")]
    Serialization { message: String },
}

impl DataCleaningError {
    pub fn missing_field(field: &'static str, row: usize) -> Self {
        Self::MissingField { field, row }
    }

    pub fn date_parse(value: impl Into<String>, row: usize) -> Self {
        Self::DateParse { value: value.into(), row }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization { message: message.into() }
    }
}

/// Service-level error types for reviewscope.
#[derive(Error, Debug)]
pub enum ReviewScopeError {
    // Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    // Scraper errors
    #[error("Scrape failed: {message}")]
    Scrape { message: String },

    #[error("HTTP request failed: {url} - {status}")]
    HttpRequest { url: String, status: u16 },

    // Cleaning errors
    #[error("Data cleaning failed: {0}")]
    Cleaning(#[from] DataCleaningError),

    // Cache/storage errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error("No cached dataset for product: {product_id}")]
    DatasetNotFound { product_id: String },

    // Summarizer errors
    #[error("Summarization failed: {message}")]
    Summarize { message: String },

    // API boundary errors
    #[error("Could not extract product ID from URL: {url}")]
    InvalidUrl { url: String },

    // Generic errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ReviewScopeError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    pub fn scrape(message: impl Into<String>) -> Self {
        Self::Scrape { message: message.into() }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache { message: message.into() }
    }

    pub fn summarize(message: impl Into<String>) -> Self {
        Self::Summarize { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Check if error is recoverable by retrying the request
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Scrape { .. } | Self::HttpRequest { .. } | Self::Summarize { .. } => true,

            Self::Configuration { .. }
            | Self::Cleaning(_)
            | Self::DatasetNotFound { .. }
            | Self::InvalidUrl { .. } => false,

            _ => false,
        }
    }

    /// Get error category for logging and metrics
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::Scrape { .. } | Self::HttpRequest { .. } => "scraper",
            Self::Cleaning(_) => "cleaning",
            Self::Cache { .. } | Self::DatasetNotFound { .. } => "storage",
            Self::Summarize { .. } => "summarizer",
            Self::InvalidUrl { .. } => "api",
            Self::Internal { .. } => "internal",
        }
    }
}

/// Result type alias for reviewscope
pub type ReviewScopeResult<T> = std::result::Result<T, ReviewScopeError>;

impl From<anyhow::Error> for ReviewScopeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal { message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = ReviewScopeError::config("missing API key");
        assert_eq!(error.category(), "configuration");
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_cleaning_error_wraps_cause() {
        let cause = DataCleaningError::missing_field("rating", 3);
        let error: ReviewScopeError = cause.into();

        assert_eq!(error.category(), "cleaning");
        assert!(!error.is_recoverable());
        assert!(error.to_string().contains("rating"));
        assert!(error.to_string().contains("3"));
    }

    #[test]
    fn test_recoverable_errors() {
        let scrape_error = ReviewScopeError::scrape("provider timed out");
        assert!(scrape_error.is_recoverable());

        let not_found = ReviewScopeError::DatasetNotFound {
            product_id: "5689919121".to_string(),
        };
        assert!(!not_found.is_recoverable());
        assert_eq!(not_found.category(), "storage");
    }

    #[test]
    fn test_date_parse_error_message() {
        let error = DataCleaningError::date_parse("not-a-date", 7);
        let message = error.to_string();

        assert!(message.contains("not-a-date"));
        assert!(message.contains("record 7"));
    }
}
