use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::DataCleaningError;
use crate::model::{CanonicalReviewRecord, RawReviewRecord};

use super::normalize::TextNormalizer;

/// Maps one raw provider record into the canonical review schema.
///
/// Pure: the same raw record always yields the same canonical record.
/// `title`, `positive_feedback`, `negative_feedback`, and the other provider
/// noise fields are dropped, not passed through.
pub struct RecordTransformer {
    normalizer: TextNormalizer,
}

impl RecordTransformer {
    pub fn new() -> Self {
        Self {
            normalizer: TextNormalizer::new(),
        }
    }

    /// Transform a single record. `row` is the record's position in the batch
    /// and only feeds error context. A missing required field or an
    /// unparseable submission timestamp is a hard error for the whole batch.
    pub fn transform(
        &self,
        raw: &RawReviewRecord,
        row: usize,
    ) -> Result<CanonicalReviewRecord, DataCleaningError> {
        let position = raw
            .position
            .ok_or(DataCleaningError::MissingField { field: "position", row })?;
        let rating = raw
            .rating
            .ok_or(DataCleaningError::MissingField { field: "rating", row })?;
        let submitted = raw
            .review_submission_time
            .as_deref()
            .ok_or(DataCleaningError::MissingField { field: "review_submission_time", row })?;
        let text = raw
            .text
            .as_deref()
            .ok_or(DataCleaningError::MissingField { field: "text", row })?;

        let review_date = parse_review_date(submitted)
            .ok_or_else(|| DataCleaningError::date_parse(submitted, row))?;

        let lowered = text.to_lowercase();

        Ok(CanonicalReviewRecord {
            customer_id: format!("C{}", position),
            customer_rating: Some(rating),
            review_date,
            review_text: self.normalizer.normalize(Some(&lowered)),
        })
    }
}

impl Default for RecordTransformer {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a provider submission timestamp into a naive date-time.
///
/// Providers are not consistent about the format, so this tries the shapes
/// seen in the wild, most specific first. Date-only values resolve to
/// midnight. Returns `None` when nothing matches.
pub fn parse_review_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }

    const DATETIME_FORMATS: [&str; 3] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%m/%d/%Y %H:%M:%S",
    ];
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }

    const DATE_FORMATS: [&str; 6] = [
        "%Y-%m-%d",
        "%m/%d/%Y",
        "%m-%d-%Y",
        "%B %d, %Y",
        "%b %d, %Y",
        "%d %B %Y",
    ];
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }

    None
}
