//! Tabular (CSV) serialized form of the canonical dataset: exactly the four
//! canonical columns, header row, ASCII-safe text, dates encoded as
//! `%Y-%m-%dT%H:%M:%S`, null rating as empty cell.

use chrono::NaiveDateTime;
use csv::{ReaderBuilder, WriterBuilder};
use tracing::debug;

use crate::error::DataCleaningError;
use crate::model::{CanonicalDataset, CanonicalReviewRecord};

pub const CANONICAL_COLUMNS: [&str; 4] =
    ["customer_id", "customer_rating", "review_date", "review_text"];

const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Serialize a canonical dataset to CSV text.
pub fn to_csv(dataset: &CanonicalDataset) -> Result<String, DataCleaningError> {
    debug!("Serializing {} records to CSV", dataset.len());

    let mut writer = WriterBuilder::new().has_headers(false).from_writer(vec![]);

    writer
        .write_record(CANONICAL_COLUMNS)
        .map_err(|e| DataCleaningError::serialization(e.to_string()))?;

    for record in dataset.iter() {
        let rating = match record.customer_rating {
            Some(rating) => rating.to_string(),
            None => String::new(),
        };
        writer
            .write_record([
                record.customer_id.as_str(),
                rating.as_str(),
                record.review_date.format(DATE_FORMAT).to_string().as_str(),
                record.review_text.as_str(),
            ])
            .map_err(|e| DataCleaningError::serialization(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| DataCleaningError::serialization(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| DataCleaningError::serialization(e.to_string()))
}

/// Parse CSV text back into a canonical dataset.
pub fn from_csv(content: &str) -> Result<CanonicalDataset, DataCleaningError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| DataCleaningError::serialization(e.to_string()))?
        .clone();
    if headers.iter().ne(CANONICAL_COLUMNS) {
        return Err(DataCleaningError::serialization(format!(
            "unexpected columns: {:?}",
            headers.iter().collect::<Vec<_>>()
        )));
    }

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.map_err(|e| DataCleaningError::serialization(e.to_string()))?;

        let customer_id = record.get(0).unwrap_or_default().to_string();
        let rating_cell = record.get(1).unwrap_or_default();
        let customer_rating = if rating_cell.is_empty() {
            None
        } else {
            Some(rating_cell.parse::<f64>().map_err(|e| {
                DataCleaningError::serialization(format!("row {}: bad rating: {}", row, e))
            })?)
        };
        let review_date =
            NaiveDateTime::parse_from_str(record.get(2).unwrap_or_default(), DATE_FORMAT)
                .map_err(|e| {
                    DataCleaningError::serialization(format!("row {}: bad date: {}", row, e))
                })?;
        let review_text = record.get(3).unwrap_or_default().to_string();

        records.push(CanonicalReviewRecord {
            customer_id,
            customer_rating,
            review_date,
            review_text,
        });
    }

    Ok(CanonicalDataset::new(records))
}
