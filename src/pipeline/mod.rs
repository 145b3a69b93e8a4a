//! Review normalization pipeline: raw provider records in, canonical
//! JSON-safe dataset out. Synchronous, single-pass, no shared state between
//! invocations.

use tracing::{debug, info};

pub mod normalize;
pub mod transform;

pub use normalize::TextNormalizer;
pub use transform::RecordTransformer;

use crate::error::DataCleaningError;
use crate::model::{CanonicalDataset, RawReviewRecord};

/// Applies the record transformer across a batch, preserving input order.
pub struct DatasetBuilder {
    transformer: RecordTransformer,
}

impl DatasetBuilder {
    pub fn new() -> Self {
        Self {
            transformer: RecordTransformer::new(),
        }
    }

    /// Build a canonical dataset from a raw batch.
    ///
    /// No reordering, no deduplication. The first record failure aborts the
    /// whole build; there is no partial output. After transformation, any
    /// non-finite rating is replaced with an explicit null so the dataset
    /// always serializes to valid JSON. Idempotent for identical input.
    pub fn build(
        &self,
        raw_records: &[RawReviewRecord],
    ) -> Result<CanonicalDataset, DataCleaningError> {
        debug!("Building canonical dataset from {} raw records", raw_records.len());

        let mut records = Vec::with_capacity(raw_records.len());
        for (row, raw) in raw_records.iter().enumerate() {
            records.push(self.transformer.transform(raw, row)?);
        }

        let mut nulled = 0usize;
        for record in &mut records {
            if matches!(record.customer_rating, Some(rating) if !rating.is_finite()) {
                record.customer_rating = None;
                nulled += 1;
            }
        }
        if nulled > 0 {
            info!("Replaced {} non-finite rating values with null", nulled);
        }

        info!("Canonical dataset built with {} records", records.len());
        Ok(CanonicalDataset::new(records))
    }
}

impl Default for DatasetBuilder {
    fn default() -> Self {
        Self::new()
    }
}
