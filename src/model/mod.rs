use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One review as returned by the upstream scraping provider.
///
/// Field presence is not guaranteed across provider versions, so every field
/// is optional at the type level and deserialization never fails on a sparse
/// record. Which fields are actually required is decided by the transformer,
/// which fails the whole batch when one is absent. Unknown provider fields
/// are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawReviewRecord {
    pub position: Option<u64>,
    pub rating: Option<f64>,
    pub review_submission_time: Option<String>,
    pub text: Option<String>,

    // Provider noise fields; carried through deserialization, dropped by the
    // transformer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positive_feedback: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_feedback: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_nickname: Option<String>,
    /// Provider-shape varies between a string and a list; kept opaque since
    /// the transformer drops it either way.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_type: Option<serde_json::Value>,
}

/// The normalized, schema-fixed representation used for caching and
/// summarization. Field order matches the persisted tabular column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalReviewRecord {
    /// Always non-empty, always `"C"` + the raw positional index.
    pub customer_id: String,
    /// Raw rating unchanged. `None` only as the explicit null marker
    /// substituted for a non-finite value before serialization.
    pub customer_rating: Option<f64>,
    pub review_date: NaiveDateTime,
    /// Lower-cased, ASCII-folded, punctuation-stripped text; matches
    /// `[a-z0-9' ]*` with single internal spaces and no edge apostrophes.
    pub review_text: String,
}

/// An ordered sequence of canonical review records, one per input raw record,
/// preserving input order. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalDataset {
    records: Vec<CanonicalReviewRecord>,
}

impl CanonicalDataset {
    pub fn new(records: Vec<CanonicalReviewRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[CanonicalReviewRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CanonicalReviewRecord> {
        self.records.iter()
    }
}

impl IntoIterator for CanonicalDataset {
    type Item = CanonicalReviewRecord;
    type IntoIter = std::vec::IntoIter<CanonicalReviewRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
