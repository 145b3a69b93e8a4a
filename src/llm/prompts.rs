//! Prompt templates for review summarization.

use crate::model::CanonicalDataset;

/// Build the pros/cons summarization prompt from a cleaned dataset.
///
/// Each record contributes one `Rating: .. | Review: ..` line, in dataset
/// order. A rating nulled by the pipeline renders as `n/a`.
pub fn build_summary_prompt(dataset: &CanonicalDataset) -> String {
    let reviews_text = dataset
        .iter()
        .map(|record| {
            let rating = record
                .customer_rating
                .map(|r| r.to_string())
                .unwrap_or_else(|| "n/a".to_string());
            format!("Rating: {} | Review: {}", rating, record.review_text)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Summarize these product reviews into:
- Pros (Top 4 bullet points)
- Cons (Top 4 bullet points)
- Recommendation (1-2 sentences) unbiased

Reviews:
{}"#,
        reviews_text
    )
}
