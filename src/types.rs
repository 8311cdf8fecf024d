use serde::{Deserialize, Serialize};

use crate::verdict::SentimentCategory;

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifyRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub category: SentimentCategory,
    /// Persian display label, 1:1 with `category`.
    pub label: &'static str,
    pub glyph: &'static str,
    pub display_score: f64,
    pub positive_probability: f64,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Empty or whitespace-only reviews never reach the model.
pub fn trimmed_review(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
