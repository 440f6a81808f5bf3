//! Interest-keyword relevance scoring for ingested contents.
//!
//! # Invariants
//! - Keyword matching is case-insensitive substring matching.
//! - Relevance never exceeds `RELEVANCE_MAX`.
//! - Learned weights never exceed `LEARNED_WEIGHT_MAX`.

use std::collections::HashMap;

pub const RELEVANCE_MAX: f64 = 10.0;
pub const DEFAULT_KEYWORD_WEIGHT: f64 = 1.0;
/// Weight given to a keyword the first time positive feedback mentions it.
pub const LEARNED_WEIGHT_INITIAL: f64 = 1.2;
pub const LEARNED_WEIGHT_STEP: f64 = 0.1;
pub const LEARNED_WEIGHT_MAX: f64 = 3.0;

/// Ranking inputs that come from configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankingSettings {
    /// Topics the user cares about; matched against title and body.
    pub interest_keywords: Vec<String>,
}

impl RankingSettings {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            interest_keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }
}

/// Returns the lowercase form of every keyword present in `text`,
/// deduplicated, in configuration order.
pub fn matched_keywords(text: &str, keywords: &[String]) -> Vec<String> {
    let haystack = text.to_lowercase();
    let mut matched: Vec<String> = Vec::new();
    for keyword in keywords {
        let needle = keyword.trim().to_lowercase();
        if needle.is_empty() || matched.contains(&needle) {
            continue;
        }
        if haystack.contains(&needle) {
            matched.push(needle);
        }
    }
    matched
}

/// Sums the learned weight of every interest keyword found in the content.
pub fn relevance_score(
    title: &str,
    body: &str,
    keywords: &[String],
    weights: &HashMap<String, f64>,
) -> f64 {
    let text = format!("{title} {body}");
    let score: f64 = matched_keywords(&text, keywords)
        .iter()
        .map(|keyword| {
            weights
                .get(keyword)
                .copied()
                .unwrap_or(DEFAULT_KEYWORD_WEIGHT)
        })
        .sum();
    score.min(RELEVANCE_MAX)
}
