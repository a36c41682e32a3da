//! Model-assisted ranking of existing memos, with a local substring fallback.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::{debug, warn};

use crate::client::ContentGenerator;
use crate::extract::extract_json;
use crate::memo::{Identified, SearchCandidate, SearchRankResult};
use crate::prompt::build_search_prompt;
use crate::types::Part;

/// Score given to every hit found by the local fallback
pub const FALLBACK_RELEVANCE: f64 = 0.5;

/// Ranks `candidates` against `query`, most relevant first.
///
/// The model decides which candidates to drop. If the call fails or its
/// answer is not JSON, the local substring match is used instead.
pub async fn rank_candidates(
    generator: &dyn ContentGenerator,
    query: &str,
    candidates: &[SearchCandidate],
) -> Vec<SearchRankResult> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let prompt = match build_search_prompt(query, candidates) {
        Ok(prompt) => prompt,
        Err(e) => {
            warn!(error = %e, "Failed to build search prompt, using local match");
            return fallback_search(query, candidates);
        }
    };

    let raw = match generator.generate(vec![Part::text(prompt)]).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "Search ranking call failed, using local match");
            return fallback_search(query, candidates);
        }
    };

    match extract_json(&raw) {
        Some(value) => {
            let ranked = parse_ranked(&value);
            debug!(hits = ranked.len(), "Model ranked search results");
            ranked
        }
        None => {
            warn!("Search ranking answer was not JSON, using local match");
            fallback_search(query, candidates)
        }
    }
}

/// Reads `results` out of the model's answer, skipping entries without an id
fn parse_ranked(value: &Value) -> Vec<SearchRankResult> {
    let Some(items) = value.get("results").and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let id = item.get("id").and_then(Value::as_str)?;
            Some(SearchRankResult {
                id: id.to_string(),
                relevance_score: item
                    .get("relevanceScore")
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0),
                reason: item
                    .get("reason")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
        })
        .collect()
}

/// Case-insensitive substring match of `query` against summaries and tags
pub fn fallback_search(query: &str, candidates: &[SearchCandidate]) -> Vec<SearchRankResult> {
    let needle = query.to_lowercase();

    candidates
        .iter()
        .filter(|candidate| matches_query(&needle, candidate.summary.as_deref(), &candidate.tags))
        .map(|candidate| SearchRankResult {
            id: candidate.id.clone(),
            relevance_score: FALLBACK_RELEVANCE,
            reason: None,
        })
        .collect()
}

/// True when the lowercased `needle` occurs in the summary or in any tag
pub fn matches_query(needle: &str, summary: Option<&str>, tags: &[String]) -> bool {
    summary.is_some_and(|s| s.to_lowercase().contains(needle))
        || tags.iter().any(|tag| tag.to_lowercase().contains(needle))
}

/// Maps ranked ids back onto the caller's records, keeping the ranked order.
///
/// Ids that do not resolve (or repeat) are dropped.
pub fn resolve_ranked<'a, T: Identified>(
    ranked: &[SearchRankResult],
    candidates: &'a [T],
) -> Vec<&'a T> {
    let by_id: HashMap<&str, &T> = candidates.iter().map(|c| (c.id(), c)).collect();
    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(ranked.len());

    for hit in ranked {
        if !seen.insert(hit.id.as_str()) {
            continue;
        }
        if let Some(record) = by_id.get(hit.id.as_str()) {
            resolved.push(*record);
        }
    }

    resolved
}
