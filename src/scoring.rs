//! # Scorer
//!
//! Pure relevance scoring over candidate items. Maps each candidate to a
//! numeric score plus a provisional selection reason, consulting recency,
//! interaction counts embedded in item metadata, and the engagement
//! history snapshot taken at the start of the generation.
//!
//! The exact blend is a tunable policy (`ScoreWeights` in `EngineConfig`),
//! not an invariant; only the ordering behaviors asserted in tests are
//! contractual.

use crate::brief::SelectionReason;
use crate::config::EngineConfig;
use crate::engagement::{significant_tokens, EngagementHistory};
use crate::model::{ContentItem, SourceId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// A candidate with its relevance score and provisional reason.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub item: ContentItem,
    pub score: f32,
    pub reason: SelectionReason,
}

/// Score all candidates. Pure function of its arguments; the history is a
/// snapshot, so concurrent engagement appends cannot skew one run.
pub fn score(
    candidates: &[ContentItem],
    history: &EngagementHistory,
    cfg: &EngineConfig,
    now: DateTime<Utc>,
) -> Vec<ScoredCandidate> {
    let freshest = freshest_per_source(candidates);
    let engaged_sources = history.engaged_sources();
    let engaged_tokens = history.engaged_title_tokens();
    let w = &cfg.weights;

    candidates
        .iter()
        .map(|item| {
            let recency = recency_score(item, now, cfg.recency_window_secs);

            let interactions = item.interaction_count();
            let trending = interactions >= cfg.trending_threshold;
            let trending_norm = if trending {
                // Saturates at 3× threshold so one viral item cannot dwarf
                // every other signal.
                (interactions as f32 / cfg.trending_threshold as f32).min(3.0) / 3.0
            } else {
                0.0
            };

            let follow_up = engaged_sources.contains(&item.source_id)
                || title_overlap(&item.title, &engaged_tokens) >= 2;

            let mut score = w.w_recency * recency + w.w_trending * trending_norm;
            if follow_up {
                score += w.w_follow_up;
            }

            // Reason precedence: follow-ups are the rarest, most personal
            // signal; trending beats the positional defaults.
            let reason = if follow_up {
                SelectionReason::FollowUp
            } else if trending {
                SelectionReason::Trending
            } else if freshest.get(&item.source_id).map(String::as_str) == Some(item.id.as_str()) {
                SelectionReason::TopStory
            } else {
                SelectionReason::DiversityPick
            };

            ScoredCandidate {
                item: item.clone(),
                score,
                reason,
            }
        })
        .collect()
}

/// Linear decay from 1.0 (just published) to 0.0 at the window edge.
fn recency_score(item: &ContentItem, now: DateTime<Utc>, window_secs: u64) -> f32 {
    let age_secs = (now - item.published_at).num_seconds().max(0) as f32;
    ((window_secs as f32 - age_secs).max(0.0)) / window_secs as f32
}

/// Id of the most recently published item for each source.
fn freshest_per_source(candidates: &[ContentItem]) -> HashMap<SourceId, String> {
    let mut best: HashMap<SourceId, (DateTime<Utc>, String)> = HashMap::new();
    for item in candidates {
        match best.get(&item.source_id) {
            Some((ts, _)) if *ts >= item.published_at => {}
            _ => {
                best.insert(item.source_id.clone(), (item.published_at, item.id.clone()));
            }
        }
    }
    best.into_iter().map(|(k, (_, id))| (k, id)).collect()
}

/// Number of significant title tokens shared with engaged titles.
fn title_overlap(title: &str, engaged: &std::collections::HashSet<String>) -> usize {
    if engaged.is_empty() {
        return 0;
    }
    let mut seen = std::collections::HashSet::new();
    significant_tokens(title)
        .filter(|t| engaged.contains(t) && seen.insert(t.clone()))
        .count()
}
