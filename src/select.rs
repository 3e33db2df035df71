//! # Selector
//!
//! Diversity-constrained greedy selection under a mode budget. Pure:
//! scored candidates in, ordered admitted set out.
//!
//! Ordering is fully deterministic (score desc, then publication time
//! desc, then source id asc) so equal-score runs reproduce in tests. The
//! read-time check uses the same estimator the assembler publishes with,
//! so the budget math and the reported `read_time` cannot diverge.

use crate::brief::{BriefMode, SelectionReason};
use crate::model::{ContentItem, ContentType};
use crate::scoring::ScoredCandidate;
use std::collections::HashSet;

/// An admitted candidate with its rank and the estimate it was admitted
/// under.
#[derive(Debug, Clone)]
pub struct SelectedCandidate {
    pub item: ContentItem,
    pub score: f32,
    pub reason: SelectionReason,
    /// 0 = most prominent.
    pub priority: u32,
    pub estimated_secs: u64,
}

/// Select items for the given mode budget.
///
/// Greedy by score; items that would blow the slack budget are skipped,
/// not terminal, so a long podcast does not starve the short items behind
/// it. If the admitted set ends up single-typed while the candidate pool
/// spans more than one content type, tail items are evicted to make room
/// for the best other-typed candidate that fits (the budget wins when none
/// fits at all).
pub fn select<F>(
    scored: &[ScoredCandidate],
    mode: BriefMode,
    slack_factor: f32,
    estimate: F,
) -> Vec<SelectedCandidate>
where
    F: Fn(&ContentItem) -> u64,
{
    if scored.is_empty() {
        return Vec::new();
    }

    let max_items = mode.max_items();
    let budget_cap = (mode.target_read_time_secs() as f32 * slack_factor).floor() as u64;

    let mut ordered: Vec<&ScoredCandidate> = scored.iter().collect();
    ordered.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.item.published_at.cmp(&a.item.published_at))
            .then_with(|| a.item.source_id.cmp(&b.item.source_id))
    });

    let mut selected: Vec<SelectedCandidate> = Vec::new();
    let mut running: u64 = 0;

    for cand in &ordered {
        if selected.len() >= max_items {
            break;
        }
        let est = estimate(&cand.item);
        // Estimates built from upstream metadata can be absurdly large;
        // saturate so the comparison stays meaningful.
        let next = running.saturating_add(est);
        if next > budget_cap {
            continue;
        }
        running = next;
        selected.push(SelectedCandidate {
            item: cand.item.clone(),
            score: cand.score,
            reason: cand.reason,
            priority: 0, // assigned below
            estimated_secs: est,
        });
    }

    repair_diversity(&mut selected, &mut running, &ordered, max_items, budget_cap, &estimate);

    for (rank, s) in selected.iter_mut().enumerate() {
        s.priority = rank as u32;
    }
    selected
}

/// Ensure the admitted set spans ≥ 2 content types whenever the pool does.
fn repair_diversity<F>(
    selected: &mut Vec<SelectedCandidate>,
    running: &mut u64,
    ordered: &[&ScoredCandidate],
    max_items: usize,
    budget_cap: u64,
    estimate: &F,
) where
    F: Fn(&ContentItem) -> u64,
{
    if selected.is_empty() {
        return;
    }
    let pool_types: HashSet<ContentType> =
        ordered.iter().map(|c| c.item.content_type).collect();
    let selected_types: HashSet<ContentType> =
        selected.iter().map(|s| s.item.content_type).collect();
    if pool_types.len() < 2 || selected_types.len() >= 2 {
        return;
    }

    let dominant = *selected_types.iter().next().expect("non-empty");
    let chosen: HashSet<&str> = selected.iter().map(|s| s.item.id.as_str()).collect();

    // Best-scored other-typed candidate that fits after evicting as few
    // tail items as we must.
    for alt in ordered
        .iter()
        .filter(|c| c.item.content_type != dominant && !chosen.contains(c.item.id.as_str()))
    {
        let est = estimate(&alt.item);
        if est > budget_cap {
            continue;
        }
        // Evict the tail (lowest-ranked picks) until the alternative fits
        // both the item ceiling and the slack budget, always keeping at
        // least one of the original picks.
        let mut evicted = 0usize;
        let mut freed = 0u64;
        let fits = loop {
            let len = selected.len() - evicted;
            if len + 1 <= max_items && (*running - freed).saturating_add(est) <= budget_cap {
                break true;
            }
            if len <= 1 {
                break false;
            }
            freed += selected[selected.len() - 1 - evicted].estimated_secs;
            evicted += 1;
        };
        if !fits {
            continue;
        }
        selected.truncate(selected.len() - evicted);
        *running = (*running - freed).saturating_add(est);
        selected.push(SelectedCandidate {
            item: alt.item.clone(),
            score: alt.score,
            reason: alt.reason,
            priority: 0,
            estimated_secs: est,
        });
        return;
    }
}
