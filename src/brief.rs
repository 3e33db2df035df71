//! # Brief Value Types
//!
//! The output side of the engine: `BriefMode` (the budget the caller picks
//! or auto-detection resolves), `SelectionReason` (why an item made the
//! cut), `BriefCategory` (display grouping), and the immutable `BriefItem`
//! / `DailyBrief` records a generation produces.
//!
//! Everything here is a plain value. A `DailyBrief` is created fresh on
//! every generation and superseded, never mutated in place.

use crate::model::ContentItem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How much content a brief may contain. Each mode carries two invariants:
/// a target read time and an item ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BriefMode {
    Rush,
    Standard,
    Weekend,
}

impl BriefMode {
    /// Target aggregate read time in seconds.
    pub const fn target_read_time_secs(&self) -> u64 {
        match self {
            BriefMode::Rush => 120,
            BriefMode::Standard => 300,
            BriefMode::Weekend => 1200,
        }
    }

    /// Hard ceiling on the number of items.
    pub const fn max_items(&self) -> usize {
        match self {
            BriefMode::Rush => 5,
            BriefMode::Standard => 10,
            BriefMode::Weekend => 12,
        }
    }

    /// Per-item summary length cap in characters. Only the rush cap is a
    /// hard product requirement; the others just give longer briefs room.
    pub const fn summary_cap_chars(&self) -> usize {
        match self {
            BriefMode::Rush => 150,
            BriefMode::Standard => 280,
            BriefMode::Weekend => 400,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BriefMode::Rush => "rush",
            BriefMode::Standard => "standard",
            BriefMode::Weekend => "weekend",
        }
    }
}

/// Why the selector admitted an item. Assigned by the scorer, fixed after
/// selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionReason {
    TopStory,
    Trending,
    FollowUp,
    DiversityPick,
}

impl SelectionReason {
    /// Human-readable explanation shown next to the item.
    pub fn explanation(&self) -> &'static str {
        match self {
            SelectionReason::TopStory => "Top story from one of your sources",
            SelectionReason::Trending => "Trending with high engagement right now",
            SelectionReason::FollowUp => "Follows up on a story you engaged with",
            SelectionReason::DiversityPick => "Picked to keep your brief varied",
        }
    }
}

/// Display grouping for a brief item. Purely presentational; the icon and
/// color hints are irrelevant to selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BriefCategory {
    TopStories,
    Trending,
    Podcasts,
    Diversity,
}

impl BriefCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            BriefCategory::TopStories => "Top Stories",
            BriefCategory::Trending => "Trending",
            BriefCategory::Podcasts => "Podcasts",
            BriefCategory::Diversity => "Something Different",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            BriefCategory::TopStories => "newspaper",
            BriefCategory::Trending => "flame",
            BriefCategory::Podcasts => "headphones",
            BriefCategory::Diversity => "sparkles",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            BriefCategory::TopStories => "#1f6feb",
            BriefCategory::Trending => "#fb8500",
            BriefCategory::Podcasts => "#8338ec",
            BriefCategory::Diversity => "#2a9d8f",
        }
    }
}

/// One chosen item with its selection context. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BriefItem {
    pub id: Uuid,
    pub content: ContentItem,
    pub reason: SelectionReason,
    /// Plain-text summary, capped per mode. Never empty.
    pub summary: String,
    pub category: BriefCategory,
    /// Rank in the brief; 0 = most prominent. Also the tie-breaker for
    /// display ordering.
    pub priority: u32,
    /// Estimated consumption time for this item, in seconds.
    pub estimated_secs: u64,
}

/// One generated digest. Items are stored in ranked order; `read_time_secs`
/// is the sum of per-item estimates from the same estimator the selector
/// used, so the two cannot disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBrief {
    pub id: Uuid,
    pub items: Vec<BriefItem>,
    pub read_time_secs: u64,
    pub mode: BriefMode,
    pub created_at: DateTime<Utc>,
}

impl DailyBrief {
    /// Assemble a brief from already-ranked items.
    pub fn new(items: Vec<BriefItem>, mode: BriefMode, created_at: DateTime<Utc>) -> Self {
        let read_time_secs = items.iter().map(|i| i.estimated_secs).sum();
        Self {
            id: Uuid::new_v4(),
            items,
            read_time_secs,
            mode,
            created_at,
        }
    }

    /// Empty brief for the degenerate no-sources / no-candidates case.
    pub fn empty(mode: BriefMode, created_at: DateTime<Utc>) -> Self {
        Self::new(Vec::new(), mode, created_at)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
