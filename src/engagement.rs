//! # Engagement Store
//!
//! Rolling, append-only record of how the user interacted with past brief
//! items. Feeds follow-up detection in the scorer of *subsequent*
//! generations; a generation in flight reads a snapshot taken at its start
//! and is never affected by concurrent appends.
//!
//! The store is a capacity-bounded ring behind a mutex. Records are never
//! mutated after append; eviction is oldest-first.

use crate::config::EngineConfig;
use crate::model::SourceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use uuid::Uuid;

/// What the user did with a brief item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementAction {
    Clicked,
    Dismissed,
    Skipped,
    Completed,
}

impl EngagementAction {
    /// Clicks and completions signal interest; dismiss/skip do not.
    pub fn is_positive(&self) -> bool {
        matches!(self, EngagementAction::Clicked | EngagementAction::Completed)
    }
}

/// One interaction, appended once and never changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementRecord {
    pub brief_item_id: Uuid,
    pub content_id: String,
    /// Source and title of the engaged item, captured at record time when
    /// the item could be resolved from the brief it came from. Follow-up
    /// detection keys on these.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<SourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub time_spent_secs: u64,
    pub action: EngagementAction,
    pub recorded_at: DateTime<Utc>,
}

/// Thread-safe bounded store of engagement records.
#[derive(Debug)]
pub struct EngagementStore {
    inner: Mutex<VecDeque<EngagementRecord>>,
    cap: usize,
}

impl EngagementStore {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, 10_000);
        Self {
            inner: Mutex::new(VecDeque::with_capacity(cap)),
            cap,
        }
    }

    /// Store sized from `engagement_capacity`. Build the store and the
    /// generator from the same config so the knob actually binds the ring.
    pub fn from_config(cfg: &EngineConfig) -> Self {
        Self::with_capacity(cfg.engagement_capacity)
    }

    /// Append a record, evicting the oldest entries past capacity.
    /// Infallible by contract: a poisoned lock drops the record rather
    /// than propagating a panic into `record_engagement`.
    pub fn append(&self, record: EngagementRecord) {
        if let Ok(mut buf) = self.inner.lock() {
            buf.push_back(record);
            while buf.len() > self.cap {
                buf.pop_front();
            }
        }
    }

    /// Consistent snapshot for one generation run.
    pub fn snapshot(&self) -> EngagementHistory {
        let records = self
            .inner
            .lock()
            .map(|buf| buf.iter().cloned().collect())
            .unwrap_or_default();
        EngagementHistory { records }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|buf| buf.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EngagementStore {
    fn default() -> Self {
        Self::with_capacity(1024)
    }
}

/// Immutable read model over past engagements, oldest first.
#[derive(Debug, Clone, Default)]
pub struct EngagementHistory {
    records: Vec<EngagementRecord>,
}

impl EngagementHistory {
    pub fn records(&self) -> &[EngagementRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sources the user positively engaged with (clicked/completed).
    pub fn engaged_sources(&self) -> HashSet<&SourceId> {
        self.records
            .iter()
            .filter(|r| r.action.is_positive())
            .filter_map(|r| r.source_id.as_ref())
            .collect()
    }

    /// Significant title tokens from positively engaged items, for topical
    /// follow-up matching.
    pub fn engaged_title_tokens(&self) -> HashSet<String> {
        let mut out = HashSet::new();
        for r in self.records.iter().filter(|r| r.action.is_positive()) {
            if let Some(title) = &r.title {
                out.extend(significant_tokens(title));
            }
        }
        out
    }

    #[cfg(test)]
    pub(crate) fn from_records(records: Vec<EngagementRecord>) -> Self {
        Self { records }
    }
}

/// Lowercased tokens of 4+ chars; short glue words carry no topic signal.
pub(crate) fn significant_tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 4)
        .map(|t| t.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(content: &str, action: EngagementAction) -> EngagementRecord {
        EngagementRecord {
            brief_item_id: Uuid::new_v4(),
            content_id: content.into(),
            source_id: Some(SourceId::from_raw("feedfeedfeedfeed")),
            title: Some("Apple unveils new silicon roadmap".into()),
            time_spent_secs: 30,
            action,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn append_and_snapshot_roundtrip() {
        let store = EngagementStore::with_capacity(8);
        store.append(rec("c1", EngagementAction::Clicked));
        store.append(rec("c2", EngagementAction::Skipped));
        let snap = store.snapshot();
        assert_eq!(snap.records().len(), 2);
        assert_eq!(snap.records()[0].content_id, "c1");
    }

    #[test]
    fn capacity_evicts_oldest_first() {
        let store = EngagementStore::with_capacity(3);
        for i in 0..5 {
            store.append(rec(&format!("c{i}"), EngagementAction::Clicked));
        }
        let snap = store.snapshot();
        assert_eq!(snap.records().len(), 3);
        assert_eq!(snap.records()[0].content_id, "c2");
        assert_eq!(snap.records()[2].content_id, "c4");
    }

    #[test]
    fn configured_capacity_bounds_the_ring() {
        let cfg = EngineConfig::from_toml_str("engagement_capacity = 2").unwrap();
        let store = EngagementStore::from_config(&cfg);
        for i in 0..5 {
            store.append(rec(&format!("c{i}"), EngagementAction::Clicked));
        }
        let snap = store.snapshot();
        assert_eq!(snap.records().len(), 2);
        assert_eq!(snap.records()[0].content_id, "c3");
        assert_eq!(snap.records()[1].content_id, "c4");
    }

    #[test]
    fn snapshot_is_isolated_from_later_appends() {
        let store = EngagementStore::default();
        store.append(rec("c1", EngagementAction::Completed));
        let snap = store.snapshot();
        store.append(rec("c2", EngagementAction::Completed));
        assert_eq!(snap.records().len(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn only_positive_actions_feed_follow_up_signals() {
        let store = EngagementStore::default();
        store.append(rec("c1", EngagementAction::Dismissed));
        store.append(rec("c2", EngagementAction::Skipped));
        let snap = store.snapshot();
        assert!(snap.engaged_sources().is_empty());
        assert!(snap.engaged_title_tokens().is_empty());

        store.append(rec("c3", EngagementAction::Clicked));
        let snap = store.snapshot();
        assert_eq!(snap.engaged_sources().len(), 1);
        assert!(snap.engaged_title_tokens().contains("silicon"));
        // 3-char glue words are dropped
        assert!(!snap.engaged_title_tokens().contains("new"));
    }

    #[test]
    fn significant_tokens_split_on_punctuation() {
        let toks: Vec<String> = significant_tokens("Rust 1.80: async closures!").collect();
        assert!(toks.contains(&"rust".to_string()));
        assert!(toks.contains(&"async".to_string()));
        assert!(toks.contains(&"closures".to_string()));
    }
}
