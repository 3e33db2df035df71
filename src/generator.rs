//! # Brief Generator
//!
//! The assembler and state machine around the scoring pipeline:
//! `idle → generating → {loaded, failed}`. One generation runs at a time
//! per instance; `record_engagement` is a fire-and-forget append that is
//! safe to call concurrently with an in-flight generation and only ever
//! affects future runs.
//!
//! Collaborators (source selection, content catalog, engagement store) are
//! injected at construction; the generator owns no global state. Observers
//! get state changes through a `watch` channel instead of any UI-binding
//! framework.

use crate::brief::{BriefItem, BriefMode, DailyBrief};
use crate::catalog::{fetch_all, ContentCatalog, SourceSelection};
use crate::config::EngineConfig;
use crate::engagement::{EngagementAction, EngagementRecord, EngagementStore};
use crate::model::SourceId;
use crate::{readtime, scoring, select, summarize};
use chrono::{Local, Utc};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use uuid::Uuid;

/// One-time metrics registration (so series show up on the app's exporter).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("brief_generations_total", "Completed brief generations.");
        describe_counter!(
            "brief_generation_failures_total",
            "Generations that ended in the failed state."
        );
        describe_counter!(
            "brief_source_fetch_errors_total",
            "Per-source fetch failures swallowed during fan-out."
        );
        describe_counter!("brief_engagements_total", "Engagement records appended.");
        describe_gauge!(
            "brief_last_generated_ts",
            "Unix ts of the last successful generation."
        );
        describe_histogram!("brief_items_selected", "Items selected per generated brief.");
    });
}

/// Errors surfaced to callers and via `last_error`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("a brief generation is already in flight")]
    GenerationInFlight,
    #[error("content catalog unavailable: all {failed} selected sources failed to fetch")]
    CatalogUnavailable { failed: usize },
}

/// Coarse lifecycle phase, derived from the observable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorPhase {
    Idle,
    Generating,
    Loaded,
    Failed,
}

/// Snapshot published on every state change.
#[derive(Debug, Clone)]
pub struct StateSnapshot {
    pub current_brief: Option<Arc<DailyBrief>>,
    pub is_generating: bool,
    pub last_error: Option<EngineError>,
}

impl StateSnapshot {
    pub fn phase(&self) -> GeneratorPhase {
        if self.is_generating {
            GeneratorPhase::Generating
        } else if self.last_error.is_some() {
            GeneratorPhase::Failed
        } else if self.current_brief.is_some() {
            GeneratorPhase::Loaded
        } else {
            GeneratorPhase::Idle
        }
    }
}

#[derive(Debug, Default)]
struct GenState {
    current_brief: Option<Arc<DailyBrief>>,
    last_error: Option<EngineError>,
}

/// The daily brief generation engine.
pub struct BriefGenerator {
    selection: Arc<dyn SourceSelection>,
    catalog: Arc<dyn ContentCatalog>,
    engagement: Arc<EngagementStore>,
    cfg: EngineConfig,
    state: Mutex<GenState>,
    in_flight: AtomicBool,
    tx: watch::Sender<StateSnapshot>,
}

impl BriefGenerator {
    pub fn new(
        selection: Arc<dyn SourceSelection>,
        catalog: Arc<dyn ContentCatalog>,
        engagement: Arc<EngagementStore>,
        cfg: EngineConfig,
    ) -> Self {
        ensure_metrics_described();
        let (tx, _rx) = watch::channel(StateSnapshot {
            current_brief: None,
            is_generating: false,
            last_error: None,
        });
        Self {
            selection,
            catalog,
            engagement,
            cfg,
            state: Mutex::new(GenState::default()),
            in_flight: AtomicBool::new(false),
            tx,
        }
    }

    /// Construct with a private engagement store sized from
    /// `cfg.engagement_capacity`. Use `new` when the store is shared with
    /// other observers.
    pub fn from_config(
        selection: Arc<dyn SourceSelection>,
        catalog: Arc<dyn ContentCatalog>,
        cfg: EngineConfig,
    ) -> Self {
        let engagement = Arc::new(EngagementStore::from_config(&cfg));
        Self::new(selection, catalog, engagement, cfg)
    }

    /// Generate a fresh brief. `mode` wins when given; otherwise the
    /// configured policy resolves one from the local clock.
    ///
    /// A second call while one is in flight is rejected with
    /// `GenerationInFlight` and leaves all observable state untouched.
    pub async fn generate_brief(&self, mode: Option<BriefMode>) -> Result<DailyBrief, EngineError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(EngineError::GenerationInFlight);
        }
        // Clears the flag and re-publishes even if the future is dropped
        // mid-generation, so `is_generating` always reflects reality.
        let _guard = FlightGuard(self);
        self.publish();

        let mode = mode.unwrap_or_else(|| self.cfg.mode_policy.detect(&Local::now()));
        let history = self.engagement.snapshot();
        let sources = self.selection.selected_sources();

        tracing::info!(
            target: "brief",
            mode = mode.as_str(),
            sources = sources.len(),
            "generation started"
        );

        let outcome = fetch_all(self.catalog.as_ref(), &sources).await;
        if outcome.all_failed() {
            let err = EngineError::CatalogUnavailable {
                failed: outcome.failed,
            };
            {
                let mut st = self.state.lock().expect("generator state poisoned");
                // Previous brief (if any) stays; only the error changes.
                st.last_error = Some(err.clone());
            }
            counter!("brief_generation_failures_total").increment(1);
            tracing::warn!(target: "brief", failed = outcome.failed, "catalog unavailable");
            return Err(err);
        }

        let now = Utc::now();
        let scored = scoring::score(&outcome.items, &history, &self.cfg, now);
        let wpm = self.cfg.reading_wpm;
        let selected = select::select(&scored, mode, self.cfg.slack_factor, |item| {
            readtime::estimate(item, wpm)
        });

        let items: Vec<BriefItem> = selected
            .into_iter()
            .map(|s| BriefItem {
                id: Uuid::new_v4(),
                summary: summarize::summarize(&s.item, s.reason, mode),
                category: summarize::categorize(&s.item, s.reason),
                reason: s.reason,
                priority: s.priority,
                estimated_secs: s.estimated_secs,
                content: s.item,
            })
            .collect();

        let brief = DailyBrief::new(items, mode, now);
        {
            let mut st = self.state.lock().expect("generator state poisoned");
            st.current_brief = Some(Arc::new(brief.clone()));
            st.last_error = None;
        }

        counter!("brief_generations_total").increment(1);
        histogram!("brief_items_selected").record(brief.items.len() as f64);
        gauge!("brief_last_generated_ts").set(now.timestamp() as f64);
        tracing::info!(
            target: "brief",
            mode = mode.as_str(),
            items = brief.items.len(),
            read_time_secs = brief.read_time_secs,
            candidates = outcome.items.len(),
            failed_sources = outcome.failed,
            "generation finished"
        );

        Ok(brief)
    }

    /// Append an engagement record. Never fails, never regenerates, and
    /// never touches `current_brief`; it only informs future scoring runs.
    ///
    /// Source and title context are resolved from the current brief when
    /// the item id matches; unknown ids still append a bare record.
    pub fn record_engagement(
        &self,
        brief_item_id: Uuid,
        content_id: &str,
        time_spent_secs: u64,
        action: EngagementAction,
    ) {
        let (source_id, title) = self.resolve_item_context(brief_item_id, content_id);
        self.engagement.append(EngagementRecord {
            brief_item_id,
            content_id: content_id.to_string(),
            source_id,
            title,
            time_spent_secs,
            action,
            recorded_at: Utc::now(),
        });
        counter!("brief_engagements_total").increment(1);
    }

    /// The most recently generated brief, if any.
    pub fn current_brief(&self) -> Option<Arc<DailyBrief>> {
        self.state
            .lock()
            .ok()
            .and_then(|st| st.current_brief.clone())
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn last_error(&self) -> Option<EngineError> {
        self.state.lock().ok().and_then(|st| st.last_error.clone())
    }

    pub fn phase(&self) -> GeneratorPhase {
        self.snapshot().phase()
    }

    /// Subscribe to state changes (fresh generations, failures, in-flight
    /// transitions). The receiver always starts with the current snapshot.
    pub fn subscribe(&self) -> watch::Receiver<StateSnapshot> {
        self.tx.subscribe()
    }

    fn snapshot(&self) -> StateSnapshot {
        let st = self.state.lock().expect("generator state poisoned");
        StateSnapshot {
            current_brief: st.current_brief.clone(),
            is_generating: self.in_flight.load(Ordering::SeqCst),
            last_error: st.last_error.clone(),
        }
    }

    fn publish(&self) {
        let _ = self.tx.send(self.snapshot());
    }

    fn resolve_item_context(
        &self,
        brief_item_id: Uuid,
        content_id: &str,
    ) -> (Option<SourceId>, Option<String>) {
        let Some(brief) = self.current_brief() else {
            return (None, None);
        };
        brief
            .items
            .iter()
            .find(|i| i.id == brief_item_id || i.content.id == content_id)
            .map(|i| {
                (
                    Some(i.content.source_id.clone()),
                    Some(i.content.title.clone()),
                )
            })
            .unwrap_or((None, None))
    }
}

struct FlightGuard<'a>(&'a BriefGenerator);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.in_flight.store(false, Ordering::SeqCst);
        self.0.publish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_phase_derivation() {
        let idle = StateSnapshot {
            current_brief: None,
            is_generating: false,
            last_error: None,
        };
        assert_eq!(idle.phase(), GeneratorPhase::Idle);

        let generating = StateSnapshot {
            is_generating: true,
            ..idle.clone()
        };
        assert_eq!(generating.phase(), GeneratorPhase::Generating);

        let failed = StateSnapshot {
            last_error: Some(EngineError::CatalogUnavailable { failed: 2 }),
            ..idle.clone()
        };
        assert_eq!(failed.phase(), GeneratorPhase::Failed);

        let loaded = StateSnapshot {
            current_brief: Some(Arc::new(DailyBrief::empty(BriefMode::Standard, Utc::now()))),
            ..idle
        };
        assert_eq!(loaded.phase(), GeneratorPhase::Loaded);
    }

    #[test]
    fn errors_render_usable_messages() {
        assert_eq!(
            EngineError::GenerationInFlight.to_string(),
            "a brief generation is already in flight"
        );
        assert!(EngineError::CatalogUnavailable { failed: 3 }
            .to_string()
            .contains("all 3 selected sources"));
    }
}
