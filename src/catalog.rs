//! # Catalog Collaborators
//!
//! The two seams the engine consumes: the user's selected-source set and
//! the content catalog that resolves a source id to its currently
//! available normalized items. Both are injected at generator
//! construction; the engine owns neither.
//!
//! `fetch_all` fans out across sources concurrently with bulkhead
//! semantics: one source failing (or hanging on its own fetch error) can
//! never cancel or poison its siblings — it just contributes nothing.

use crate::model::{ContentItem, SourceId};
use anyhow::Result;
use metrics::counter;
use std::collections::HashSet;

/// The user's current source selection. Read fresh at the start of each
/// generation.
pub trait SourceSelection: Send + Sync {
    fn selected_sources(&self) -> HashSet<SourceId>;
}

/// Resolves one source to its available normalized items. Fails
/// independently per source.
#[async_trait::async_trait]
pub trait ContentCatalog: Send + Sync {
    async fn fetch_candidates(&self, source: &SourceId) -> Result<Vec<ContentItem>>;
}

/// Result of one fan-out across all selected sources.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub items: Vec<ContentItem>,
    pub attempted: usize,
    pub failed: usize,
}

impl FetchOutcome {
    /// Every attempted source failed (and there was at least one). The
    /// generator treats this as catalog-wide unavailability.
    pub fn all_failed(&self) -> bool {
        self.attempted > 0 && self.failed == self.attempted
    }
}

/// Fetch candidates for all sources in parallel, isolating failures.
pub async fn fetch_all(catalog: &dyn ContentCatalog, sources: &HashSet<SourceId>) -> FetchOutcome {
    // Deterministic fan-out order keeps logs and tests reproducible.
    let mut ordered: Vec<&SourceId> = sources.iter().collect();
    ordered.sort();

    let fetches = ordered
        .iter()
        .map(|&sid| async move { (sid, catalog.fetch_candidates(sid).await) });
    let results = futures::future::join_all(fetches).await;

    let mut outcome = FetchOutcome {
        attempted: ordered.len(),
        ..Default::default()
    };
    for (sid, res) in results {
        match res {
            Ok(mut items) => outcome.items.append(&mut items),
            Err(e) => {
                tracing::warn!(target: "brief", source = %sid, error = ?e, "source fetch failed");
                counter!("brief_source_fetch_errors_total").increment(1);
                outcome.failed += 1;
            }
        }
    }
    outcome
}
